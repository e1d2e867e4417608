use std::time::Duration;

/// Core error type for the relay.
///
/// Only startup can fail fatally; per-message problems are `DeliveryError`s that the
/// router logs and swallows.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a single outbound send that did not go through.
///
/// Only `RecipientBlocked` is treated as permanent: the broadcast engine prunes the
/// subscriber when it sees it. Everything else is counted and logged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("recipient has blocked the bot")]
    RecipientBlocked,

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("invalid content: {0}")]
    InvalidContent(String),
}

impl DeliveryError {
    pub fn is_recipient_blocked(&self) -> bool {
        matches!(self, Self::RecipientBlocked)
    }
}

pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;
