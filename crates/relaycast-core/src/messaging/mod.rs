//! Transport-facing abstractions (Telegram is the only implementation today).

pub mod port;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;
