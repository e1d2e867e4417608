use std::{env, time::Duration};

use crate::{domain::UserId, errors::Error, Result};

pub const DEFAULT_FALLBACK_CAPTION: &str =
    "Good afternoon! We have new arrivals. Check out the update!";

/// Typed configuration for the relay.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub admin_id: UserId,

    // Media groups
    pub media_group_timeout: Duration,
    pub media_group_stale_after: Duration,
    pub media_group_sweep_interval: Duration,

    // Broadcast
    pub fallback_caption: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Existing environment always wins over `.env`.
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(Error::Config(format!("failed to read .env: {e}")));
            }
            tracing::info!(".env not found, using process environment");
        }

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let admin_raw = env_str("ADMIN_ID").and_then(non_empty).ok_or_else(|| {
            Error::Config("ADMIN_ID environment variable is required".to_string())
        })?;
        let admin_id = parse_admin_id(&admin_raw)?;

        let mut cfg = Self::for_admin(telegram_bot_token, admin_id);

        if let Some(ms) = env_u64("MEDIA_GROUP_TIMEOUT") {
            cfg.media_group_timeout = Duration::from_millis(ms.max(1));
        }
        if let Some(secs) = env_u64("MEDIA_GROUP_STALE_AFTER") {
            cfg.media_group_stale_after = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("MEDIA_GROUP_SWEEP_INTERVAL") {
            cfg.media_group_sweep_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(caption) = env_str("BROADCAST_FALLBACK_CAPTION").and_then(non_empty) {
            cfg.fallback_caption = caption;
        }

        Ok(cfg)
    }

    /// Defaults for everything except the credentials.
    pub fn for_admin(telegram_bot_token: String, admin_id: UserId) -> Self {
        Self {
            telegram_bot_token,
            admin_id,
            media_group_timeout: Duration::from_millis(1000),
            media_group_stale_after: Duration::from_secs(60 * 60),
            media_group_sweep_interval: Duration::from_secs(10 * 60),
            fallback_caption: DEFAULT_FALLBACK_CAPTION.to_string(),
        }
    }
}

fn parse_admin_id(raw: &str) -> Result<UserId> {
    raw.trim()
        .parse::<i64>()
        .map(UserId)
        .map_err(|_| Error::Config(format!("ADMIN_ID must be a numeric Telegram id, got {raw:?}")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
