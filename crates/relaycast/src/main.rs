use std::sync::Arc;

use relaycast_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), relaycast_core::Error> {
    relaycast_core::logging::init("relaycast")?;

    let cfg = Arc::new(Config::load()?);

    relaycast_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| relaycast_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
