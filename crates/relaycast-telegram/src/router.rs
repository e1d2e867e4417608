use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio_util::sync::CancellationToken;

use relaycast_core::{config::Config, messaging::port::MessagingPort, relay::RelayRouter};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayRouter>,
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!(bot = %me.username(), admin_id = cfg.admin_id.0, "relay started"),
        Err(e) => tracing::warn!(error = %e, "get_me failed; continuing"),
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let relay = Arc::new(RelayRouter::new(&cfg, messenger));

    let shutdown = CancellationToken::new();
    let sweeper = relay.spawn_sweeper(cfg.media_group_sweep_interval, shutdown.clone());

    let state = Arc::new(AppState { relay });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "media group sweeper ended abnormally");
    }
    tracing::info!("relay stopped");

    Ok(())
}
