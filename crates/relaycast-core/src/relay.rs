//! Per-update dispatch between the admin, users, and the broadcast machinery.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    aggregator::{AggregatorConfig, BoxFuture, MediaAggregator, SettleFn},
    broadcast::{BroadcastContent, BroadcastEngine},
    commands::{AdminCommand, EndTarget, UserCommand},
    config::Config,
    domain::{ChatId, UserId},
    formatting::{
        format_broadcast_report, format_mailing_toggled, format_new_subscriber,
        format_session_closed_for_admin, format_session_opened, format_status,
        format_subscriber_list,
    },
    gate::MailingGate,
    menu::{end_chat_keyboard, main_menu, MenuAction, MENU_HINT, MENU_PROMPT},
    messaging::{
        port::MessagingPort,
        types::{CallbackAction, InboundMessage, IncomingUpdate, Sender},
    },
    sessions::SessionRegistry,
    subscribers::SubscriberRegistry,
};

const END_USAGE: &str = "Usage: /end [user_id]";

pub struct RelayRouter {
    admin_id: UserId,
    messenger: Arc<dyn MessagingPort>,
    subscribers: Arc<SubscriberRegistry>,
    sessions: Arc<SessionRegistry>,
    gate: Arc<MailingGate>,
    engine: Arc<BroadcastEngine>,
    aggregator: Arc<MediaAggregator>,
}

impl RelayRouter {
    pub fn new(cfg: &Config, messenger: Arc<dyn MessagingPort>) -> Self {
        let subscribers = Arc::new(SubscriberRegistry::new());
        let engine = Arc::new(BroadcastEngine::new(
            subscribers.clone(),
            messenger.clone(),
            cfg.fallback_caption.clone(),
        ));

        let settle: SettleFn = {
            let engine = engine.clone();
            let messenger = messenger.clone();
            let admin = ChatId::from(cfg.admin_id);
            Arc::new(move |content: BroadcastContent| {
                let engine = engine.clone();
                let messenger = messenger.clone();
                let fut: BoxFuture = Box::pin(async move {
                    broadcast_and_report(&engine, messenger.as_ref(), admin, content).await;
                });
                fut
            })
        };
        let aggregator = MediaAggregator::new(
            AggregatorConfig {
                debounce: cfg.media_group_timeout,
                stale_after: cfg.media_group_stale_after,
            },
            settle,
        );

        Self {
            admin_id: cfg.admin_id,
            messenger,
            subscribers,
            sessions: Arc::new(SessionRegistry::new()),
            gate: Arc::new(MailingGate::default()),
            engine,
            aggregator,
        }
    }

    pub fn subscribers(&self) -> &Arc<SubscriberRegistry> {
        &self.subscribers
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn gate(&self) -> &Arc<MailingGate> {
        &self.gate
    }

    pub fn aggregator(&self) -> &Arc<MediaAggregator> {
        &self.aggregator
    }

    /// Start the periodic stale-album sweep.
    pub fn spawn_sweeper(
        &self,
        interval: std::time::Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        self.aggregator.spawn_sweeper(interval, shutdown)
    }

    pub async fn handle(&self, update: IncomingUpdate) {
        match update {
            IncomingUpdate::Message(msg) if msg.sender.id == self.admin_id => {
                self.handle_admin_message(msg).await
            }
            IncomingUpdate::Message(msg) => self.handle_user_message(msg).await,
            IncomingUpdate::Callback(cb) => self.handle_callback(cb).await,
        }
    }

    // ============== Admin ==============

    async fn handle_admin_message(&self, msg: InboundMessage) {
        if let Some(cmd) = msg.text_trimmed().and_then(AdminCommand::parse) {
            self.run_admin_command(cmd, &msg).await;
            return;
        }

        if let Some(item) = msg.media.clone() {
            if self.gate.is_active() {
                match msg.media_group_id {
                    Some(group) => self.aggregator.add_item(group, item).await,
                    None => {
                        broadcast_and_report(
                            &self.engine,
                            self.messenger.as_ref(),
                            self.admin_chat(),
                            BroadcastContent::Single(item),
                        )
                        .await
                    }
                }
                return;
            }
        }

        self.relay_admin_reply(&msg).await;
    }

    async fn run_admin_command(&self, cmd: AdminCommand, msg: &InboundMessage) {
        match cmd {
            AdminCommand::Subscribers => {
                let list = format_subscriber_list(&self.subscribers.snapshot().await);
                self.notify(self.admin_chat(), &list).await;
            }
            AdminCommand::ToggleMailing => {
                let active = self.gate.toggle();
                tracing::info!(active, "mailing toggled");
                self.notify(self.admin_chat(), &format_mailing_toggled(active))
                    .await;
            }
            AdminCommand::Status => {
                let status = format_status(
                    self.subscribers.count().await,
                    self.sessions.count().await,
                    self.aggregator.pending_count().await,
                    self.gate.is_active(),
                );
                self.notify(self.admin_chat(), &status).await;
            }
            AdminCommand::End(EndTarget::Invalid) => {
                self.notify(self.admin_chat(), END_USAGE).await;
            }
            AdminCommand::End(explicit) => {
                let target = match explicit {
                    EndTarget::User(user) => Some(user),
                    _ => self.reply_target(msg).await,
                };
                let ended = match target {
                    Some(user) => self.end_session(user).await,
                    None => false,
                };
                if !ended {
                    self.notify(self.admin_chat(), "No open chat to end").await;
                }
            }
        }
    }

    /// Forwarded-from author of the replied-to message, else an open session.
    async fn reply_target(&self, msg: &InboundMessage) -> Option<UserId> {
        if let Some(user) = msg.reply_to.as_ref().and_then(|r| r.forwarded_from) {
            return Some(user);
        }
        self.sessions.find_user_by_admin(self.admin_id).await
    }

    async fn relay_admin_reply(&self, msg: &InboundMessage) {
        let Some(target) = self.reply_target(msg).await else {
            // No feedback to the admin here; the message simply goes nowhere.
            tracing::debug!("admin message has no reply target, dropped");
            return;
        };
        if let Err(e) = self
            .messenger
            .copy_message(ChatId::from(target), msg.message)
            .await
        {
            tracing::warn!(user_id = target.0, error = %e, "failed to relay admin reply");
        }
    }

    // ============== Users ==============

    async fn handle_user_message(&self, msg: InboundMessage) {
        let user = msg.sender.id;
        let command = msg.text_trimmed().and_then(UserCommand::parse);

        if self.sessions.is_active(user).await {
            if command == Some(UserCommand::Stop) {
                self.end_session(user).await;
                return;
            }

            if let Err(e) = self
                .messenger
                .forward_message(self.admin_chat(), msg.message)
                .await
            {
                tracing::warn!(user_id = user.0, error = %e, "failed to forward to admin");
            }
            self.sessions.open(user, self.admin_id).await;
            return;
        }

        if command != Some(UserCommand::Start) {
            self.notify(msg.chat_id(), MENU_HINT).await;
        }
        self.show_menu(user, msg.chat_id()).await;
    }

    async fn handle_callback(&self, cb: CallbackAction) {
        if let Err(e) = self.messenger.answer_callback_query(&cb.callback_id).await {
            tracing::warn!(error = %e, "failed to answer callback query");
        }

        let Some(action) = MenuAction::parse(&cb.data) else {
            tracing::debug!(data = %cb.data, "ignoring unknown callback");
            return;
        };

        let Sender {
            id: user,
            display_name,
            username,
        } = &cb.sender;
        let user = *user;

        match action {
            MenuAction::Subscribe => {
                let outcome = self
                    .subscribers
                    .subscribe(user, display_name, username.as_deref())
                    .await;
                self.notify(cb.chat_id, "✅ You are subscribed to the mailing!")
                    .await;
                if outcome.is_new {
                    tracing::info!(user_id = user.0, "new subscriber");
                    let notice = format_new_subscriber(user, display_name, username.as_deref());
                    self.notify(self.admin_chat(), &notice).await;
                }
                self.show_menu(user, cb.chat_id).await;
            }
            MenuAction::Unsubscribe => {
                self.subscribers.unsubscribe(user).await;
                self.notify(cb.chat_id, "❌ You unsubscribed from the mailing")
                    .await;
                self.show_menu(user, cb.chat_id).await;
            }
            MenuAction::ContactManager => {
                self.sessions.open(user, self.admin_id).await;
                tracing::info!(user_id = user.0, "relay chat opened");
                if let Err(e) = self
                    .messenger
                    .send_inline_keyboard(
                        cb.chat_id,
                        "📩 You can now write to the manager. /stop ends the chat",
                        end_chat_keyboard(),
                    )
                    .await
                {
                    tracing::warn!(user_id = user.0, error = %e, "failed to confirm chat");
                }
                let notice = format_session_opened(user, display_name, username.as_deref());
                self.notify(self.admin_chat(), &notice).await;
            }
            MenuAction::EndChat => {
                if !self.end_session(user).await {
                    self.show_menu(user, cb.chat_id).await;
                }
            }
            MenuAction::Close => {
                self.notify(cb.chat_id, "🔒 Menu closed. /start opens it again")
                    .await;
            }
        }
    }

    /// Close the user's session and tell both sides. Returns false when there was none.
    async fn end_session(&self, user: UserId) -> bool {
        if self.sessions.close(user).await.is_none() {
            return false;
        }
        tracing::info!(user_id = user.0, "relay chat closed");

        let chat = ChatId::from(user);
        self.notify(chat, "🗣 Chat with the manager ended. /start opens the menu")
            .await;
        self.notify(self.admin_chat(), &format_session_closed_for_admin(user))
            .await;
        self.show_menu(user, chat).await;
        true
    }

    async fn show_menu(&self, user: UserId, chat: ChatId) {
        let keyboard = main_menu(self.subscribers.is_subscribed(user).await);
        if let Err(e) = self
            .messenger
            .send_inline_keyboard(chat, MENU_PROMPT, keyboard)
            .await
        {
            tracing::warn!(chat_id = chat.0, error = %e, "failed to send menu");
        }
    }

    /// Best-effort notice; failures are logged and swallowed.
    async fn notify(&self, chat: ChatId, html: &str) {
        if let Err(e) = self.messenger.send_html(chat, html).await {
            tracing::warn!(chat_id = chat.0, error = %e, "failed to send notice");
        }
    }

    fn admin_chat(&self) -> ChatId {
        ChatId::from(self.admin_id)
    }
}

async fn broadcast_and_report(
    engine: &BroadcastEngine,
    messenger: &dyn MessagingPort,
    admin: ChatId,
    content: BroadcastContent,
) {
    let report = engine.fanout(&content).await;
    let summary = format_broadcast_report(&content, &report);
    if let Err(e) = messenger.send_html(admin, &summary).await {
        tracing::warn!(error = %e, "failed to send broadcast summary");
    }
}
