//! Fan-out of admin content to every subscriber.

use std::sync::Arc;

use crate::{
    domain::{ChatId, UserId},
    errors::DeliveryResult,
    messaging::{port::MessagingPort, types::MediaItem},
    subscribers::SubscriberRegistry,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BroadcastContent {
    Single(MediaItem),
    Album(Vec<MediaItem>),
}

impl BroadcastContent {
    /// Caption to attach: the item's own (or the album's first non-empty one), else
    /// `fallback`.
    pub fn caption<'a>(&'a self, fallback: &'a str) -> &'a str {
        let own = match self {
            Self::Single(item) => item.non_empty_caption(),
            Self::Album(items) => items.iter().find_map(MediaItem::non_empty_caption),
        };
        own.unwrap_or(fallback)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Recipients removed because they blocked the bot.
    pub pruned: Vec<UserId>,
}

pub struct BroadcastEngine {
    subscribers: Arc<SubscriberRegistry>,
    messenger: Arc<dyn MessagingPort>,
    fallback_caption: String,
}

impl BroadcastEngine {
    pub fn new(
        subscribers: Arc<SubscriberRegistry>,
        messenger: Arc<dyn MessagingPort>,
        fallback_caption: String,
    ) -> Self {
        Self {
            subscribers,
            messenger,
            fallback_caption,
        }
    }

    /// Deliver `content` once to every current subscriber.
    ///
    /// Never fails: per-recipient errors are counted, and recipients that blocked the
    /// bot are unsubscribed. Recipients come from a single registry snapshot taken up
    /// front; no registry lock is held while sending.
    pub async fn fanout(&self, content: &BroadcastContent) -> BroadcastReport {
        let recipients = self.subscribers.snapshot().await;
        let mut report = BroadcastReport {
            total: recipients.len(),
            ..BroadcastReport::default()
        };
        if recipients.is_empty() {
            tracing::info!("broadcast skipped: no subscribers");
            return report;
        }

        let caption = content.caption(&self.fallback_caption);
        for recipient in &recipients {
            match self.deliver(ChatId::from(recipient.id), content, caption).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(user_id = recipient.id.0, error = %e, "broadcast delivery failed");
                    if e.is_recipient_blocked() {
                        self.subscribers.unsubscribe(recipient.id).await;
                        report.pruned.push(recipient.id);
                    }
                }
            }
        }

        tracing::info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            pruned = report.pruned.len(),
            "broadcast finished"
        );
        report
    }

    async fn deliver(
        &self,
        chat_id: ChatId,
        content: &BroadcastContent,
        caption: &str,
    ) -> DeliveryResult<()> {
        match content {
            BroadcastContent::Single(item) => {
                self.messenger.send_media(chat_id, item, caption).await?;
            }
            BroadcastContent::Album(items) => {
                self.messenger.send_album(chat_id, items, caption).await?;
            }
        }
        Ok(())
    }
}
