use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    errors::DeliveryResult,
    messaging::types::{InlineKeyboard, MediaItem},
};

/// Outbound side of the chat transport.
///
/// Every call is a single delivery attempt; implementations classify failures into
/// `DeliveryError` so callers can tell a blocked recipient from a transient failure.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> DeliveryResult<MessageRef>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> DeliveryResult<MessageRef>;

    async fn send_media(
        &self,
        chat_id: ChatId,
        item: &MediaItem,
        caption: &str,
    ) -> DeliveryResult<MessageRef>;

    /// Send items as one album; `caption` goes on the first item.
    async fn send_album(
        &self,
        chat_id: ChatId,
        items: &[MediaItem],
        caption: &str,
    ) -> DeliveryResult<Vec<MessageRef>>;

    /// Forward keeping the original author visible, so replies can be routed back.
    async fn forward_message(&self, to: ChatId, source: MessageRef) -> DeliveryResult<MessageRef>;

    /// Re-send a message's content without the forward header.
    async fn copy_message(&self, to: ChatId, source: MessageRef) -> DeliveryResult<MessageRef>;

    async fn answer_callback_query(&self, callback_id: &str) -> DeliveryResult<()>;
}
