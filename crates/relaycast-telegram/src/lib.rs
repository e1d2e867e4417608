//! Telegram adapter (teloxide).
//!
//! This crate implements the `relaycast-core` MessagingPort over the Telegram Bot API
//! and feeds Telegram updates into the core `RelayRouter`.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, InputFile, InputMedia, InputMediaDocument,
        InputMediaPhoto, ParseMode,
    },
    ApiError, RequestError,
};

pub mod handlers;
pub mod router;

use relaycast_core::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MediaItem, MediaKind},
    },
    DeliveryError, DeliveryResult,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn msg_ref(chat_id: ChatId, msg: &Message) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        }
    }

    fn input_file(item: &MediaItem) -> InputFile {
        InputFile::file_id(item.file_id.clone())
    }

    fn input_media(item: &MediaItem, caption: Option<&str>) -> InputMedia {
        let file = Self::input_file(item);
        match item.kind {
            MediaKind::Photo => {
                let mut m = InputMediaPhoto::new(file);
                if let Some(c) = caption {
                    m = m.caption(c.to_string());
                }
                InputMedia::Photo(m)
            }
            MediaKind::Document => {
                let mut m = InputMediaDocument::new(file);
                if let Some(c) = caption {
                    m = m.caption(c.to_string());
                }
                InputMedia::Document(m)
            }
        }
    }
}

/// Classify a Telegram failure for the broadcast engine.
///
/// Errors meaning the recipient can no longer be reached map to `RecipientBlocked`.
pub fn classify_error(e: RequestError) -> DeliveryError {
    match e {
        RequestError::Api(api) => match api {
            ApiError::BotBlocked
            | ApiError::UserDeactivated
            | ApiError::BotKicked
            | ApiError::BotKickedFromSupergroup
            | ApiError::CantInitiateConversation => DeliveryError::RecipientBlocked,
            other => DeliveryError::InvalidContent(other.to_string()),
        },
        RequestError::RetryAfter(secs) => DeliveryError::RateLimited {
            retry_after: secs,
        },
        other => DeliveryError::Transient(other.to_string()),
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> DeliveryResult<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), html.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(classify_error)?;
        Ok(Self::msg_ref(chat_id, &msg))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> DeliveryResult<MessageRef> {
        let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
            .buttons
            .into_iter()
            .map(|b| vec![InlineKeyboardButton::callback(b.label, b.callback_data)])
            .collect();
        let markup = InlineKeyboardMarkup::new(rows);

        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), html.to_string())
            .parse_mode(ParseMode::Html)
            .reply_markup(markup)
            .await
            .map_err(classify_error)?;
        Ok(Self::msg_ref(chat_id, &msg))
    }

    async fn send_media(
        &self,
        chat_id: ChatId,
        item: &MediaItem,
        caption: &str,
    ) -> DeliveryResult<MessageRef> {
        let chat = Self::tg_chat(chat_id);
        let msg = match item.kind {
            MediaKind::Photo => {
                self.bot
                    .send_photo(chat, Self::input_file(item))
                    .caption(caption.to_string())
                    .await
            }
            MediaKind::Document => {
                self.bot
                    .send_document(chat, Self::input_file(item))
                    .caption(caption.to_string())
                    .await
            }
        }
        .map_err(classify_error)?;
        Ok(Self::msg_ref(chat_id, &msg))
    }

    async fn send_album(
        &self,
        chat_id: ChatId,
        items: &[MediaItem],
        caption: &str,
    ) -> DeliveryResult<Vec<MessageRef>> {
        if items.is_empty() {
            return Err(DeliveryError::InvalidContent("empty album".to_string()));
        }
        let media: Vec<InputMedia> = items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::input_media(item, (i == 0).then_some(caption)))
            .collect();

        let msgs = self
            .bot
            .send_media_group(Self::tg_chat(chat_id), media)
            .await
            .map_err(classify_error)?;
        Ok(msgs.iter().map(|m| Self::msg_ref(chat_id, m)).collect())
    }

    async fn forward_message(&self, to: ChatId, source: MessageRef) -> DeliveryResult<MessageRef> {
        let msg = self
            .bot
            .forward_message(
                Self::tg_chat(to),
                Self::tg_chat(source.chat_id),
                Self::tg_msg_id(source.message_id),
            )
            .await
            .map_err(classify_error)?;
        Ok(Self::msg_ref(to, &msg))
    }

    async fn copy_message(&self, to: ChatId, source: MessageRef) -> DeliveryResult<MessageRef> {
        let id = self
            .bot
            .copy_message(
                Self::tg_chat(to),
                Self::tg_chat(source.chat_id),
                Self::tg_msg_id(source.message_id),
            )
            .await
            .map_err(classify_error)?;
        Ok(MessageRef {
            chat_id: to,
            message_id: MessageId(id.0),
        })
    }

    async fn answer_callback_query(&self, callback_id: &str) -> DeliveryResult<()> {
        self.bot
            .answer_callback_query(callback_id.to_string())
            .await
            .map_err(classify_error)?;
        Ok(())
    }
}
