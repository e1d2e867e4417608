//! In-memory `MessagingPort` for unit tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::{DeliveryError, DeliveryResult},
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MediaItem},
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Html(ChatId, String),
    Keyboard(ChatId, String, InlineKeyboard),
    Media(ChatId, MediaItem, String),
    Album(ChatId, Vec<MediaItem>, String),
    Forward(ChatId, MessageRef),
    Copy(ChatId, MessageRef),
    CallbackAnswer(String),
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    sent: Mutex<Vec<Sent>>,
    failures: Mutex<HashMap<i64, DeliveryError>>,
}

impl FakeMessenger {
    /// Make every send to `chat_id` fail with `err`.
    pub fn fail_for(&self, chat_id: i64, err: DeliveryError) {
        self.failures.lock().unwrap().insert(chat_id, err);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn html_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Html(c, t) if c.0 == chat_id => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn keyboards_to(&self, chat_id: i64) -> Vec<(String, InlineKeyboard)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Keyboard(c, t, k) if c.0 == chat_id => Some((t, k)),
                _ => None,
            })
            .collect()
    }

    pub fn media_sends(&self) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| matches!(s, Sent::Media(..) | Sent::Album(..)))
            .collect()
    }

    fn record(&self, chat_id: ChatId, sent: Sent) -> DeliveryResult<MessageRef> {
        if let Some(err) = self.failures.lock().unwrap().get(&chat_id.0) {
            return Err(err.clone());
        }
        self.sent.lock().unwrap().push(sent);
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        })
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> DeliveryResult<MessageRef> {
        self.record(chat_id, Sent::Html(chat_id, html.to_string()))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> DeliveryResult<MessageRef> {
        self.record(chat_id, Sent::Keyboard(chat_id, html.to_string(), keyboard))
    }

    async fn send_media(
        &self,
        chat_id: ChatId,
        item: &MediaItem,
        caption: &str,
    ) -> DeliveryResult<MessageRef> {
        self.record(
            chat_id,
            Sent::Media(chat_id, item.clone(), caption.to_string()),
        )
    }

    async fn send_album(
        &self,
        chat_id: ChatId,
        items: &[MediaItem],
        caption: &str,
    ) -> DeliveryResult<Vec<MessageRef>> {
        let first = self.record(
            chat_id,
            Sent::Album(chat_id, items.to_vec(), caption.to_string()),
        )?;
        Ok(vec![first])
    }

    async fn forward_message(&self, to: ChatId, source: MessageRef) -> DeliveryResult<MessageRef> {
        self.record(to, Sent::Forward(to, source))
    }

    async fn copy_message(&self, to: ChatId, source: MessageRef) -> DeliveryResult<MessageRef> {
        self.record(to, Sent::Copy(to, source))
    }

    async fn answer_callback_query(&self, callback_id: &str) -> DeliveryResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::CallbackAnswer(callback_id.to_string()));
        Ok(())
    }
}
