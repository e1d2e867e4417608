use crate::domain::{ChatId, MessageRef, UserId};

/// Cross-transport incoming update model.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Message(InboundMessage),
    Callback(CallbackAction),
}

/// Who sent an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub display_name: String,
    pub username: Option<String>,
}

#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub sender: Sender,
    pub message: MessageRef,
    pub text: Option<String>,
    pub media: Option<MediaItem>,
    /// Correlation token shared by items uploaded as one album.
    pub media_group_id: Option<String>,
    pub reply_to: Option<ReplyRef>,
}

impl InboundMessage {
    pub fn chat_id(&self) -> ChatId {
        self.message.chat_id
    }

    pub fn text_trimmed(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim)
    }
}

/// The message an inbound message replies to.
#[derive(Clone, Debug, Default)]
pub struct ReplyRef {
    /// Original author when the replied-to message is a forward (and the author's
    /// privacy settings expose it).
    pub forwarded_from: Option<UserId>,
}

#[derive(Clone, Debug)]
pub struct CallbackAction {
    pub sender: Sender,
    pub chat_id: ChatId,
    pub callback_id: String,
    pub data: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Document,
}

/// One piece of broadcastable media, addressed by the transport's file id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub file_id: String,
    pub caption: Option<String>,
}

impl MediaItem {
    pub fn photo(file_id: impl Into<String>, caption: Option<&str>) -> Self {
        Self {
            kind: MediaKind::Photo,
            file_id: file_id.into(),
            caption: caption.map(str::to_string),
        }
    }

    pub fn document(file_id: impl Into<String>, caption: Option<&str>) -> Self {
        Self {
            kind: MediaKind::Document,
            file_id: file_id.into(),
            caption: caption.map(str::to_string),
        }
    }

    /// Caption, if present and not blank.
    pub fn non_empty_caption(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Inline keyboard (buttons) used by the user menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    /// One button per row.
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}
