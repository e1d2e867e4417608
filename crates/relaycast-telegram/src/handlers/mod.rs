//! Telegram update handlers.
//!
//! Each handler maps a teloxide update into the core `IncomingUpdate` model and hands
//! it to the `RelayRouter`. Handlers never fail the dispatcher: delivery problems are
//! logged inside the router.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message, User},
};

use relaycast_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::{
        CallbackAction, InboundMessage, IncomingUpdate, MediaItem, ReplyRef, Sender,
    },
};

use crate::router::AppState;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(action) = callback_action(&q) else {
        // Always answer callback query eventually.
        let _ = bot.answer_callback_query(q.id).await;
        return Ok(());
    };
    state.relay.handle(IncomingUpdate::Callback(action)).await;
    Ok(())
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(inbound) = inbound_message(&msg) else {
        tracing::debug!(chat_id = msg.chat.id.0, "ignoring non-private or anonymous message");
        return Ok(());
    };
    state.relay.handle(IncomingUpdate::Message(inbound)).await;
    Ok(())
}

fn sender(user: &User) -> Sender {
    Sender {
        id: UserId(user.id.0 as i64),
        display_name: user.full_name(),
        username: user.username.clone(),
    }
}

/// Private-chat messages only; the relay addresses users by their private chat.
fn inbound_message(msg: &Message) -> Option<InboundMessage> {
    if !msg.chat.is_private() {
        return None;
    }
    let user = msg.from()?;

    let media = if let Some(best) = msg.photo().and_then(|sizes| sizes.last()) {
        Some(MediaItem::photo(best.file.id.clone(), msg.caption()))
    } else {
        msg.document()
            .map(|doc| MediaItem::document(doc.file.id.clone(), msg.caption()))
    };

    let reply_to = msg.reply_to_message().map(|reply| ReplyRef {
        forwarded_from: reply.forward_from_user().map(|u| UserId(u.id.0 as i64)),
    });

    Some(InboundMessage {
        sender: sender(user),
        message: MessageRef {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(msg.id.0),
        },
        text: msg.text().map(str::to_string),
        media,
        media_group_id: msg.media_group_id().map(str::to_string),
        reply_to,
    })
}

fn callback_action(q: &CallbackQuery) -> Option<CallbackAction> {
    let chat = q.message.as_ref()?.chat.id;
    let data = q.data.clone().filter(|d| !d.is_empty())?;
    Some(CallbackAction {
        sender: sender(&q.from),
        chat_id: ChatId(chat.0),
        callback_id: q.id.clone(),
        data,
    })
}
