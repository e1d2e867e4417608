use crate::messaging::types::{InlineButton, InlineKeyboard};

pub const MENU_PROMPT: &str = "Choose an action:";
pub const MENU_HINT: &str = "Please use the menu buttons (/start)";

/// Callback payloads carried by menu buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Subscribe,
    Unsubscribe,
    ContactManager,
    EndChat,
    Close,
}

impl MenuAction {
    pub fn callback_data(self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::ContactManager => "contact_manager",
            Self::EndChat => "end_chat",
            Self::Close => "close",
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "subscribe" => Some(Self::Subscribe),
            "unsubscribe" => Some(Self::Unsubscribe),
            "contact_manager" => Some(Self::ContactManager),
            "end_chat" => Some(Self::EndChat),
            "close" => Some(Self::Close),
            _ => None,
        }
    }

    fn button(self, label: &str) -> InlineButton {
        InlineButton::new(label, self.callback_data())
    }
}

/// Main menu; the first button flips with the subscription state.
pub fn main_menu(is_subscribed: bool) -> InlineKeyboard {
    let subscription = if is_subscribed {
        MenuAction::Unsubscribe.button("❌ Unsubscribe from mailing")
    } else {
        MenuAction::Subscribe.button("📩 Subscribe to mailing")
    };
    InlineKeyboard::new(vec![
        subscription,
        MenuAction::ContactManager.button("💬 Message the manager"),
        MenuAction::Close.button("❌ Close"),
    ])
}

pub fn end_chat_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![MenuAction::EndChat.button("🔴 End chat")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_data_round_trips_for_every_action() {
        for action in [
            MenuAction::Subscribe,
            MenuAction::Unsubscribe,
            MenuAction::ContactManager,
            MenuAction::EndChat,
            MenuAction::Close,
        ] {
            assert_eq!(MenuAction::parse(action.callback_data()), Some(action));
        }
        assert_eq!(MenuAction::parse("askuser:1:2"), None);
    }

    #[test]
    fn menu_reflects_subscription() {
        assert_eq!(main_menu(false).buttons[0].callback_data, "subscribe");
        assert_eq!(main_menu(true).buttons[0].callback_data, "unsubscribe");
        assert_eq!(main_menu(true).buttons.len(), 3);
    }
}
