//! Admin- and user-facing texts (Telegram HTML).

use crate::{
    broadcast::{BroadcastContent, BroadcastReport},
    domain::UserId,
    subscribers::Subscriber,
};

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn at_username(username: Option<&str>) -> String {
    match username {
        Some(u) if !u.is_empty() => format!("@{}", escape_html(u)),
        _ => "not set".to_string(),
    }
}

pub fn format_subscriber_list(subscribers: &[Subscriber]) -> String {
    if subscribers.is_empty() {
        return "No subscribers yet".to_string();
    }

    let mut out = format!("📊 Total subscribers: {}\n\n", subscribers.len());
    for s in subscribers {
        out.push_str(&format!(
            "🆔 ID: <code>{}</code>\n👤 Name: {}\n📛 Username: {}\n📅 Since: {}\n\n",
            s.id,
            escape_html(&s.display_name),
            at_username(s.username.as_deref()),
            s.subscribed_at.format("%Y-%m-%d %H:%M UTC"),
        ));
    }
    out.trim_end().to_string()
}

pub fn format_new_subscriber(id: UserId, display_name: &str, username: Option<&str>) -> String {
    format!(
        "🎉 New subscriber!\n\nID: <code>{id}</code>\nName: {}\nUsername: {}",
        escape_html(display_name),
        at_username(username),
    )
}

pub fn format_session_opened(id: UserId, display_name: &str, username: Option<&str>) -> String {
    format!(
        "❗ Chat with user <code>{id}</code> ({} - {})\nReply to a forwarded message to answer.",
        at_username(username),
        escape_html(display_name),
    )
}

pub fn format_session_closed_for_admin(id: UserId) -> String {
    format!("⚠ Chat with user <code>{id}</code> ended")
}

pub fn format_mailing_toggled(active: bool) -> String {
    if active {
        "✅ Mailing enabled".to_string()
    } else {
        "❌ Mailing paused".to_string()
    }
}

/// Render a fan-out report for the admin.
///
/// Album broadcasts mention how many items the album carried.
pub fn format_broadcast_report(content: &BroadcastContent, report: &BroadcastReport) -> String {
    if report.total == 0 {
        return "No subscribers to broadcast to".to_string();
    }

    let mut out = match content {
        BroadcastContent::Album(items) => format!(
            "Album broadcast finished:\nItems in album: {}\nSucceeded: {}\nFailed: {}",
            items.len(),
            report.succeeded,
            report.failed
        ),
        BroadcastContent::Single(_) => format!(
            "Broadcast finished:\nSucceeded: {}\nFailed: {}",
            report.succeeded, report.failed
        ),
    };
    if !report.pruned.is_empty() {
        out.push_str(&format!(
            "\n\nNote: {} user(s) who blocked the bot were removed from subscribers",
            report.pruned.len()
        ));
    }
    out
}

pub fn format_status(
    subscribers: usize,
    open_sessions: usize,
    pending_albums: usize,
    mailing_active: bool,
) -> String {
    let mailing = if mailing_active { "on" } else { "paused" };
    format!(
        "<b>Status</b>\nSubscribers: {subscribers}\nOpen chats: {open_sessions}\nPending albums: {pending_albums}\nMailing: {mailing}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::types::MediaItem;
    use chrono::{TimeZone, Utc};

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn subscriber_list_escapes_names_and_handles_missing_username() {
        let subs = vec![Subscriber {
            id: UserId(7),
            display_name: "<Bob>".to_string(),
            username: None,
            subscribed_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        }];
        let out = format_subscriber_list(&subs);
        assert!(out.starts_with("📊 Total subscribers: 1"));
        assert!(out.contains("&lt;Bob&gt;"));
        assert!(out.contains("Username: not set"));
        assert!(out.contains("2026-01-02 03:04 UTC"));
    }

    #[test]
    fn empty_subscriber_list() {
        assert_eq!(format_subscriber_list(&[]), "No subscribers yet");
    }

    #[test]
    fn album_report_mentions_items_and_pruning() {
        let content = BroadcastContent::Album(vec![
            MediaItem::photo("a", None),
            MediaItem::photo("b", None),
        ]);
        let report = BroadcastReport {
            total: 3,
            succeeded: 2,
            failed: 1,
            pruned: vec![UserId(2)],
        };
        let out = format_broadcast_report(&content, &report);
        assert!(out.contains("Items in album: 2"));
        assert!(out.contains("Succeeded: 2"));
        assert!(out.contains("Failed: 1"));
        assert!(out.contains("blocked the bot"));
    }

    #[test]
    fn failures_without_pruning_have_no_note() {
        let content = BroadcastContent::Single(MediaItem::document("d", None));
        let report = BroadcastReport {
            total: 2,
            succeeded: 1,
            failed: 1,
            pruned: vec![],
        };
        let out = format_broadcast_report(&content, &report);
        assert_eq!(out, "Broadcast finished:\nSucceeded: 1\nFailed: 1");
    }

    #[test]
    fn empty_report_says_no_subscribers() {
        let content = BroadcastContent::Single(MediaItem::photo("p", None));
        let out = format_broadcast_report(&content, &BroadcastReport::default());
        assert_eq!(out, "No subscribers to broadcast to");
    }
}
