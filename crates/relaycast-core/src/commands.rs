use crate::domain::UserId;

/// Split `/cmd@botname args` into a lowercase command name and the rest.
///
/// Returns `None` for text that is not a command.
pub fn parse_command(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    Some((cmd, rest))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    Subscribers,
    ToggleMailing,
    Status,
    End(EndTarget),
}

/// Who `/end` should close.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndTarget {
    /// Bare `/end`: the reply target or the open session.
    Implicit,
    User(UserId),
    /// An argument that is not a user id. Nothing is closed.
    Invalid,
}

impl EndTarget {
    fn parse(args: &str) -> Self {
        if args.is_empty() {
            return Self::Implicit;
        }
        match args.parse::<i64>() {
            Ok(id) => Self::User(UserId(id)),
            Err(_) => Self::Invalid,
        }
    }
}

impl AdminCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let (cmd, args) = parse_command(text)?;
        match cmd.as_str() {
            "subscribers" => Some(Self::Subscribers),
            "toggle_mailing" => Some(Self::ToggleMailing),
            "status" => Some(Self::Status),
            "end" => Some(Self::End(EndTarget::parse(&args))),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserCommand {
    Start,
    Stop,
}

impl UserCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let (cmd, _) = parse_command(text)?;
        match cmd.as_str() {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}
