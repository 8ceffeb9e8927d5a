//! Chat command parsing.

/// The commands the bot answers. Anything else gets no reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Roast(String),
    Price(String),
    Balance(String),
}

impl Command {
    /// Parse a raw chat message into a command.
    ///
    /// Accepts `/cmd` and `/cmd@botname`; the argument is the rest of the
    /// message after the first whitespace run, trimmed.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let (cmd, arg) = split_command(text);
        match cmd.as_str() {
            "start" => Some(Command::Start),
            "roast" => Some(Command::Roast(arg)),
            "price" => Some(Command::Price(arg)),
            "balance" => Some(Command::Balance(arg)),
            _ => None,
        }
    }
}

fn split_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}
