//! Inbound command surface.
//!
//! A message is command-shaped when its first whitespace-delimited token
//! starts with `/`. Everything else is ignored, not dispatched.

/// Parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Ping,
    Status,
    ListModels,
    Stop,
    Resume,
    ManualSearch,
    Unknown,
}

impl Command {
    /// Parse an inbound message. Returns `None` for text that is not
    /// command-shaped. Matching is case-insensitive on the first token,
    /// with any `@botname` mention suffix stripped.
    pub fn parse(text: &str) -> Option<Command> {
        let token = text.trim().split_whitespace().next()?;
        let token = token.strip_prefix('/')?;
        let token = token.split('@').next().unwrap_or(token);
        Some(match token.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "ping" => Command::Ping,
            "status" => Command::Status,
            "list_models" | "listmodels" => Command::ListModels,
            "stop" => Command::Stop,
            "resume" => Command::Resume,
            "search" | "manual_search" => Command::ManualSearch,
            _ => Command::Unknown,
        })
    }
}
