use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

// ---------------------------------------------------------------------------
// Channel identity
// ---------------------------------------------------------------------------

/// Cache and storage key of a wheel: `"{guild_id}_{channel_name}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Build the key for a channel. Guild id is empty for direct messages.
    pub fn new(guild_id: Option<&str>, channel_name: &str) -> Result<Self> {
        if channel_name.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "a channel name is required to locate the wheel".to_string(),
            ));
        }
        Ok(Self(format!("{}_{}", guild_id.unwrap_or_default(), channel_name)))
    }

    /// Wrap an already-composed key (API path parameter, stored row key).
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(AppError::InvalidArgument("wheel key must not be blank".to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandName {
    Spin,
    Add,
    Remove,
    Randomize,
    Preview,
    Reset,
    Unknown(String),
}

impl CommandName {
    pub fn parse(name: &str) -> Self {
        match name {
            "spin" => CommandName::Spin,
            "add" => CommandName::Add,
            "rm" => CommandName::Remove,
            "randomize" => CommandName::Randomize,
            "preview" => CommandName::Preview,
            "reset" => CommandName::Reset,
            other => CommandName::Unknown(other.to_string()),
        }
    }

    /// spin/preview/randomize/rm refuse to run on an empty wheel.
    pub fn requires_options(&self) -> bool {
        matches!(
            self,
            CommandName::Spin | CommandName::Preview | CommandName::Randomize | CommandName::Remove
        )
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CommandName::Spin => "spin",
            CommandName::Add => "add",
            CommandName::Remove => "rm",
            CommandName::Randomize => "randomize",
            CommandName::Preview => "preview",
            CommandName::Reset => "reset",
            CommandName::Unknown(name) => name.as_str(),
        };
        write!(f, "{s}")
    }
}

/// Named arguments a command may carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    /// `option`: free text.
    pub option: Option<String>,
    /// `index`: zero-based position on the wheel.
    pub index: Option<i64>,
}

/// One inbound slash-command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEvent {
    pub command: CommandName,
    pub guild_id: Option<String>,
    pub channel_name: String,
    pub user_name: String,
    pub args: CommandArgs,
}

impl CommandEvent {
    pub fn channel_key(&self) -> Result<ChannelKey> {
        ChannelKey::new(self.guild_id.as_deref(), &self.channel_name)
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn png(file_name: &str, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.to_string(), content_type: "image/png", bytes }
    }

    pub fn gif(file_name: &str, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.to_string(), content_type: "image/gif", bytes }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: String,
    pub attachment: Option<Attachment>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), attachment: None }
    }

    pub fn with_attachment(content: impl Into<String>, attachment: Attachment) -> Self {
        Self { content: content.into(), attachment: Some(attachment) }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Outcome of one spin. Produced per command, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    pub selected_index: usize,
    /// Degrees to rotate the drawn wheel so the pointer sits on the selected slice.
    pub target_rotation: f64,
    /// Total rotation the animation covers: whole turns plus `target_rotation`.
    pub spin_degrees: f64,
    pub winner: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_key_joins_guild_and_channel() {
        let key = ChannelKey::new(Some("1234"), "wheel-fun").unwrap();
        assert_eq!(key.as_str(), "1234_wheel-fun");
    }

    #[test]
    fn channel_key_without_guild_keeps_separator() {
        let key = ChannelKey::new(None, "wheel-dm").unwrap();
        assert_eq!(key.as_str(), "_wheel-dm");
    }

    #[test]
    fn blank_channel_is_rejected() {
        assert!(matches!(ChannelKey::new(Some("1"), "  "), Err(AppError::InvalidArgument(_))));
        assert!(matches!(ChannelKey::parse(""), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn command_names_round_trip_through_display() {
        for name in ["spin", "add", "rm", "randomize", "preview", "reset"] {
            assert_eq!(CommandName::parse(name).to_string(), name);
        }
        assert_eq!(CommandName::parse("dance"), CommandName::Unknown("dance".to_string()));
    }

    #[test]
    fn add_and_reset_do_not_need_options() {
        assert!(!CommandName::Add.requires_options());
        assert!(!CommandName::Reset.requires_options());
        assert!(CommandName::Spin.requires_options());
        assert!(CommandName::Remove.requires_options());
    }
}
