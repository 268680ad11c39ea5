//! Conversation turns supplied by the caller on every request

use serde::{Deserialize, Serialize};

/// Number of trailing turns fed to the text generator as context
pub const MAX_CONTEXT_TURNS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum TurnRole {
    User,
    #[default]
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

// The dashboard labels hero replies with the hero's name ("batman",
// "hero", ...), so anything that is not the user is the assistant.
impl From<Option<String>> for TurnRole {
    fn from(s: Option<String>) -> Self {
        match s {
            Some(s) if s.trim().eq_ignore_ascii_case("user") => TurnRole::User,
            _ => TurnRole::Assistant,
        }
    }
}

/// A single message in the caller's chat history.
///
/// Accepts both `{ "sender", "text" }` (chat panel) and
/// `{ "role", "content" }` (dashboard request) on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(alias = "sender", default)]
    pub role: TurnRole,
    #[serde(alias = "content", default)]
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }

    /// The last `MAX_CONTEXT_TURNS` turns, oldest first.
    pub fn recent(turns: &[ConversationTurn]) -> &[ConversationTurn] {
        let start = turns.len().saturating_sub(MAX_CONTEXT_TURNS);
        &turns[start..]
    }

    /// Split off the most recent user message, returning it with the turns
    /// that preceded it.
    pub fn split_latest_user(turns: &[ConversationTurn]) -> (Option<&str>, &[ConversationTurn]) {
        match turns.iter().rposition(|t| t.role == TurnRole::User) {
            Some(idx) => {
                let text = turns[idx].text.trim();
                let message = if text.is_empty() { None } else { Some(text) };
                (message, &turns[..idx])
            }
            None => (None, turns),
        }
    }
}
