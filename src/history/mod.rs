//! Conversation history keyed by session.
//!
//! Provides a trait-based interface with SQLite and in-memory backends.

mod memory;
mod sqlite;

pub use memory::MemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A chat message, as persisted in the message payload column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Tool name, for tool results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            name: Some(name.into()),
        }
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
        }
    }
}

/// A message as stored for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub session_id: String,
    /// Zero-based position within the session.
    pub position: usize,
    pub message: Message,
    pub created_at: DateTime<Utc>,
}

/// Summary of a stored session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub message_count: usize,
    pub last_activity: DateTime<Utc>,
}

/// Trait for conversation history backends.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one message to a session.
    async fn append(&self, session_id: &str, message: &Message) -> Result<()>;

    /// Append several messages atomically, in order.
    async fn append_all(&self, session_id: &str, messages: &[Message]) -> Result<()>;

    /// All messages of a session, oldest first.
    async fn messages(&self, session_id: &str) -> Result<Vec<StoredMessage>>;

    /// Delete a session's messages, returning how many were removed.
    async fn clear(&self, session_id: &str) -> Result<usize>;

    /// All sessions with at least one message, most recent first.
    async fn sessions(&self) -> Result<Vec<SessionSummary>>;
}

/// Message-count trimming: keep the `max_messages` most recent messages.
///
/// Every message counts as one unit, whatever its length.
pub fn trim_to_last<T: Clone>(messages: &[T], max_messages: usize) -> Vec<T> {
    let start = messages.len().saturating_sub(max_messages);
    messages[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_keeps_most_recent() {
        let messages: Vec<Message> = (0..30).map(|i| Message::user(format!("m{}", i))).collect();

        let trimmed = trim_to_last(&messages, 20);
        assert_eq!(trimmed.len(), 20);
        assert_eq!(trimmed.first().unwrap().content, "m10");
        assert_eq!(trimmed.last().unwrap().content, "m29");
    }

    #[test]
    fn test_trim_ignores_message_length() {
        let messages = vec![
            Message::user("x".repeat(10_000)),
            Message::assistant("short"),
            Message::user("y".repeat(50_000)),
        ];

        let trimmed = trim_to_last(&messages, 2);
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed[0].content, "short");
        assert_eq!(trimmed[1].content.len(), 50_000);
    }

    #[test]
    fn test_trim_short_and_zero() {
        let messages = vec![Message::user("a"), Message::assistant("b")];
        assert_eq!(trim_to_last(&messages, 20), messages);
        assert!(trim_to_last(&messages, 0).is_empty());
    }

    #[test]
    fn test_message_payload_format() {
        let json = serde_json::to_string(&Message::assistant("olá")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"olá"}"#);

        let tool: Message =
            serde_json::from_str(r#"{"role":"tool","content":"{}","name":"get_weather"}"#).unwrap();
        assert_eq!(tool, Message::tool("get_weather", "{}"));
    }
}
