//! In-memory conversation history.
//!
//! Useful for testing and for one-off runs that should not persist.

use super::{HistoryStore, Message, SessionSummary, StoredMessage};
use crate::error::{AjudanteError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory history store.
pub struct MemoryHistoryStore {
    sessions: RwLock<HashMap<String, Vec<StoredMessage>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> AjudanteError {
    AjudanteError::History(format!("Lock poisoned: {}", e))
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, session_id: &str, message: &Message) -> Result<()> {
        self.append_all(session_id, std::slice::from_ref(message)).await
    }

    async fn append_all(&self, session_id: &str, messages: &[Message]) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let log = sessions.entry(session_id.to_string()).or_default();
        let now = Utc::now();

        for message in messages {
            log.push(StoredMessage {
                session_id: session_id.to_string(),
                position: log.len(),
                message: message.clone(),
                created_at: now,
            });
        }
        Ok(())
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<StoredMessage>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn clear(&self, session_id: &str) -> Result<usize> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        Ok(sessions.remove(session_id).map(|log| log.len()).unwrap_or(0))
    }

    async fn sessions(&self) -> Result<Vec<SessionSummary>> {
        let sessions = self.sessions.read().map_err(poisoned)?;

        let mut summaries: Vec<SessionSummary> = sessions
            .iter()
            .filter_map(|(id, log)| {
                log.last().map(|last| SessionSummary {
                    session_id: id.clone(),
                    message_count: log.len(),
                    last_activity: last.created_at,
                })
            })
            .collect();

        summaries.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryHistoryStore::new();
        store.append("s", &Message::user("um")).await.unwrap();
        store
            .append_all("s", &[Message::assistant("dois"), Message::user("três")])
            .await
            .unwrap();

        let messages = store.messages("s").await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].position, 2);
        assert_eq!(messages[2].message.content, "três");

        assert!(store.messages("unknown").await.unwrap().is_empty());
        assert_eq!(store.clear("s").await.unwrap(), 3);
        assert_eq!(store.clear("s").await.unwrap(), 0);
    }
}
