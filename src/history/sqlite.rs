//! SQLite-backed conversation history.
//!
//! Messages live in a single `message_store` table; ordering within a
//! session follows the autoincrement id.

use super::{HistoryStore, Message, SessionSummary, StoredMessage};
use crate::error::{AjudanteError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS message_store (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_message_store_session_id ON message_store(session_id);
"#;

/// SQLite history store.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Open (or create) the history database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite history store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AjudanteError::History(format!("Failed to acquire lock: {}", e)))
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    #[instrument(skip(self, message))]
    async fn append(&self, session_id: &str, message: &Message) -> Result<()> {
        self.append_all(session_id, std::slice::from_ref(message)).await
    }

    #[instrument(skip(self, messages), fields(count = messages.len()))]
    async fn append_all(&self, session_id: &str, messages: &[Message]) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();

        for message in messages {
            tx.execute(
                "INSERT INTO message_store (session_id, message, created_at) VALUES (?1, ?2, ?3)",
                params![session_id, serde_json::to_string(message)?, now],
            )?;
        }

        tx.commit()?;
        debug!("Appended {} messages to session {}", messages.len(), session_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn messages(&self, session_id: &str) -> Result<Vec<StoredMessage>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT message, created_at
            FROM message_store
            WHERE session_id = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            let payload: String = row.get(0)?;
            let created_at: String = row.get(1)?;
            Ok((payload, created_at))
        })?;

        let mut messages = Vec::new();
        for (position, row) in rows.enumerate() {
            let (payload, created_at) = row?;
            let message: Message = serde_json::from_str(&payload).map_err(|e| {
                AjudanteError::History(format!(
                    "Corrupt message {} in session {}: {}",
                    position, session_id, e
                ))
            })?;

            messages.push(StoredMessage {
                session_id: session_id.to_string(),
                position,
                message,
                created_at: parse_timestamp(&created_at),
            });
        }

        debug!("Loaded {} messages for session {}", messages.len(), session_id);
        Ok(messages)
    }

    #[instrument(skip(self))]
    async fn clear(&self, session_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM message_store WHERE session_id = ?1",
            params![session_id],
        )?;

        info!("Deleted {} messages for session {}", deleted, session_id);
        Ok(deleted)
    }

    async fn sessions(&self) -> Result<Vec<SessionSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT session_id, COUNT(*) AS message_count, MAX(created_at) AS last_activity
            FROM message_store
            GROUP BY session_id
            ORDER BY MAX(id) DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            let last_activity: String = row.get(2)?;
            Ok(SessionSummary {
                session_id: row.get(0)?,
                message_count: count as usize,
                last_activity: parse_timestamp(&last_activity),
            })
        })?;

        let sessions = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Role;

    #[tokio::test]
    async fn test_append_then_fetch_preserves_order() {
        let store = SqliteHistoryStore::in_memory().unwrap();

        store.append("1", &Message::user("oi")).await.unwrap();
        store.append("1", &Message::assistant("olá!")).await.unwrap();
        store.append("2", &Message::user("other session")).await.unwrap();
        store.append("1", &Message::user("tchau")).await.unwrap();

        let messages = store.messages("1").await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].message.content, "oi");
        assert_eq!(messages[1].message.role, Role::Assistant);
        assert_eq!(messages.last().unwrap().message.content, "tchau");
        assert_eq!(
            messages.iter().map(|m| m.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn test_clear_and_sessions() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        store
            .append_all("a", &[Message::user("q"), Message::assistant("r")])
            .await
            .unwrap();
        store.append("b", &Message::user("q")).await.unwrap();

        let sessions = store.sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "b");
        assert_eq!(sessions[1].message_count, 2);

        assert_eq!(store.clear("a").await.unwrap(), 2);
        assert!(store.messages("a").await.unwrap().is_empty());
        assert_eq!(store.sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("message_store.db");

        {
            let store = SqliteHistoryStore::new(&path).unwrap();
            store.append("1", &Message::user("lembre disso")).await.unwrap();
        }

        let store = SqliteHistoryStore::new(&path).unwrap();
        let messages = store.messages("1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message.content, "lembre disso");
    }
}
