//! Agent turns with persisted conversation history.

use super::runner::{Agent, AgentResponse};
use crate::error::Result;
use crate::history::{trim_to_last, HistoryStore, Message};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Runs agent turns against a session's stored history.
///
/// Each turn replays the most recent messages, then stores the user input
/// and the final answer. Intermediate tool messages are not persisted.
pub struct Session {
    agent: Agent,
    store: Arc<dyn HistoryStore>,
    max_messages: usize,
}

impl Session {
    pub fn new(agent: Agent, store: Arc<dyn HistoryStore>, max_messages: usize) -> Self {
        Self {
            agent,
            store,
            max_messages,
        }
    }

    /// Run one turn in `session_id` and persist it.
    #[instrument(skip(self, input))]
    pub async fn send(&self, session_id: &str, input: &str) -> Result<AgentResponse> {
        let stored = self.store.messages(session_id).await?;
        let history: Vec<Message> = stored.into_iter().map(|m| m.message).collect();
        let history = trim_to_last(&history, self.max_messages);
        debug!("Replaying {} messages into session {}", history.len(), session_id);

        let response = self.agent.run(input, &history).await?.into_last_message();

        let mut to_store = vec![Message::user(input)];
        to_store.extend(response.last_message().cloned());
        self.store.append_all(session_id, &to_store).await?;

        Ok(response)
    }

    /// Stored history of a session.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Message>> {
        let stored = self.store.messages(session_id).await?;
        Ok(stored.into_iter().map(|m| m.message).collect())
    }
}
