//! History command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{HistoryAction, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the history command.
pub async fn run_history(action: &HistoryAction, settings: Settings) -> Result<()> {
    preflight::check(Operation::History, &settings)?;
    let store = Orchestrator::new(settings)?.history_store()?;

    match action {
        HistoryAction::Show { session } => {
            let messages = store.messages(session).await?;
            if messages.is_empty() {
                Output::info(&format!("No messages in session '{}'.", session));
            } else {
                Output::header(&format!("Session '{}' ({} messages)", session, messages.len()));
                println!();
                for stored in &messages {
                    Output::message(&stored.message);
                }
            }
        }

        HistoryAction::Clear { session } => {
            let removed = store.clear(session).await?;
            Output::success(&format!(
                "Removed {} message(s) from session '{}'",
                removed, session
            ));
        }

        HistoryAction::List => {
            let sessions = store.sessions().await?;
            if sessions.is_empty() {
                Output::info("No sessions yet. Use 'ajudante ask <input>' to start one.");
            } else {
                Output::header(&format!("Sessions ({})", sessions.len()));
                println!();
                for summary in &sessions {
                    Output::kv(
                        &summary.session_id,
                        &format!(
                            "{} messages, last active {}",
                            summary.message_count,
                            summary.last_activity.format("%Y-%m-%d %H:%M")
                        ),
                    );
                }
            }
        }
    }

    Ok(())
}
