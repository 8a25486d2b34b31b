//! Event command implementation.

use crate::agent::EVENT_NOT_CREATED;
use crate::calendar::{CalendarEvent, EventZone};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::AjudanteError;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the event command.
pub async fn run_event(event: CalendarEvent, settings: Settings) -> Result<()> {
    // Reject bad ranges before looking for credentials.
    event.time_range(&EventZone::from_settings(&settings.calendar)?)?;

    if let Err(e) = preflight::check(Operation::Event, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Authorize the calendar and place token.json at the configured path.");
        return Err(e.into());
    }

    let calendar = Orchestrator::new(settings)?.calendar()?;

    let spinner = Output::spinner("Creating event...");
    let created = calendar.insert_event(&event).await;
    spinner.finish_and_clear();

    match created {
        Ok(created) => {
            Output::success("Event created");
            if let Some(id) = &created.id {
                Output::kv("id", id);
            }
            Output::kv("status", &created.status);
            if let Some(link) = &created.html_link {
                Output::kv("link", link);
            }
        }
        Err(e @ AjudanteError::EventNotCreated { .. }) => {
            Output::warning(EVENT_NOT_CREATED);
            return Err(e.into());
        }
        Err(e) => {
            Output::error(&format!("Failed to create event: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
