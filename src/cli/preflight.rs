//! Pre-flight checks before calling external services.
//!
//! Validates that required keys and credentials are available so a command
//! fails up front instead of midway through an agent turn.

use crate::config::Settings;
use crate::error::{AjudanteError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Agent turns need the OpenAI key.
    Ask,
    /// Weather lookups need the weather key.
    Weather,
    /// Searches need the search key.
    Search,
    /// Event creation needs the stored Google credential.
    Event,
    /// History commands only touch the local database.
    History,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ask => settings.agent.resolve_api_key().map(|_| ()),
        Operation::Weather => settings.weather.resolve_api_key().map(|_| ()),
        Operation::Search => settings.search.resolve_api_key().map(|_| ()),
        Operation::Event => {
            let token_path = settings.token_path();
            if token_path.exists() {
                Ok(())
            } else {
                Err(AjudanteError::Unauthenticated(format!(
                    "no stored credential at {}",
                    token_path.display()
                )))
            }
        }
        Operation::History => Ok(()),
    }
}
