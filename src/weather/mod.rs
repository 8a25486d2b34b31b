//! Realtime weather lookups.

mod tomorrow;

pub use tomorrow::TomorrowIoWeather;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Outcome of a weather lookup.
///
/// A non-200 answer from the provider is a normal outcome, not an error, so
/// the agent can fold it into its reply.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutcome {
    /// Provider JSON, returned verbatim.
    Report(Value),
    /// Provider answered with a non-200 status.
    Failed { status: u16 },
}

impl WeatherOutcome {
    /// The provider payload, if the lookup succeeded.
    pub fn report(&self) -> Option<&Value> {
        match self {
            WeatherOutcome::Report(value) => Some(value),
            WeatherOutcome::Failed { .. } => None,
        }
    }
}

impl fmt::Display for WeatherOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherOutcome::Report(value) => write!(f, "{}", value),
            WeatherOutcome::Failed { status } => write!(f, "Erro: status code {}", status),
        }
    }
}

/// Trait for weather providers.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for a city.
    async fn realtime(&self, city: &str) -> Result<WeatherOutcome>;
}
