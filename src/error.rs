//! Error types for Ajudante.

use thiserror::Error;

/// Library-level error type for Ajudante operations.
#[derive(Error, Debug)]
pub enum AjudanteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// The calendar accepted the request but did not confirm the event.
    #[error("Event not created (provider status: {})", status.as_deref().unwrap_or("missing"))]
    EventNotCreated { status: Option<String> },

    #[error("Weather provider error: {0}")]
    Weather(String),

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Calendar provider error: {0}")]
    Calendar(String),

    #[error("History store error: {0}")]
    History(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl AjudanteError {
    /// Whether retrying the same request may succeed.
    ///
    /// Only transport-level failures qualify; provider answers are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            AjudanteError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Result type alias for Ajudante operations.
pub type Result<T> = std::result::Result<T, AjudanteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_not_created_display() {
        let err = AjudanteError::EventNotCreated {
            status: Some("tentative".to_string()),
        };
        assert_eq!(err.to_string(), "Event not created (provider status: tentative)");

        let err = AjudanteError::EventNotCreated { status: None };
        assert_eq!(err.to_string(), "Event not created (provider status: missing)");
    }

    #[test]
    fn test_only_transport_errors_are_retryable() {
        assert!(!AjudanteError::Unauthenticated("no token".to_string()).is_retryable());
        assert!(!AjudanteError::Calendar("400".to_string()).is_retryable());
    }
}
