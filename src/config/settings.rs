//! Configuration settings for Ajudante.

use crate::error::{AjudanteError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub agent: AgentSettings,
    pub history: HistorySettings,
    pub http: HttpSettings,
    pub weather: WeatherSettings,
    pub search: SearchSettings,
    pub calendar: CalendarSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Optional dotenv file loaded before secrets are resolved.
    pub env_file: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.ajudante".to_string(),
            env_file: None,
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model used for the agent.
    pub model: String,
    /// System prompt prepended to every turn.
    pub system_prompt: String,
    /// Maximum model calls per turn.
    pub max_iterations: usize,
    /// OpenAI API key. Falls back to the `api_key_env` variable when unset.
    pub api_key: Option<String>,
    /// Environment variable holding the OpenAI API key.
    pub api_key_env: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            max_iterations: 15,
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl AgentSettings {
    /// Resolve the model API key from the config file or the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Conversation history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Path to the SQLite history database.
    pub sqlite_path: String,
    /// Number of most recent messages replayed into each turn.
    pub max_messages: usize,
    /// Session used when none is given on the command line.
    pub default_session: String,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.ajudante/message_store.db".to_string(),
            max_messages: 20,
            default_session: "default".to_string(),
        }
    }
}

/// Outbound HTTP settings shared by every provider client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// First backoff delay in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for a single backoff delay in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
        }
    }
}

/// Realtime weather provider settings (Tomorrow.io).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// Realtime weather endpoint.
    pub base_url: String,
    /// API key. Falls back to the `api_key_env` variable when unset.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.tomorrow.io/v4/weather/realtime".to_string(),
            api_key: None,
            api_key_env: "WEATHER_API_KEY".to_string(),
        }
    }
}

impl WeatherSettings {
    /// Resolve the API key from the config file or the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Web search provider settings (Tavily).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// API base URL.
    pub base_url: String,
    /// API key. Falls back to the `api_key_env` variable when unset.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// How many days back `get_news` searches.
    pub news_lookback_days: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            api_key: None,
            api_key_env: "TAVILY_API_KEY".to_string(),
            news_lookback_days: 7,
        }
    }
}

impl SearchSettings {
    /// Resolve the API key from the config file or the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Google Calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Calendar API base URL.
    pub base_url: String,
    /// Calendar to insert events into.
    pub calendar_id: String,
    /// Authorized-user token file.
    pub token_path: String,
    /// OAuth client credentials of the GCP project.
    pub credentials_path: String,
    /// IANA zone the event times are interpreted in, e.g. `America/Sao_Paulo`.
    pub time_zone: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            calendar_id: "primary".to_string(),
            token_path: "token.json".to_string(),
            credentials_path: "credentials.json".to_string(),
            time_zone: "America/Sao_Paulo".to_string(),
        }
    }
}

fn resolve_secret(configured: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(value) = configured.filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }
    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => Err(AjudanteError::Config(format!("{} is empty", env_var))),
        Err(_) => Err(AjudanteError::Config(format!(
            "{} not set. Add it to your environment or .env file",
            env_var
        ))),
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AjudanteError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ajudante")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded history database path.
    pub fn history_path(&self) -> PathBuf {
        Self::expand_path(&self.history.sqlite_path)
    }

    /// Get the expanded calendar token path.
    pub fn token_path(&self) -> PathBuf {
        Self::expand_path(&self.calendar.token_path)
    }

    /// Get the expanded calendar credentials path.
    pub fn credentials_path(&self) -> PathBuf {
        Self::expand_path(&self.calendar.credentials_path)
    }

    /// Load the dotenv file, if any. A missing default `.env` is not an error.
    pub fn load_env(&self) -> Result<()> {
        match &self.general.env_file {
            Some(path) => {
                dotenvy::from_path(Self::expand_path(path))
                    .map_err(|e| AjudanteError::Config(format!("Failed to load {}: {}", path, e)))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Ok(())
    }
}
