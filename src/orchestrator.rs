//! Component wiring for Ajudante.
//!
//! Builds providers, the history store and agents from [`Settings`]. Secrets
//! are resolved here and handed to constructors; nothing reads the
//! environment later.

use crate::agent::{Agent, Session, ToolContext};
use crate::calendar::{CalendarProvider, GoogleCalendar};
use crate::config::Settings;
use crate::error::Result;
use crate::history::{HistoryStore, SqliteHistoryStore};
use crate::http::HttpClient;
use crate::search::{SearchProvider, TavilySearch};
use crate::weather::{TomorrowIoWeather, WeatherProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds Ajudante components from settings.
pub struct Orchestrator {
    settings: Settings,
    http: HttpClient,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(settings: Settings) -> Result<Self> {
        let http = HttpClient::new(&settings.http)?;
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Weather provider. Fails when no API key is configured.
    pub fn weather(&self) -> Result<Arc<dyn WeatherProvider>> {
        let weather = TomorrowIoWeather::new(&self.settings.weather, self.http.clone())?;
        Ok(Arc::new(weather))
    }

    /// Search provider. Fails when no API key is configured.
    pub fn search(&self) -> Result<Arc<dyn SearchProvider>> {
        let search = TavilySearch::new(&self.settings.search, self.http.clone())?;
        Ok(Arc::new(search))
    }

    /// Calendar provider. Credentials are read on each insert, not here.
    pub fn calendar(&self) -> Result<Arc<dyn CalendarProvider>> {
        let calendar = GoogleCalendar::new(
            &self.settings.calendar,
            self.settings.token_path(),
            self.http.clone(),
        )?;
        Ok(Arc::new(calendar))
    }

    /// SQLite history store at the configured path.
    pub fn history_store(&self) -> Result<Arc<dyn HistoryStore>> {
        let store = SqliteHistoryStore::new(&self.settings.history_path())?;
        Ok(Arc::new(store))
    }

    /// Tool context with every provider that could be configured.
    ///
    /// Providers missing their API key are left out with a warning, so the
    /// agent still runs with the remaining tools.
    pub fn tools(&self) -> Result<ToolContext> {
        let mut tools =
            ToolContext::new().with_news_lookback_days(self.settings.search.news_lookback_days);

        match self.weather() {
            Ok(weather) => tools = tools.with_weather(weather),
            Err(e) => warn!("Weather tool disabled: {}", e),
        }
        match self.search() {
            Ok(search) => tools = tools.with_search(search),
            Err(e) => warn!("Search tools disabled: {}", e),
        }
        tools = tools.with_calendar(self.calendar()?);

        info!("Agent tools: {}", tools.available().join(", "));
        Ok(tools)
    }

    /// Agent with all available tools. Fails when no model API key is configured.
    pub fn agent(&self, model: Option<&str>, structured: bool) -> Result<Agent> {
        let mut agent_settings = self.settings.agent.clone();
        if let Some(model) = model {
            agent_settings.model = model.to_string();
        }

        let api_key = agent_settings.resolve_api_key()?;
        Ok(
            Agent::new(self.tools()?, &api_key, &agent_settings, &self.settings.http)?
                .with_structured_output(structured),
        )
    }

    /// Session runner backed by the SQLite history store.
    pub fn session(&self, model: Option<&str>, structured: bool) -> Result<Session> {
        Ok(Session::new(
            self.agent(model, structured)?,
            self.history_store()?,
            self.settings.history.max_messages,
        ))
    }
}
