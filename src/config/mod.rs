//! Configuration module for Ajudante.
//!
//! Handles loading application settings and resolving provider secrets.

mod settings;

pub use settings::{
    AgentSettings, CalendarSettings, GeneralSettings, HistorySettings, HttpSettings,
    SearchSettings, Settings, WeatherSettings,
};
