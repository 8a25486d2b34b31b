//! Ajudante - a tool-calling assistant
//!
//! A local CLI and library that lets a chat model call a small set of tools
//! and remembers each conversation in SQLite.
//!
//! # Overview
//!
//! Ajudante allows you to:
//! - Ask questions that the model answers using realtime weather and web search
//! - Create Google Calendar events from natural language
//! - Keep per-session history, trimmed to the most recent messages each turn
//! - Get answers as schema-validated JSON with sources
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `http` - Shared HTTP client with timeout and bounded retry
//! - `weather` - Realtime weather lookups
//! - `search` - Web search
//! - `calendar` - Calendar event creation and stored Google credentials
//! - `history` - Conversation history stores
//! - `agent` - Tool-calling loop, structured answers and sessions
//! - `orchestrator` - Builds components from settings
//!
//! # Example
//!
//! ```rust,no_run
//! use ajudante::config::Settings;
//! use ajudante::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     settings.load_env()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let session = orchestrator.session(None, false)?;
//!     let response = session.send("default", "What's the weather in Toronto?").await?;
//!     println!("{}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod http;
pub mod openai;
pub mod orchestrator;
pub mod search;
pub mod weather;

pub use error::{AjudanteError, Result};
