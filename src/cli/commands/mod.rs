//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod event;
mod history;
mod search;
mod weather;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use event::run_event;
pub use history::run_history;
pub use search::run_search;
pub use weather::run_weather;
