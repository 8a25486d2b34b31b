//! Weather command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::weather::WeatherOutcome;
use anyhow::Result;

/// Run the weather command.
pub async fn run_weather(city: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Weather, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ajudante doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let weather = Orchestrator::new(settings)?.weather()?;

    let spinner = Output::spinner(&format!("Fetching weather for {}...", city));
    let outcome = weather.realtime(city).await;
    spinner.finish_and_clear();

    match outcome? {
        WeatherOutcome::Report(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        failed @ WeatherOutcome::Failed { .. } => Output::warning(&failed.to_string()),
    }

    Ok(())
}
