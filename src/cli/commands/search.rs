//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::search::{SearchDepth, SearchRequest, SearchTopic};
use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Run the search command.
pub async fn run_search(
    query: &str,
    depth: &str,
    max_results: u32,
    topic: Option<&str>,
    since: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let mut request = SearchRequest::new(query)
        .with_depth(depth.parse::<SearchDepth>()?)
        .with_max_results(max_results);
    if let Some(topic) = topic {
        request = request.with_topic(topic.parse::<SearchTopic>()?);
    }
    if let Some(since) = since {
        let date = NaiveDate::parse_from_str(since, "%Y-%m-%d")
            .with_context(|| format!("Invalid --since date '{}', expected YYYY-MM-DD", since))?;
        request = request.since(date);
    }

    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ajudante doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let search = Orchestrator::new(settings)?.search()?;

    let spinner = Output::spinner("Searching...");
    let results = search.search(&request).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => println!("{}", serde_json::to_string_pretty(&results)?),
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
