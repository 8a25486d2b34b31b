//! Ask command implementation.

use crate::cli::output::truncate;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    input: &str,
    session: Option<String>,
    structured: bool,
    no_history: bool,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ajudante doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings.clone())?;
    let session_id = session.unwrap_or_else(|| settings.history.default_session.clone());

    let spinner = Output::spinner("Thinking...");

    let result = if no_history {
        match orchestrator.agent(model.as_deref(), structured) {
            Ok(agent) => agent.run(input, &[]).await,
            Err(e) => Err(e),
        }
    } else {
        match orchestrator.session(model.as_deref(), structured) {
            Ok(session) => session.send(&session_id, input).await,
            Err(e) => Err(e),
        }
    };
    spinner.finish_and_clear();

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    };

    match &response.structured {
        Some(answer) => println!("{}", serde_json::to_string_pretty(answer)?),
        None => println!("\n{}\n", response.content),
    }

    if !response.tool_calls.is_empty() {
        Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
        for call in &response.tool_calls {
            Output::kv(&call.name, &truncate(&call.arguments, 60));
        }
        println!();
    }

    if no_history {
        Output::info(&format!("Completed in {} iteration(s)", response.iterations));
    } else {
        Output::info(&format!(
            "Completed in {} iteration(s), session '{}'",
            response.iterations, session_id
        ));
    }

    Ok(())
}
