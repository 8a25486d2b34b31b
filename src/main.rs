//! Ajudante CLI entry point.

use ajudante::calendar::CalendarEvent;
use ajudante::cli::{commands, Cli, Commands};
use ajudante::config::Settings;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("ajudante={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration, then secrets
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;
    settings.load_env()?;

    std::fs::create_dir_all(settings.data_dir())?;

    match cli.command {
        Commands::Ask {
            input,
            session,
            structured,
            no_history,
            model,
        } => {
            commands::run_ask(&input, session, structured, no_history, model, settings).await?;
        }

        Commands::Weather { city } => {
            commands::run_weather(&city, settings).await?;
        }

        Commands::Search {
            query,
            depth,
            max_results,
            topic,
            since,
        } => {
            commands::run_search(
                &query,
                &depth,
                max_results,
                topic.as_deref(),
                since.as_deref(),
                settings,
            )
            .await?;
        }

        Commands::Event {
            year,
            month,
            day,
            start_hour,
            start_minute,
            end_hour,
            end_minute,
            summary,
            description,
        } => {
            let event = CalendarEvent {
                year,
                month,
                day,
                start_hour,
                start_minute,
                end_hour,
                end_minute,
                summary,
                description,
            };
            commands::run_event(event, settings).await?;
        }

        Commands::History { action } => {
            commands::run_history(&action, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }

        Commands::Doctor => {
            let path = config_path.unwrap_or_else(Settings::default_config_path);
            commands::run_doctor(&settings, &path)?;
        }
    }

    Ok(())
}
