//! CLI module for Ajudante.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Ajudante - a tool-calling assistant
///
/// Answers questions with a chat model that can check the weather, search the
/// web and create Google Calendar events, remembering each session locally.
#[derive(Parser, Debug)]
#[command(name = "ajudante")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the assistant something
    Ask {
        /// The message to send
        input: String,

        /// Conversation session to continue
        #[arg(short, long)]
        session: Option<String>,

        /// Return an answer with sources and weather as JSON
        #[arg(long)]
        structured: bool,

        /// Do not read or store conversation history
        #[arg(long)]
        no_history: bool,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show realtime weather for a city
    Weather {
        /// City name (e.g. "toronto")
        city: String,
    },

    /// Search the web
    Search {
        /// Search query
        query: String,

        /// Search depth (ultra-fast, fast, medium, advanced)
        #[arg(short, long, default_value = "fast")]
        depth: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "5")]
        max_results: u32,

        /// Topic (general, news, finance)
        #[arg(short, long)]
        topic: Option<String>,

        /// Only results published on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
    },

    /// Create a Google Calendar event
    Event {
        year: i32,
        month: u32,
        day: u32,
        start_hour: u32,
        start_minute: u32,
        end_hour: u32,
        end_minute: u32,

        /// Event title
        summary: String,

        /// Event description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Inspect or clear conversation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check API keys, credentials and configuration
    Doctor,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// Print the messages of a session
    Show {
        /// Session ID
        session: String,
    },

    /// Delete the messages of a session
    Clear {
        /// Session ID
        session: String,
    },

    /// List stored sessions
    List,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_command() {
        let cli = Cli::parse_from([
            "ajudante", "event", "2026", "1", "26", "10", "0", "11", "0", "Standup",
            "--description", "daily",
        ]);
        match cli.command {
            Commands::Event {
                year,
                end_hour,
                summary,
                description,
                ..
            } => {
                assert_eq!(year, 2026);
                assert_eq!(end_hour, 11);
                assert_eq!(summary, "Standup");
                assert_eq!(description, "daily");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::parse_from(["ajudante", "-vv", "ask", "hello", "--session", "s1", "--structured"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask {
                input,
                session,
                structured,
                no_history,
                ..
            } => {
                assert_eq!(input, "hello");
                assert_eq!(session.as_deref(), Some("s1"));
                assert!(structured);
                assert!(!no_history);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
