//! Doctor command - verify keys, credentials and configuration.

use crate::calendar::TokenStore;
use crate::cli::output::mask;
use crate::cli::Output;
use crate::config::Settings;
use crate::http::HttpClient;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Ajudante Doctor");
    println!();
    println!("Checking keys, credentials and configuration...\n");

    let mut checks = Vec::new();

    let sections = [
        ("API Keys", check_api_keys(settings)),
        ("Google Calendar", check_calendar(settings)),
        ("Directories", check_directories(settings)),
        ("Configuration", vec![check_config_file(config_path)]),
    ];

    for (title, section) in sections {
        println!("{}", style(title).bold());
        for check in &section {
            check.print();
        }
        checks.extend(section);
        println!();
    }

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Ajudante.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Ajudante is ready to use.");
    }

    Ok(())
}

/// The OpenAI key is required; tool keys only disable their tools.
fn check_api_keys(settings: &Settings) -> Vec<CheckResult> {
    vec![
        check_env_key(
            &settings.agent.api_key_env,
            settings.agent.api_key.as_deref(),
            true,
        ),
        check_env_key(
            &settings.weather.api_key_env,
            settings.weather.api_key.as_deref(),
            false,
        ),
        check_env_key(
            &settings.search.api_key_env,
            settings.search.api_key.as_deref(),
            false,
        ),
    ]
}

fn check_env_key(env_var: &str, configured: Option<&str>, required: bool) -> CheckResult {
    if configured.is_some_and(|key| !key.is_empty()) {
        return CheckResult::ok(env_var, "set in config file");
    }

    let hint = format!("Set with: export {}='...' (or add it to .env)", env_var);
    match std::env::var(env_var) {
        Ok(key) if !key.is_empty() => CheckResult::ok(env_var, &format!("configured ({})", mask(&key))),
        Ok(_) if required => CheckResult::error(env_var, "empty", &hint),
        Ok(_) => CheckResult::warning(env_var, "empty, tool disabled", &hint),
        Err(_) if required => CheckResult::error(env_var, "not set", &hint),
        Err(_) => CheckResult::warning(env_var, "not set, tool disabled", &hint),
    }
}

fn check_calendar(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let token_path = settings.token_path();
    let store = match HttpClient::new(&settings.http) {
        Ok(http) => Some(TokenStore::new(&token_path, http)),
        Err(_) => None,
    };
    match store.map(|s| s.load()) {
        Some(Ok(user)) if user.refresh_token.is_some() => results.push(CheckResult::ok(
            "token.json",
            &format!("{} (refreshable)", token_path.display()),
        )),
        Some(Ok(_)) => results.push(CheckResult::warning(
            "token.json",
            &format!("{} (no refresh token)", token_path.display()),
            "Events fail once the access token expires; re-authorize to get a refresh token",
        )),
        Some(Err(e)) => results.push(CheckResult::warning(
            "token.json",
            &e.to_string(),
            "Authorize the calendar once and place token.json at the configured path",
        )),
        None => results.push(CheckResult::error(
            "token.json",
            "could not build HTTP client",
            "Check the [http] section of the config",
        )),
    }

    let credentials_path = settings.credentials_path();
    if credentials_path.exists() {
        results.push(CheckResult::ok(
            "credentials.json",
            &credentials_path.display().to_string(),
        ));
    } else {
        results.push(CheckResult::warning(
            "credentials.json",
            &format!("{} not found", credentials_path.display()),
            "Download OAuth client credentials from the Google Cloud console",
        ));
    }

    results
}

/// Check data directory and history database.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    let db_path = settings.history_path();
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        results.push(CheckResult::ok(
            "History database",
            &format!("{} ({})", db_path.display(), size),
        ));
    } else {
        results.push(CheckResult::warning(
            "History database",
            &format!("{} (not created yet)", db_path.display()),
            "Database will be created on the first 'ajudante ask'",
        ));
    }

    results
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: ajudante config init",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_tool_keys_only_warn() {
        let missing = check_env_key("AJUDANTE_TEST_DOCTOR_MISSING", None, false);
        assert_eq!(missing.status, CheckStatus::Warning);

        let required = check_env_key("AJUDANTE_TEST_DOCTOR_MISSING", None, true);
        assert_eq!(required.status, CheckStatus::Error);

        let from_config = check_env_key("AJUDANTE_TEST_DOCTOR_MISSING", Some("abc"), true);
        assert_eq!(from_config.status, CheckStatus::Ok);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }
}
