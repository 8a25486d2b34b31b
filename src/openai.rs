//! OpenAI client configuration.

use crate::config::HttpSettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Model calls can be slow; they get a longer timeout than tool calls.
const MIN_TIMEOUT_SECS: u64 = 120;

/// Create an OpenAI client for `api_key` with the configured timeout.
pub fn create_client(api_key: &str, http: &HttpSettings) -> Result<Client<OpenAIConfig>> {
    create_client_with_config(OpenAIConfig::new().with_api_key(api_key), http)
}

/// Create an OpenAI client with an explicit config (custom base URL or key).
pub fn create_client_with_config(
    config: OpenAIConfig,
    http: &HttpSettings,
) -> Result<Client<OpenAIConfig>> {
    let timeout = Duration::from_secs(http.timeout_secs.max(MIN_TIMEOUT_SECS));
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
