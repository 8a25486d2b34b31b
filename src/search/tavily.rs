//! Tavily search client.

use super::{SearchProvider, SearchRequest};
use crate::config::SearchSettings;
use crate::error::{AjudanteError, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

/// Search provider backed by the Tavily API.
pub struct TavilySearch {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl TavilySearch {
    /// Create a client from settings, resolving the API key.
    pub fn new(settings: &SearchSettings, http: HttpClient) -> Result<Self> {
        let api_key = settings.resolve_api_key()?;
        Ok(Self::with_api_key(&settings.base_url, &api_key, http))
    }

    /// Create a client with an explicit base URL and key.
    pub fn with_api_key(base_url: &str, api_key: &str, http: HttpClient) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    #[instrument(skip(self, request), fields(query = %request.query, depth = %request.search_depth))]
    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        if request.query.trim().is_empty() {
            return Err(AjudanteError::InvalidInput("Search query must not be empty".to_string()));
        }

        let http_request = self
            .http
            .inner()
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request);

        let response = self.http.send(http_request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AjudanteError::Search(format!("status {}: {}", status.as_u16(), body)));
        }

        let results: Value = response
            .json()
            .await
            .map_err(|e| AjudanteError::Search(format!("Invalid JSON body: {}", e)))?;

        debug!(
            "Search returned {} results",
            results["results"].as_array().map(|r| r.len()).unwrap_or(0)
        );
        Ok(results)
    }
}
