//! Web search requests and providers.

mod tavily;

pub use tavily::TavilySearch;

use crate::error::{AjudanteError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How hard the provider should look. Faster depths return fewer, shallower results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchDepth {
    UltraFast,
    #[default]
    Fast,
    Medium,
    Advanced,
}

impl std::str::FromStr for SearchDepth {
    type Err = AjudanteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "ultra-fast" => Ok(SearchDepth::UltraFast),
            "fast" => Ok(SearchDepth::Fast),
            "medium" => Ok(SearchDepth::Medium),
            "advanced" => Ok(SearchDepth::Advanced),
            _ => Err(AjudanteError::InvalidInput(format!("Unknown search depth: {}", s))),
        }
    }
}

impl std::fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchDepth::UltraFast => write!(f, "ultra-fast"),
            SearchDepth::Fast => write!(f, "fast"),
            SearchDepth::Medium => write!(f, "medium"),
            SearchDepth::Advanced => write!(f, "advanced"),
        }
    }
}

/// Optional topic filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    General,
    News,
    Finance,
}

impl std::str::FromStr for SearchTopic {
    type Err = AjudanteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "general" => Ok(SearchTopic::General),
            "news" => Ok(SearchTopic::News),
            "finance" => Ok(SearchTopic::Finance),
            _ => Err(AjudanteError::InvalidInput(format!("Unknown search topic: {}", s))),
        }
    }
}

/// A search request as sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub search_depth: SearchDepth,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<SearchTopic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl SearchRequest {
    /// Create a request with the default depth and result count.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_depth: SearchDepth::default(),
            max_results: 5,
            topic: None,
            start_date: None,
        }
    }

    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_topic(mut self, topic: SearchTopic) -> Self {
        self.topic = Some(topic);
        self
    }

    /// Only return results published on or after `date`.
    pub fn since(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }
}

/// Trait for web search providers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a search and return the provider's results unmodified.
    async fn search(&self, request: &SearchRequest) -> Result<Value>;
}
