//! Tomorrow.io realtime weather client.

use super::{WeatherOutcome, WeatherProvider};
use crate::config::WeatherSettings;
use crate::error::{AjudanteError, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING};
use reqwest::StatusCode;
use tracing::{debug, info, instrument};

/// Weather provider backed by the Tomorrow.io realtime endpoint.
pub struct TomorrowIoWeather {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl TomorrowIoWeather {
    /// Create a client from settings, resolving the API key.
    pub fn new(settings: &WeatherSettings, http: HttpClient) -> Result<Self> {
        let api_key = settings.resolve_api_key()?;
        Ok(Self::with_api_key(&settings.base_url, &api_key, http))
    }

    /// Create a client with an explicit endpoint and key.
    pub fn with_api_key(base_url: &str, api_key: &str, http: HttpClient) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl WeatherProvider for TomorrowIoWeather {
    #[instrument(skip(self))]
    async fn realtime(&self, city: &str) -> Result<WeatherOutcome> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AjudanteError::InvalidInput("City must not be empty".to_string()));
        }

        let request = self
            .http
            .inner()
            .get(&self.base_url)
            .query(&[("location", city), ("apikey", self.api_key.as_str())])
            .header(ACCEPT, "application/json")
            .header(ACCEPT_ENCODING, "deflate, gzip, br");

        let response = self.http.send(request).await?;
        let status = response.status();

        if status != StatusCode::OK {
            info!("Weather provider returned {} for {}", status, city);
            return Ok(WeatherOutcome::Failed {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AjudanteError::Weather(format!("Invalid JSON body: {}", e)))?;

        debug!("Received weather report for {}", city);
        Ok(WeatherOutcome::Report(body))
    }
}
