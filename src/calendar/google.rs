//! Google Calendar client.

use super::{CalendarEvent, CalendarProvider, CreatedEvent, EventZone, TokenStore};
use crate::config::CalendarSettings;
use crate::error::{AjudanteError, Result};
use crate::http::{HttpClient, Idempotency};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::PathBuf;
use tracing::{info, instrument};
use url::Url;

/// Calendar provider backed by the Google Calendar v3 API.
pub struct GoogleCalendar {
    http: HttpClient,
    base_url: String,
    calendar_id: String,
    zone: EventZone,
    tokens: TokenStore,
}

impl GoogleCalendar {
    /// Create a client from settings and an expanded token path.
    pub fn new(settings: &CalendarSettings, token_path: PathBuf, http: HttpClient) -> Result<Self> {
        Ok(Self {
            base_url: settings.base_url.clone(),
            calendar_id: settings.calendar_id.clone(),
            zone: EventZone::from_settings(settings)?,
            tokens: TokenStore::new(token_path, http.clone()),
            http,
        })
    }

    fn events_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AjudanteError::Config(format!("Invalid calendar base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| AjudanteError::Config("Calendar base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);

        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    #[instrument(skip(self, event), fields(summary = %event.summary))]
    async fn insert_event(&self, event: &CalendarEvent) -> Result<CreatedEvent> {
        // Validation comes first so a bad request never touches the credential.
        let body = event.request_body(&self.zone)?;
        let token = self.tokens.access_token().await?;

        let request = self
            .http
            .inner()
            .post(self.events_url()?)
            .bearer_auth(token)
            .json(&body);

        // Inserts are not idempotent: a timed-out or 5xx insert may still
        // have created the event.
        let response = self
            .http
            .send_with(request, Idempotency::NonIdempotent)
            .await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(AjudanteError::Unauthenticated(
                "Calendar rejected the stored access token".to_string(),
            ));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AjudanteError::Calendar(format!(
                "status {}: {}",
                status.as_u16(),
                text
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AjudanteError::Calendar(format!("Invalid JSON body: {}", e)))?;

        let created = CreatedEvent::from_response(raw)?;
        info!(
            "Created calendar event {}",
            created.html_link.as_deref().unwrap_or("(no link)")
        );
        Ok(created)
    }
}
