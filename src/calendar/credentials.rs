//! Stored Google OAuth credentials.
//!
//! Reads the "authorized user" token file written by Google's client
//! libraries after consent, and refreshes the access token when it expires.
//! The consent flow itself is not handled here.

use crate::error::{AjudanteError, Result};
use crate::http::HttpClient;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed early.
const EXPIRY_SKEW_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Contents of `token.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<String>,
    /// Fields we do not use, preserved when the file is rewritten.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorizedUser {
    /// When the access token expires, if known.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expiry.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    /// The access token, if present and not about to expire.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        match self.expires_at() {
            Some(expiry) if expiry <= now + Duration::seconds(EXPIRY_SKEW_SECS) => None,
            _ => Some(token),
        }
    }

    fn can_refresh(&self) -> bool {
        [&self.refresh_token, &self.client_id, &self.client_secret]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Token file plus the client used to refresh it.
pub struct TokenStore {
    path: PathBuf,
    http: HttpClient,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>, http: HttpClient) -> Self {
        Self {
            path: path.into(),
            http,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token file. A missing or unreadable file means the user has
    /// not authorized this application.
    pub fn load(&self) -> Result<AuthorizedUser> {
        if !self.path.exists() {
            return Err(AjudanteError::Unauthenticated(format!(
                "No token file at {}. Authorize the application first",
                self.path.display()
            )));
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            AjudanteError::Unauthenticated(format!(
                "Token file {} is unreadable: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            AjudanteError::Unauthenticated(format!(
                "Token file {} is malformed: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// A usable access token, refreshing and persisting it when needed.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn access_token(&self) -> Result<String> {
        let mut user = self.load()?;

        if let Some(token) = user.valid_token(Utc::now()) {
            debug!("Using stored access token");
            return Ok(token.to_string());
        }

        if !user.can_refresh() {
            return Err(AjudanteError::Unauthenticated(
                "Access token missing or expired and no refresh credentials are stored".to_string(),
            ));
        }

        info!("Refreshing Google access token");
        let refreshed = self.refresh(&user).await?;

        user.token = Some(refreshed.access_token.clone());
        user.expiry = refreshed
            .expires_in
            .map(|secs| (Utc::now() + Duration::seconds(secs)).to_rfc3339());

        if let Err(e) = self.save(&user) {
            warn!("Failed to persist refreshed token: {}", e);
        }

        Ok(refreshed.access_token)
    }

    async fn refresh(&self, user: &AuthorizedUser) -> Result<RefreshResponse> {
        let form = [
            ("client_id", user.client_id.as_deref().unwrap_or_default()),
            ("client_secret", user.client_secret.as_deref().unwrap_or_default()),
            ("refresh_token", user.refresh_token.as_deref().unwrap_or_default()),
            ("grant_type", "refresh_token"),
        ];

        let request = self.http.inner().post(&user.token_uri).form(&form);
        let response = self.http.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AjudanteError::Unauthenticated(format!(
                "Token refresh failed with status {}: {}",
                status.as_u16(),
                body
            )));
        }

        response.json().await.map_err(|e| {
            AjudanteError::Unauthenticated(format!("Invalid token refresh response: {}", e))
        })
    }

    fn save(&self, user: &AuthorizedUser) -> Result<()> {
        let content = serde_json::to_string_pretty(user)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(token: Option<&str>, expiry: Option<&str>) -> AuthorizedUser {
        AuthorizedUser {
            token: token.map(str::to_string),
            refresh_token: None,
            client_id: None,
            client_secret: None,
            token_uri: default_token_uri(),
            scopes: Vec::new(),
            expiry: expiry.map(str::to_string),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_expiry_formats() {
        let rfc = user(None, Some("2026-01-20T12:00:00Z"));
        let python = user(None, Some("2026-01-20T12:00:00.123456"));

        assert_eq!(rfc.expires_at().unwrap().to_rfc3339(), "2026-01-20T12:00:00+00:00");
        assert_eq!(
            python.expires_at().unwrap().format("%H:%M:%S").to_string(),
            "12:00:00"
        );
        assert!(user(None, Some("yesterday")).expires_at().is_none());
    }

    #[test]
    fn test_valid_token_respects_expiry() {
        let now = Utc::now();
        let future = (now + Duration::hours(1)).to_rfc3339();
        let soon = (now + Duration::seconds(10)).to_rfc3339();

        assert_eq!(user(Some("abc"), Some(&future)).valid_token(now), Some("abc"));
        assert_eq!(user(Some("abc"), None).valid_token(now), Some("abc"));
        assert_eq!(user(Some("abc"), Some(&soon)).valid_token(now), None);
        assert_eq!(user(Some(""), None).valid_token(now), None);
        assert_eq!(user(None, None).valid_token(now), None);
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let parsed: AuthorizedUser = serde_json::from_str(
            r#"{"token": "t", "universe_domain": "googleapis.com", "account": ""}"#,
        )
        .unwrap();
        assert_eq!(parsed.token_uri, DEFAULT_TOKEN_URI);

        let written = serde_json::to_value(&parsed).unwrap();
        assert_eq!(written["universe_domain"], "googleapis.com");
    }

    #[test]
    fn test_missing_file_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let http = HttpClient::new(&Default::default()).unwrap();
        let store = TokenStore::new(dir.path().join("token.json"), http);

        assert!(matches!(store.load(), Err(AjudanteError::Unauthenticated(_))));
    }

    #[test]
    fn test_unreadable_file_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        std::fs::create_dir(&token_path).unwrap();
        let http = HttpClient::new(&Default::default()).unwrap();
        let store = TokenStore::new(&token_path, http);

        assert!(matches!(store.load(), Err(AjudanteError::Unauthenticated(_))));
    }
}
