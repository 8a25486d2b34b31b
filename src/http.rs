//! Shared HTTP client with timeout and bounded retry.
//!
//! Every provider client goes through [`HttpClient::send`], so no outbound
//! call can hang or retry forever.

use crate::config::HttpSettings;
use crate::error::{AjudanteError, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

/// Retry policy for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&HttpSettings::default())
    }
}

impl From<&HttpSettings> for RetryPolicy {
    fn from(settings: &HttpSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based), doubling each time.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Statuses worth another attempt.
pub fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// HTTP client used by all provider integrations.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Create a client from HTTP settings.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        Self::with_policy(
            Duration::from_secs(settings.timeout_secs),
            RetryPolicy::from(settings),
        )
    }

    /// Create a client with an explicit timeout and retry policy.
    pub fn with_policy(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ajudante/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, retry })
    }

    /// Access the underlying client to build requests.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send a request that is safe to repeat, retrying transport failures
    /// and transient statuses.
    ///
    /// When retries run out on a transient status, that last response is
    /// returned so the caller decides how to report it.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.send_with(request, Idempotency::Idempotent).await
    }

    /// Send a request, retrying only what `idempotency` allows.
    pub async fn send_with(
        &self,
        request: RequestBuilder,
        idempotency: Idempotency,
    ) -> Result<Response> {
        let mut retry = 0;

        loop {
            let attempt = request.try_clone().ok_or_else(|| {
                AjudanteError::InvalidInput("Request body cannot be retried".to_string())
            })?;

            match attempt.send().await {
                Ok(response)
                    if idempotency.retries_status(response.status())
                        && retry < self.retry.max_retries =>
                {
                    warn!(
                        status = response.status().as_u16(),
                        retry = retry + 1,
                        max_retries = self.retry.max_retries,
                        "Transient status, retrying"
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    let err = AjudanteError::from(e);
                    if !idempotency.retries_error(&err) || retry >= self.retry.max_retries {
                        return Err(err);
                    }
                    warn!(
                        retry = retry + 1,
                        max_retries = self.retry.max_retries,
                        error = %err,
                        "Request failed, retrying"
                    );
                }
            }

            tokio::time::sleep(self.retry.backoff_for(retry)).await;
            retry += 1;
        }
    }
}

/// Whether a request may reach the provider more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Reads and other requests with no side effect on repeat.
    Idempotent,
    /// Requests that create something. Only failures where the provider
    /// cannot have acted on the request are retried: a refused connection
    /// or a 429.
    NonIdempotent,
}

impl Idempotency {
    fn retries_status(self, status: StatusCode) -> bool {
        match self {
            Idempotency::Idempotent => is_transient_status(status),
            Idempotency::NonIdempotent => status == StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn retries_error(self, err: &AjudanteError) -> bool {
        match (self, err) {
            (Idempotency::Idempotent, err) => err.is_retryable(),
            (Idempotency::NonIdempotent, AjudanteError::Http(e)) => e.is_connect(),
            (Idempotency::NonIdempotent, _) => false,
        }
    }
}
