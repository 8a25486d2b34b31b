#![allow(dead_code)]

use std::time::Duration;

use ajudante::http::{HttpClient, RetryPolicy};

/// Client with short timeouts and near-zero backoff for mock servers.
pub fn fast_http(max_retries: u32) -> HttpClient {
    fast_http_with_timeout(Duration::from_secs(5), max_retries)
}

pub fn fast_http_with_timeout(timeout: Duration, max_retries: u32) -> HttpClient {
    let retry = RetryPolicy {
        max_retries,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
    };
    HttpClient::with_policy(timeout, retry).expect("http client")
}
