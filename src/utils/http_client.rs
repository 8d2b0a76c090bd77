// ABOUTME: Shared HTTP client utilities with connection pooling and timeout configuration
// ABOUTME: Provides purpose-tuned reqwest clients for OAuth and data API calls

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create a new HTTP client with custom timeout settings
///
/// # Arguments
/// * `timeout_secs` - Request timeout in seconds
/// * `connect_timeout_secs` - Connection timeout in seconds
///
/// # Errors
/// Returns a default client if custom client creation fails
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Create a new HTTP client optimized for OAuth flows
///
/// Token exchanges should be fast operations, so this client uses
/// shorter timeouts than the data API client.
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(15, 5) // 15s request timeout, 5s connect timeout
}

/// Create a new HTTP client optimized for data API calls
#[must_use]
pub fn api_client() -> Client {
    create_client_with_timeout(60, 10) // 60s request timeout, 10s connect timeout
}
