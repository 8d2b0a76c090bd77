// ABOUTME: OAuth module organizing token lifecycle and provider endpoint calls
// ABOUTME: Centralizes the authorization-code flow, token refresh, and persistence
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # OAuth Token Lifecycle
//!
//! Everything between "user clicked the authorization link" and "we hold a
//! usable bearer token": the authorization-code exchange, durable token
//! persistence, expiry detection, and transparent refresh. Refresh failure
//! clears persisted state so a consumed refresh token is never retried.

pub mod client;
pub mod manager;
pub mod store;

pub use client::OAuthClient;
pub use manager::TokenLifecycle;
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenRecord, TokenStore};

use serde::Deserialize;

/// Session state as tracked by the lifecycle manager.
///
/// `RefreshFailed` is terminal until a new authorization-code exchange
/// succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No token held; authorization has not happened or tokens were cleared
    #[default]
    Unauthenticated,
    /// A token is held and not known to be expired
    Authenticated,
    /// A persisted token was loaded past its expiry; refresh not yet attempted
    ExpiredPendingRefresh,
    /// A refresh was attempted and rejected; re-authentication is required
    RefreshFailed,
}

/// Token endpoint response (both the initial grant and refresh).
///
/// `Debug` is manually implemented to redact credentials.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// Opaque bearer credential
    pub access_token: String,
    /// Refresh credential; some providers omit it on refresh responses
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds; optional per RFC 6749
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// OAuth error types
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Client credentials are missing or empty
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The provider rejected the authorization-code exchange
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// The provider rejected the refresh-token grant
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// A refresh was requested with no refresh token held
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Token persistence failed
    #[error("Token store error: {0}")]
    Storage(#[from] StoreError),
}
