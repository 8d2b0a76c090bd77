// ABOUTME: Glucose data provider module with per-endpoint failure isolation
// ABOUTME: Defines provider errors and the best-effort resource outcome shape
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Providers
//!
//! Bearer-authenticated reads against the remote glucose API. The primary
//! glucose-readings endpoint is load-bearing and propagates failures; the
//! remaining endpoints are best-effort, downgrading failures to a
//! structured shape so a caller can render partial results.

pub mod dexcom;

pub use dexcom::DexcomProvider;

use serde::Serialize;

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No access token is held; rejected before any network call
    #[error("Not authenticated - no access token available")]
    NotAuthenticated,

    /// The remote API answered with a non-success status
    #[error("API returned error {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request failed in transport (connection, TLS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Structured failure shape for best-effort reads.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceFailure {
    /// Always `true`; marks the payload as a failure shape
    pub error: bool,
    /// Human-readable summary
    pub message: String,
    /// Provider error payload when available, transport detail otherwise
    pub details: serde_json::Value,
}

/// Result of a best-effort read: the decoded payload, or a structured
/// failure a caller can render without aborting sibling reads.
#[derive(Debug, Clone)]
pub enum ResourceOutcome {
    /// The endpoint answered successfully
    Data(serde_json::Value),
    /// The endpoint failed; downgraded to a renderable shape
    Failed(ResourceFailure),
}
