// ABOUTME: Unified error handling for HTTP responses
// ABOUTME: Maps lifecycle, provider, and request errors to status codes with JSON bodies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Unified Error Handling
//!
//! Route handlers return `Result<Response, AppError>`; this module maps the
//! domain errors onto HTTP statuses so that "not authenticated", "upstream
//! call failed", and "invalid request" stay distinguishable end-to-end.

use crate::oauth::OAuthError;
use crate::providers::ProviderError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Application error for HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// The request itself is malformed (missing or contradictory parameters)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller must complete the OAuth flow first
    #[error("Not authenticated. Please complete OAuth flow first.")]
    NotAuthenticated,

    /// A token lifecycle operation failed
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// A load-bearing resource read failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AppError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotAuthenticated | Self::Provider(ProviderError::NotAuthenticated) => {
                StatusCode::UNAUTHORIZED
            }
            Self::OAuth(OAuthError::ConfigurationError(_) | OAuthError::Storage(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::OAuth(_) | Self::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
