// ABOUTME: Session and OAuth flow route handlers
// ABOUTME: Serves the authorization URL, handles the provider callback, and clears sessions
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Routes driving the OAuth flow
//!
//! `/` restores a persisted session or hands out the authorization URL;
//! `/callback` receives the provider redirect and exchanges the code;
//! `/logout` clears the session. All token decisions live in the lifecycle
//! manager; these handlers only shape HTTP responses.

use crate::errors::AppError;
use crate::server::ServerResources;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Query parameters delivered by the provider redirect
#[derive(Deserialize)]
struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Session and OAuth flow routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all session routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_index))
            .route("/callback", get(Self::handle_callback))
            .route("/logout", get(Self::handle_logout))
            .with_state(resources)
    }

    /// Restore a saved session or start the OAuth flow
    async fn handle_index(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let restored = resources.lifecycle.load_persisted_session().await?;

        if restored {
            return Ok((
                StatusCode::OK,
                Json(json!({
                    "authenticated": true,
                    "message": "You are already authenticated with saved tokens",
                    "endpoints": {
                        "latest_reading": "/latest-reading",
                        "readings": "/readings?startDate=...&endDate=...",
                        "user_info": "/user-info",
                        "devices": "/devices",
                        "data_range": "/data-range",
                        "alerts": "/alerts?startDate=...&endDate=...",
                        "calibrations": "/calibrations?startDate=...&endDate=...",
                        "events": "/events?startDate=...&endDate=...",
                        "status": "/status",
                        "logout": "/logout"
                    }
                })),
            )
                .into_response());
        }

        let authorization_url = resources.lifecycle.authorization_url()?;
        info!("No usable session, handing out authorization URL");

        Ok((
            StatusCode::OK,
            Json(json!({
                "authenticated": false,
                "authorization_url": authorization_url,
                "message": "Visit the authorization URL and complete the OAuth flow. \
                            You will be redirected back to /callback."
            })),
        )
            .into_response())
    }

    /// Handle the provider redirect carrying the authorization code
    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<CallbackParams>,
    ) -> Result<Response, AppError> {
        if let Some(error) = params.error {
            return Err(AppError::InvalidRequest(format!("OAuth error: {error}")));
        }

        let code = params
            .code
            .ok_or_else(|| AppError::InvalidRequest("No authorization code received".into()))?;

        info!("Exchanging authorization code for access token");
        let record = resources.lifecycle.exchange_code(&code).await?;

        Ok((
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "You have successfully authenticated with the Dexcom API",
                "expires_at": record.expires_at,
            })),
        )
            .into_response())
    }

    /// Clear the session and saved tokens
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        resources.lifecycle.logout().await?;

        Ok((
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Tokens have been cleared successfully"
            })),
        )
            .into_response())
    }
}
