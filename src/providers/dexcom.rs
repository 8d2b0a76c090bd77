// ABOUTME: Dexcom API integration and glucose data fetching
// ABOUTME: Bearer-authenticated reads with best-effort downgrade for secondary endpoints
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{ProviderError, ResourceFailure, ResourceOutcome};
use crate::config::DexcomApiConfig;
use crate::models::{GlucoseReading, GlucoseResponse};
use crate::oauth::TokenLifecycle;
use crate::utils::http_client::api_client;
use crate::utils::time_range::TimeRange;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client for the Dexcom resource endpoints.
///
/// Consults the lifecycle manager for the current bearer token on every
/// read; holds no token state of its own.
pub struct DexcomProvider {
    client: Client,
    base_url: String,
    lifecycle: Arc<TokenLifecycle>,
}

impl DexcomProvider {
    /// Create a provider reading from the configured data API base.
    #[must_use]
    pub fn new(api: &DexcomApiConfig, lifecycle: Arc<TokenLifecycle>) -> Self {
        Self {
            client: api_client(),
            base_url: api.base_url.clone(),
            lifecycle,
        }
    }

    /// Perform a bearer-authenticated GET against a resource path.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotAuthenticated`] before any network call
    /// when no access token is held; [`ProviderError::Api`] on a
    /// non-success status; [`ProviderError::Transport`] on network or
    /// timeout failure; [`ProviderError::InvalidResponse`] when the body is
    /// not valid JSON.
    pub async fn fetch_resource(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        let token = self
            .lifecycle
            .access_token()
            .await
            .ok_or(ProviderError::NotAuthenticated)?;

        let url = format!("{}{path}", self.base_url);
        debug!("Fetching resource: {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!("Resource request to {url} failed: {status}");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    /// Fetch glucose readings for a window, defaulting to the trailing 24
    /// hours. Load-bearing: failures propagate to the caller.
    ///
    /// # Errors
    ///
    /// Propagates every [`ProviderError`] from [`Self::fetch_resource`],
    /// plus [`ProviderError::InvalidResponse`] when the payload does not
    /// match the glucose schema.
    pub async fn glucose_readings(
        &self,
        range: Option<TimeRange>,
    ) -> Result<GlucoseResponse, ProviderError> {
        let range = range.unwrap_or_else(TimeRange::last_day);
        let value = self
            .fetch_resource("/users/self/egvs", &range.query())
            .await?;
        let response: GlucoseResponse = serde_json::from_value(value)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        info!("Fetched {} glucose readings", response.egvs.len());
        Ok(response)
    }

    /// The single most recent reading in the default window, or `None`
    /// when the window holds no readings.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying readings fetch.
    pub async fn latest_reading(&self) -> Result<Option<GlucoseReading>, ProviderError> {
        let response = self.glucose_readings(None).await?;
        Ok(latest_by_display_time(response.egvs))
    }

    /// Fetch registered devices. Best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotAuthenticated`] when no token is held;
    /// remote failures are downgraded into the returned outcome.
    pub async fn devices(&self) -> Result<ResourceOutcome, ProviderError> {
        self.best_effort(
            self.fetch_resource("/users/self/devices", &[]).await,
            "Devices endpoint not available or access denied",
        )
    }

    /// Fetch the available data range. Best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotAuthenticated`] when no token is held;
    /// remote failures are downgraded into the returned outcome.
    pub async fn data_range(&self) -> Result<ResourceOutcome, ProviderError> {
        self.best_effort(
            self.fetch_resource("/users/self/dataRange", &[]).await,
            "Data range endpoint not available or access denied",
        )
    }

    /// Fetch alerts for a window. Best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotAuthenticated`] when no token is held;
    /// remote failures are downgraded into the returned outcome.
    pub async fn alerts(&self, range: Option<TimeRange>) -> Result<ResourceOutcome, ProviderError> {
        let range = range.unwrap_or_else(TimeRange::last_day);
        self.best_effort(
            self.fetch_resource("/users/self/alerts", &range.query())
                .await,
            "Alerts endpoint not available or access denied",
        )
    }

    /// Fetch calibrations for a window. Best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotAuthenticated`] when no token is held;
    /// remote failures are downgraded into the returned outcome.
    pub async fn calibrations(
        &self,
        range: Option<TimeRange>,
    ) -> Result<ResourceOutcome, ProviderError> {
        let range = range.unwrap_or_else(TimeRange::last_day);
        self.best_effort(
            self.fetch_resource("/users/self/calibrations", &range.query())
                .await,
            "Calibrations endpoint not available or access denied",
        )
    }

    /// Fetch user events for a window. Best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotAuthenticated`] when no token is held;
    /// remote failures are downgraded into the returned outcome.
    pub async fn events(&self, range: Option<TimeRange>) -> Result<ResourceOutcome, ProviderError> {
        let range = range.unwrap_or_else(TimeRange::last_day);
        self.best_effort(
            self.fetch_resource("/users/self/events", &range.query())
                .await,
            "Events endpoint not available or access denied",
        )
    }

    /// User profile lookup. The `/users/self` endpoint does not exist in
    /// the v3 API, so this always reports the structured failure shape.
    #[must_use]
    pub fn user_info(&self) -> ResourceOutcome {
        ResourceOutcome::Failed(ResourceFailure {
            error: true,
            message: "User info endpoint not available in v3 API".into(),
            details: serde_json::Value::String(
                "The /users/self endpoint does not exist in Dexcom v3 API".into(),
            ),
        })
    }

    /// Downgrade a remote failure to the structured shape; a missing token
    /// still propagates as an error.
    fn best_effort(
        &self,
        result: Result<serde_json::Value, ProviderError>,
        message: &str,
    ) -> Result<ResourceOutcome, ProviderError> {
        match result {
            Ok(value) => Ok(ResourceOutcome::Data(value)),
            Err(ProviderError::NotAuthenticated) => Err(ProviderError::NotAuthenticated),
            Err(e) => {
                warn!("{message}: {e}");
                Ok(ResourceOutcome::Failed(ResourceFailure {
                    error: true,
                    message: message.into(),
                    details: failure_details(&e),
                }))
            }
        }
    }
}

/// Carry the provider's error payload when it is JSON, the raw text or
/// transport message otherwise.
fn failure_details(error: &ProviderError) -> serde_json::Value {
    match error {
        ProviderError::Api { body, .. } => serde_json::from_str(body)
            .unwrap_or_else(|_| serde_json::Value::String(body.clone())),
        other => serde_json::Value::String(other.to_string()),
    }
}

/// Linear max-scan over `display_time`; ties resolve to the
/// first-encountered maximal element.
fn latest_by_display_time(readings: Vec<GlucoseReading>) -> Option<GlucoseReading> {
    let mut latest: Option<GlucoseReading> = None;
    for reading in readings {
        let newer = latest
            .as_ref()
            .is_none_or(|current| reading.display_time > current.display_time);
        if newer {
            latest = Some(reading);
        }
    }
    latest
}
