// ABOUTME: Glucose data route handlers for readings, devices, alerts, and related endpoints
// ABOUTME: Renders best-effort outcomes without aborting and propagates load-bearing failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Data read routes
//!
//! The readings endpoints are load-bearing: their failures surface as HTTP
//! errors. Every other endpoint is best-effort and renders the structured
//! failure shape with `success: false` so partial results stay usable.

use crate::errors::AppError;
use crate::providers::ResourceOutcome;
use crate::server::ServerResources;
use crate::utils::time_range::TimeRange;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

/// Optional window bounds accepted by time-ranged reads
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowQuery {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

impl WindowQuery {
    fn into_range(self) -> TimeRange {
        TimeRange::from_params(self.start_date, self.end_date)
    }
}

/// Glucose data routes
pub struct DataRoutes;

impl DataRoutes {
    /// Create all data read routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/latest-reading", get(Self::handle_latest_reading))
            .route("/readings", get(Self::handle_readings))
            .route("/user-info", get(Self::handle_user_info))
            .route("/devices", get(Self::handle_devices))
            .route("/data-range", get(Self::handle_data_range))
            .route("/alerts", get(Self::handle_alerts))
            .route("/calibrations", get(Self::handle_calibrations))
            .route("/events", get(Self::handle_events))
            .route("/status", get(Self::handle_status))
            .with_state(resources)
    }

    /// Most recent glucose reading in the default window
    async fn handle_latest_reading(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        info!("Fetching latest glucose reading");
        let Some(reading) = resources.provider.latest_reading().await? else {
            return Ok(Json(json!({
                "success": false,
                "message": "No glucose readings found"
            }))
            .into_response());
        };

        let formatted = json!({
            "value": format!(
                "{} {}",
                reading
                    .value
                    .map_or_else(|| "?".to_owned(), |v| v.to_string()),
                reading.unit.as_deref().unwrap_or("mg/dL")
            ),
            "time": reading.display_time,
            "trend": reading.trend,
            "status": reading.status,
        });

        Ok(Json(json!({
            "success": true,
            "reading": reading,
            "formatted": formatted,
        }))
        .into_response())
    }

    /// Glucose readings for a window; failures surface as HTTP errors
    async fn handle_readings(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        let readings = resources
            .provider
            .glucose_readings(Some(params.into_range()))
            .await?;

        Ok(Json(json!({
            "success": true,
            "count": readings.egvs.len(),
            "readings": readings,
        }))
        .into_response())
    }

    async fn handle_user_info(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        if !resources.lifecycle.is_authenticated().await {
            return Err(AppError::NotAuthenticated);
        }
        Ok(render_outcome("userInfo", resources.provider.user_info()))
    }

    async fn handle_devices(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        Ok(render_outcome(
            "devices",
            resources.provider.devices().await?,
        ))
    }

    async fn handle_data_range(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        Ok(render_outcome(
            "dataRange",
            resources.provider.data_range().await?,
        ))
    }

    async fn handle_alerts(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        Ok(render_outcome(
            "alerts",
            resources
                .provider
                .alerts(Some(params.into_range()))
                .await?,
        ))
    }

    async fn handle_calibrations(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        Ok(render_outcome(
            "calibrations",
            resources
                .provider
                .calibrations(Some(params.into_range()))
                .await?,
        ))
    }

    async fn handle_events(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        Ok(render_outcome(
            "events",
            resources
                .provider
                .events(Some(params.into_range()))
                .await?,
        ))
    }

    /// Concurrent probe of every endpoint; one endpoint failing never
    /// prevents the others from reporting
    async fn handle_status(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        if !resources.lifecycle.is_authenticated().await {
            return Err(AppError::NotAuthenticated);
        }

        info!("Probing all data endpoints");
        let user_info = resources.provider.user_info();
        let (devices, readings, data_range, alerts, calibrations, events) = tokio::join!(
            resources.provider.devices(),
            resources.provider.glucose_readings(None),
            resources.provider.data_range(),
            resources.provider.alerts(None),
            resources.provider.calibrations(None),
            resources.provider.events(None),
        );
        let readings = readings?;

        let mut working = Vec::new();
        let mut failed = Vec::new();
        let mut data = Map::new();

        for (name, outcome) in [
            ("userInfo", user_info),
            ("devices", devices?),
            ("dataRange", data_range?),
            ("alerts", alerts?),
            ("calibrations", calibrations?),
            ("events", events?),
        ] {
            record_outcome(name, outcome, &mut working, &mut failed, &mut data);
        }

        working.push("glucoseReadings");
        data.insert(
            "glucoseReadings".into(),
            json!({
                "count": readings.egvs.len(),
                "unit": readings.unit,
            }),
        );

        Ok(Json(json!({
            "success": true,
            "message": format!(
                "API test completed. Working: {}. Failed: {}",
                working.join(", "),
                failed.join(", ")
            ),
            "data": data,
            "workingEndpoints": working,
            "failedEndpoints": failed,
        }))
        .into_response())
    }
}

/// Render a best-effort outcome: the payload under `key` on success, the
/// structured failure shape with `success: false` otherwise.
fn render_outcome(key: &str, outcome: ResourceOutcome) -> Response {
    match outcome {
        ResourceOutcome::Data(value) => {
            let mut body = Map::new();
            body.insert("success".into(), Value::Bool(true));
            body.insert(key.into(), value);
            Json(Value::Object(body)).into_response()
        }
        ResourceOutcome::Failed(failure) => Json(json!({
            "success": false,
            "message": failure.message,
            "details": failure.details,
        }))
        .into_response(),
    }
}

fn record_outcome(
    name: &'static str,
    outcome: ResourceOutcome,
    working: &mut Vec<&'static str>,
    failed: &mut Vec<&'static str>,
    data: &mut Map<String, Value>,
) {
    match outcome {
        ResourceOutcome::Data(value) => {
            working.push(name);
            data.insert(name.into(), value);
        }
        ResourceOutcome::Failed(failure) => {
            failed.push(name);
            data.insert(
                name.into(),
                json!({
                    "error": true,
                    "message": failure.message,
                    "details": failure.details,
                }),
            );
        }
    }
}
