// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Provides a liveness endpoint reporting the bridge service and version
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Health check route for service monitoring

use axum::{routing::get, Json, Router};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    #[must_use]
    pub fn routes() -> Router {
        async fn health_handler() -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "status": "healthy",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
        }

        Router::new().route("/health", get(health_handler))
    }
}
