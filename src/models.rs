// ABOUTME: Common data models for Dexcom glucose data payloads
// ABOUTME: Typed estimated-glucose-value records consumed by the latest-reading selection
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Data models for the glucose endpoints.
//!
//! Only the estimated-glucose-value payload is typed; it is the one payload
//! the bridge inspects (latest-reading selection). Best-effort endpoints
//! pass their JSON through untouched.

use serde::{Deserialize, Serialize};

/// A single estimated glucose value (EGV) record.
///
/// Timestamps arrive as ISO-8601 strings without a timezone suffix and are
/// kept opaque; same-format strings order chronologically when compared
/// lexicographically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseReading {
    /// Provider record identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    /// Instant the reading was captured, in device-system time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_time: Option<String>,
    /// Instant the reading was displayed to the user
    pub display_time: String,
    /// Glucose concentration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Unit of `value` (typically `mg/dL`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Trend arrow description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    /// Rate of change of the trend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_rate: Option<f64>,
    /// Record status flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Response body of the glucose readings endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseResponse {
    /// Estimated glucose value records in the requested window
    #[serde(default)]
    pub egvs: Vec<GlucoseReading>,
    /// Unit shared by all records, when the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Trend-rate unit shared by all records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_unit: Option<String>,
}
