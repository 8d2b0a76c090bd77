// ABOUTME: Resource client tests for best-effort downgrade and latest-reading selection
// ABOUTME: Exercises bearer reads against a mock data API with configurable failures
#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Resource Client Tests
//!
//! The glucose-readings endpoint is load-bearing and must propagate
//! failures; every other endpoint downgrades them to the structured
//! failure shape. A missing access token is rejected before any network
//! call.

mod common;

use cgm_bridge::oauth::{MemoryTokenStore, TokenStore};
use cgm_bridge::providers::{DexcomProvider, ProviderError, ResourceOutcome};
use cgm_bridge::utils::time_range::TimeRange;
use chrono::{Duration, NaiveDateTime, Utc};
use common::{api_config, lifecycle_for, record, spawn_mock_dexcom, MockDexcom};
use serde_json::json;
use std::sync::Arc;

/// Provider with an authenticated session against the mock server.
async fn authenticated_provider(mock: &MockDexcom) -> DexcomProvider {
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    store
        .save(&record(
            "access-A1",
            "refresh-R1",
            Some(Utc::now() + Duration::hours(1)),
        ))
        .await
        .unwrap();

    let lifecycle = Arc::new(lifecycle_for(&mock.base_url, store));
    lifecycle.load_persisted_session().await.unwrap();
    DexcomProvider::new(&api_config(&mock.base_url), lifecycle)
}

/// Provider with no session at all.
fn unauthenticated_provider(mock: &MockDexcom) -> DexcomProvider {
    let lifecycle = Arc::new(lifecycle_for(
        &mock.base_url,
        Arc::new(MemoryTokenStore::new()),
    ));
    DexcomProvider::new(&api_config(&mock.base_url), lifecycle)
}

#[tokio::test]
async fn latest_reading_selects_maximum_display_time() {
    let mock = spawn_mock_dexcom().await;
    mock.set_egvs_response(
        200,
        json!({
            "egvs": [
                { "displayTime": "2024-03-15T08:00:00", "value": 100 },
                { "displayTime": "2024-03-15T10:00:00", "value": 120 },
                { "displayTime": "2024-03-15T09:00:00", "value": 110 }
            ]
        }),
    );

    let provider = authenticated_provider(&mock).await;
    let latest = provider.latest_reading().await.unwrap().unwrap();
    assert_eq!(latest.display_time, "2024-03-15T10:00:00");
    assert_eq!(latest.value, Some(120.0));
}

#[tokio::test]
async fn latest_reading_empty_window_is_none_not_error() {
    let mock = spawn_mock_dexcom().await;
    let provider = authenticated_provider(&mock).await;
    assert!(provider.latest_reading().await.unwrap().is_none());
}

#[tokio::test]
async fn forbidden_devices_downgraded_forbidden_readings_propagated() {
    let mock = spawn_mock_dexcom().await;
    mock.set_devices_response(403, json!({"fault": "insufficient scope"}));
    mock.set_egvs_response(403, json!({"fault": "insufficient scope"}));

    let provider = authenticated_provider(&mock).await;

    // Best-effort endpoint: identical 403 becomes the structured shape.
    let outcome = provider.devices().await.unwrap();
    let ResourceOutcome::Failed(failure) = outcome else {
        panic!("expected downgraded failure");
    };
    assert!(failure.error);
    assert!(failure.message.contains("Devices endpoint"));
    assert_eq!(failure.details["fault"], "insufficient scope");

    // Load-bearing endpoint: the same 403 surfaces as an error.
    let err = provider.glucose_readings(None).await.unwrap_err();
    assert!(matches!(&err, ProviderError::Api { status: 403, .. }));
}

#[tokio::test]
async fn missing_token_rejected_before_any_network_call() {
    let mock = spawn_mock_dexcom().await;
    let provider = unauthenticated_provider(&mock);

    assert!(matches!(
        provider.devices().await,
        Err(ProviderError::NotAuthenticated)
    ));
    assert!(matches!(
        provider.latest_reading().await,
        Err(ProviderError::NotAuthenticated)
    ));

    assert_eq!(mock.devices_hits(), 0);
    assert_eq!(mock.egvs_hits(), 0);
}

#[tokio::test]
async fn default_window_spans_trailing_day_in_whole_seconds() {
    let mock = spawn_mock_dexcom().await;
    let provider = authenticated_provider(&mock).await;
    provider.latest_reading().await.unwrap();

    let query = mock.last_egvs_query().unwrap();
    let start = query.get("startDate").unwrap();
    let end = query.get("endDate").unwrap();

    // Whole-second precision, no timezone suffix.
    assert_eq!(start.len(), 19);
    assert_eq!(end.len(), 19);
    assert!(!end.ends_with('Z'));

    let start = NaiveDateTime::parse_from_str(start, "%Y-%m-%dT%H:%M:%S").unwrap();
    let end = NaiveDateTime::parse_from_str(end, "%Y-%m-%dT%H:%M:%S").unwrap();
    let span = end - start;
    assert!(span >= Duration::hours(24) - Duration::seconds(1));
    assert!(span <= Duration::hours(24) + Duration::seconds(1));
}

#[tokio::test]
async fn explicit_window_passed_through_verbatim() {
    let mock = spawn_mock_dexcom().await;
    let provider = authenticated_provider(&mock).await;

    let range = TimeRange::from_params(
        Some("2024-01-01T00:00:00".into()),
        Some("2024-01-02T00:00:00".into()),
    );
    provider.glucose_readings(Some(range)).await.unwrap();

    let query = mock.last_egvs_query().unwrap();
    assert_eq!(query.get("startDate").unwrap(), "2024-01-01T00:00:00");
    assert_eq!(query.get("endDate").unwrap(), "2024-01-02T00:00:00");
}

#[tokio::test]
async fn malformed_readings_body_is_invalid_response() {
    let mock = spawn_mock_dexcom().await;
    mock.set_egvs_response(200, json!({ "egvs": "not-a-list" }));

    let provider = authenticated_provider(&mock).await;
    let err = provider.glucose_readings(None).await.unwrap_err();
    assert!(matches!(&err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn successful_best_effort_read_carries_payload() {
    let mock = spawn_mock_dexcom().await;
    mock.set_devices_response(
        200,
        json!({"devices": [{"transmitterGeneration": "g6"}]}),
    );

    let provider = authenticated_provider(&mock).await;
    let outcome = provider.devices().await.unwrap();
    let ResourceOutcome::Data(value) = outcome else {
        panic!("expected data outcome");
    };
    assert_eq!(value["devices"][0]["transmitterGeneration"], "g6");
}

#[tokio::test]
async fn user_info_reports_structured_unavailability() {
    let mock = spawn_mock_dexcom().await;
    let provider = authenticated_provider(&mock).await;

    let ResourceOutcome::Failed(failure) = provider.user_info() else {
        panic!("expected failure shape");
    };
    assert!(failure.error);
    assert!(failure.message.contains("not available in v3"));
}
