// ABOUTME: Shared test utilities and mock Dexcom server for integration tests
// ABOUTME: Provides a configurable token endpoint and data endpoints on an ephemeral port
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

//! Shared test utilities for `cgm_bridge`
//!
//! Spins up a local mock of the Dexcom API (token endpoint plus data
//! endpoints) so token lifecycle and resource client behavior can be
//! exercised without the real provider.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use cgm_bridge::config::{DexcomApiConfig, OAuthProviderConfig, ServerConfig};
use cgm_bridge::oauth::{OAuthClient, TokenLifecycle, TokenRecord, TokenStore};
use cgm_bridge::server::{self, ServerResources};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// How the mock token endpoint answers
pub enum TokenMode {
    /// Issue a fixed token pair
    Issue {
        access_token: String,
        refresh_token: String,
        expires_in: Option<u64>,
    },
    /// Reject every grant with the given status and body
    Reject { status: u16, body: Value },
}

/// Observable state of the mock Dexcom server
pub struct MockState {
    pub token_mode: Mutex<TokenMode>,
    pub token_hits: AtomicUsize,
    pub last_token_params: Mutex<Option<HashMap<String, String>>>,
    pub egvs_response: Mutex<(u16, Value)>,
    pub egvs_hits: AtomicUsize,
    pub last_egvs_query: Mutex<Option<HashMap<String, String>>>,
    pub devices_response: Mutex<(u16, Value)>,
    pub devices_hits: AtomicUsize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            token_mode: Mutex::new(TokenMode::Issue {
                access_token: "access-1".into(),
                refresh_token: "refresh-1".into(),
                expires_in: Some(3600),
            }),
            token_hits: AtomicUsize::new(0),
            last_token_params: Mutex::new(None),
            egvs_response: Mutex::new((200, json!({ "egvs": [] }))),
            egvs_hits: AtomicUsize::new(0),
            last_egvs_query: Mutex::new(None),
            devices_response: Mutex::new((200, json!({ "devices": [] }))),
            devices_hits: AtomicUsize::new(0),
        }
    }
}

/// A mock Dexcom server bound to an ephemeral local port
pub struct MockDexcom {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockDexcom {
    pub fn issue_tokens(&self, access: &str, refresh: &str, expires_in: Option<u64>) {
        *self.state.token_mode.lock().unwrap() = TokenMode::Issue {
            access_token: access.into(),
            refresh_token: refresh.into(),
            expires_in,
        };
    }

    pub fn reject_tokens(&self, status: u16, body: Value) {
        *self.state.token_mode.lock().unwrap() = TokenMode::Reject { status, body };
    }

    pub fn set_egvs_response(&self, status: u16, body: Value) {
        *self.state.egvs_response.lock().unwrap() = (status, body);
    }

    pub fn set_devices_response(&self, status: u16, body: Value) {
        *self.state.devices_response.lock().unwrap() = (status, body);
    }

    pub fn token_hits(&self) -> usize {
        self.state
            .token_hits
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn egvs_hits(&self) -> usize {
        self.state
            .egvs_hits
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn devices_hits(&self) -> usize {
        self.state
            .devices_hits
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn last_token_params(&self) -> Option<HashMap<String, String>> {
        self.state.last_token_params.lock().unwrap().clone()
    }

    pub fn last_egvs_query(&self) -> Option<HashMap<String, String>> {
        self.state.last_egvs_query.lock().unwrap().clone()
    }
}

async fn token_handler(
    State(state): State<Arc<MockState>>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    state
        .token_hits
        .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    *state.last_token_params.lock().unwrap() = Some(params);

    match &*state.token_mode.lock().unwrap() {
        TokenMode::Issue {
            access_token,
            refresh_token,
            expires_in,
        } => {
            let mut body = json!({
                "access_token": access_token,
                "refresh_token": refresh_token,
                "token_type": "Bearer",
            });
            if let Some(expires_in) = expires_in {
                body["expires_in"] = json!(expires_in);
            }
            Json(body).into_response()
        }
        TokenMode::Reject { status, body } => (
            StatusCode::from_u16(*status).unwrap(),
            Json(body.clone()),
        )
            .into_response(),
    }
}

async fn egvs_handler(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state
        .egvs_hits
        .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    *state.last_egvs_query.lock().unwrap() = Some(query);

    let (status, body) = state.egvs_response.lock().unwrap().clone();
    (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
}

async fn devices_handler(State(state): State<Arc<MockState>>) -> Response {
    state
        .devices_hits
        .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

    let (status, body) = state.devices_response.lock().unwrap().clone();
    (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
}

async fn empty_records_handler() -> Json<Value> {
    Json(json!({ "records": [] }))
}

/// Start the mock Dexcom server on an ephemeral port.
pub async fn spawn_mock_dexcom() -> MockDexcom {
    init_test_logging();
    let state = Arc::new(MockState::default());

    let app = Router::new()
        .route("/v2/oauth2/token", post(token_handler))
        .route("/v3/users/self/egvs", get(egvs_handler))
        .route("/v3/users/self/devices", get(devices_handler))
        .route("/v3/users/self/dataRange", get(empty_records_handler))
        .route("/v3/users/self/alerts", get(empty_records_handler))
        .route("/v3/users/self/calibrations", get(empty_records_handler))
        .route("/v3/users/self/events", get(empty_records_handler))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockDexcom {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// API configuration pointing at a mock server base
pub fn api_config(base_url: &str) -> DexcomApiConfig {
    DexcomApiConfig {
        base_url: format!("{base_url}/v3"),
        auth_url: format!("{base_url}/v2/oauth2/login"),
        token_url: format!("{base_url}/v2/oauth2/token"),
    }
}

/// Test client identity
pub fn oauth_config() -> OAuthProviderConfig {
    OAuthProviderConfig {
        client_id: "test-client-id".into(),
        client_secret: "test-client-secret".into(),
        redirect_uri: "http://localhost:3000/callback".into(),
    }
}

/// Lifecycle manager wired against a mock server base
pub fn lifecycle_for(base_url: &str, store: Arc<dyn TokenStore>) -> TokenLifecycle {
    let client = OAuthClient::new(&oauth_config(), &api_config(base_url)).unwrap();
    TokenLifecycle::new(client, store)
}

/// A fully populated token record
pub fn record(access: &str, refresh: &str, expires_at: Option<DateTime<Utc>>) -> TokenRecord {
    TokenRecord {
        access_token: access.into(),
        refresh_token: refresh.into(),
        expires_at,
        saved_at: Utc::now(),
    }
}

/// Server configuration pointing at a mock server base
pub fn server_config(base_url: &str, token_file: PathBuf) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        oauth: oauth_config(),
        api: api_config(base_url),
        token_file,
    }
}

/// Serve the bridge router on an ephemeral port, returning its base URL.
pub async fn spawn_bridge(resources: Arc<ServerResources>) -> String {
    let app = server::router(resources);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
