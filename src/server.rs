// ABOUTME: Server resource bundle and router assembly for the bridge
// ABOUTME: Wires the lifecycle manager, provider, and routes into one Axum application
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Server resources and router assembly

use crate::config::ServerConfig;
use crate::oauth::{FileTokenStore, OAuthClient, OAuthError, TokenLifecycle, TokenStore};
use crate::providers::DexcomProvider;
use crate::routes::{AuthRoutes, DataRoutes, HealthRoutes};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared resources threaded through every route handler.
pub struct ServerResources {
    /// Server configuration
    pub config: ServerConfig,
    /// Token lifecycle manager; one instance per process, one session
    pub lifecycle: Arc<TokenLifecycle>,
    /// Dexcom resource client
    pub provider: DexcomProvider,
}

impl ServerResources {
    /// Build resources from configuration with file-backed token storage.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ConfigurationError`] when client credentials
    /// are missing.
    pub fn new(config: ServerConfig) -> Result<Self, OAuthError> {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_file.clone()));
        Self::with_store(config, store)
    }

    /// Build resources with an explicit token store.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ConfigurationError`] when client credentials
    /// are missing.
    pub fn with_store(config: ServerConfig, store: Arc<dyn TokenStore>) -> Result<Self, OAuthError> {
        let client = OAuthClient::new(&config.oauth, &config.api)?;
        let lifecycle = Arc::new(TokenLifecycle::new(client, store));
        let provider = DexcomProvider::new(&config.api, Arc::clone(&lifecycle));

        Ok(Self {
            config,
            lifecycle,
            provider,
        })
    }
}

/// Assemble the full application router.
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(DataRoutes::routes(resources))
        .merge(HealthRoutes::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve the application until shutdown.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails while
/// running.
pub async fn serve(resources: Arc<ServerResources>, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(resources)).await?;
    Ok(())
}
