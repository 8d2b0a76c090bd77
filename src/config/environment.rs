// ABOUTME: Environment-based configuration loading for the bridge server
// ABOUTME: Reads Dexcom credentials, endpoint URLs, and server settings from env vars
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration
//!
//! All configuration is provided out-of-band through environment variables
//! (optionally via a `.env` file). Client identity is required; everything
//! else has defaults suitable for the Dexcom sandbox.

use crate::constants::{env_config, storage};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// OAuth client identity for the provider application
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URI registered with the provider
    pub redirect_uri: String,
}

/// Dexcom API endpoint configuration
#[derive(Debug, Clone)]
pub struct DexcomApiConfig {
    /// Data API base URL (v3)
    pub base_url: String,
    /// Authorization endpoint URL (v2)
    pub auth_url: String,
    /// Token endpoint URL (v2)
    pub token_url: String,
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub http_port: u16,
    /// OAuth client identity
    pub oauth: OAuthProviderConfig,
    /// Dexcom API endpoints
    pub api: DexcomApiConfig,
    /// Path of the persisted token record
    pub token_file: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required credential variable is missing or a
    /// numeric variable fails to parse. Missing client identity is a fatal
    /// configuration error, surfaced immediately at startup.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let http_port = env_config::http_port();
        let client_id = required_env("DEXCOM_CLIENT_ID")?;
        let client_secret = required_env("DEXCOM_CLIENT_SECRET")?;
        let redirect_uri = env::var("DEXCOM_REDIRECT_URI")
            .unwrap_or_else(|_| format!("http://localhost:{http_port}/callback"));

        Ok(Self {
            http_port,
            oauth: OAuthProviderConfig {
                client_id,
                client_secret,
                redirect_uri,
            },
            api: DexcomApiConfig {
                base_url: env_config::dexcom_api_base(),
                auth_url: env_config::dexcom_auth_url(),
                token_url: env_config::dexcom_token_url(),
            },
            token_file: PathBuf::from(env_config::token_file()),
        })
    }

    /// One-line configuration summary safe for logging (no secrets).
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} api_base={} redirect_uri={} token_file={}",
            self.http_port,
            self.api.base_url,
            self.oauth.redirect_uri,
            self.token_file.display()
        )
    }
}

impl Default for DexcomApiConfig {
    fn default() -> Self {
        Self {
            base_url: env_config::dexcom_api_base(),
            auth_url: env_config::dexcom_auth_url(),
            token_url: env_config::dexcom_token_url(),
        }
    }
}

impl Default for ServerConfig {
    /// Configuration with placeholder credentials, used by tests.
    fn default() -> Self {
        Self {
            http_port: crate::constants::ports::DEFAULT_HTTP_PORT,
            oauth: OAuthProviderConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
            },
            api: DexcomApiConfig::default(),
            token_file: PathBuf::from(storage::DEFAULT_TOKEN_FILE),
        }
    }
}

fn required_env(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} not set (required)"))
}
