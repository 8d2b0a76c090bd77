// ABOUTME: Application constants and environment-derived configuration values
// ABOUTME: Centralizes endpoint URLs, ports, and OAuth defaults for the Dexcom API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Application constants with environment variable overrides

use std::env;

/// Network ports
pub mod ports {
    /// Default HTTP server port
    pub const DEFAULT_HTTP_PORT: u16 = 3000;
}

/// OAuth constants
pub mod oauth {
    /// Scope requested during authorization; `offline_access` grants a
    /// refresh token.
    pub const DEFAULT_SCOPE: &str = "offline_access";

    /// Authorization endpoint path (v2 OAuth surface)
    pub const LOGIN_PATH: &str = "/v2/oauth2/login";

    /// Token endpoint path (v2 OAuth surface)
    pub const TOKEN_PATH: &str = "/v2/oauth2/token";
}

/// Dexcom API defaults
pub mod api {
    /// Default API base URL (sandbox, v3 data endpoints)
    pub const DEFAULT_API_BASE: &str = "https://sandbox-api.dexcom.com/v3";

    /// Data endpoint version suffix stripped to reach the OAuth surface
    pub const DATA_VERSION_SUFFIX: &str = "/v3";
}

/// Persistence defaults
pub mod storage {
    /// Default token file name, relative to the working directory
    pub const DEFAULT_TOKEN_FILE: &str = "tokens.json";
}

/// Time window defaults
pub mod time_windows {
    /// Default look-back window for time-ranged reads, in hours
    pub const DEFAULT_WINDOW_HOURS: i64 = 24;
}

/// Environment-based configuration accessors
pub mod env_config {
    use super::env;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(super::ports::DEFAULT_HTTP_PORT)
    }

    /// Get Dexcom API base URL from environment or default
    #[must_use]
    pub fn dexcom_api_base() -> String {
        env::var("DEXCOM_API_BASE").unwrap_or_else(|_| super::api::DEFAULT_API_BASE.into())
    }

    /// Get Dexcom authorization URL from environment or derive it from the
    /// API base (OAuth lives on the v2 surface)
    #[must_use]
    pub fn dexcom_auth_url() -> String {
        env::var("DEXCOM_AUTH_URL")
            .unwrap_or_else(|_| format!("{}{}", oauth_base(), super::oauth::LOGIN_PATH))
    }

    /// Get Dexcom token URL from environment or derive it from the API base
    #[must_use]
    pub fn dexcom_token_url() -> String {
        env::var("DEXCOM_TOKEN_URL")
            .unwrap_or_else(|_| format!("{}{}", oauth_base(), super::oauth::TOKEN_PATH))
    }

    /// Get the token file path from environment or default
    #[must_use]
    pub fn token_file() -> String {
        env::var("TOKEN_FILE").unwrap_or_else(|_| super::storage::DEFAULT_TOKEN_FILE.into())
    }

    fn oauth_base() -> String {
        dexcom_api_base()
            .trim_end_matches(super::api::DATA_VERSION_SUFFIX)
            .into()
    }
}
