// ABOUTME: Main library entry point for the CGM Bridge glucose data service
// ABOUTME: Provides OAuth2 token lifecycle management and Dexcom API access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # CGM Bridge
//!
//! An OAuth2-authenticated bridge to the Dexcom continuous glucose monitoring
//! (CGM) API. A user authorizes the application once through the
//! authorization-code grant; the bridge exchanges the code for an
//! access/refresh token pair, persists the pair durably, and uses it to fetch
//! time-series glucose data on demand.
//!
//! ## Architecture
//!
//! - **OAuth**: token acquisition, durable storage, expiry detection, and
//!   transparent refresh with forced re-authentication on refresh failure
//! - **Providers**: bearer-authenticated reads against the Dexcom resource
//!   API with per-endpoint failure isolation
//! - **Routes**: thin HTTP layer exposing the OAuth flow and data reads
//! - **Config**: environment-based configuration management
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cgm_bridge::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("CGM Bridge configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Unified error handling for HTTP responses
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// Common data models for glucose data
pub mod models;

/// OAuth 2.0 client: token lifecycle, persistence, and endpoint calls
pub mod oauth;

/// Glucose data provider implementations
pub mod providers;

/// `HTTP` routes for the OAuth flow and data reads
pub mod routes;

/// Server resources and router assembly
pub mod server;

/// Utility functions and helpers
pub mod utils;
