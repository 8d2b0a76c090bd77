// ABOUTME: Configuration module for environment-based server settings
// ABOUTME: Exposes the environment configuration loader and its types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Environment-based configuration loading
pub mod environment;

pub use environment::{DexcomApiConfig, OAuthProviderConfig, ServerConfig};
