// ABOUTME: HTTP route modules for the OAuth flow and glucose data reads
// ABOUTME: Thin, stateless handlers delegating to the lifecycle manager and provider
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Session and OAuth flow routes
pub mod auth;

/// Glucose data read routes
pub mod data;

/// Health check routes for service monitoring
pub mod health;

pub use auth::AuthRoutes;
pub use data::DataRoutes;
pub use health::HealthRoutes;
