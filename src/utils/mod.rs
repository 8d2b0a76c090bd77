// ABOUTME: Utility functions and helpers shared across modules
// ABOUTME: Provides HTTP client construction and date-window defaulting
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Shared HTTP client utilities with timeout configuration
pub mod http_client;

/// Default date-window computation for time-ranged reads
pub mod time_range;
