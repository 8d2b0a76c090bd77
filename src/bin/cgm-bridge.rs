// ABOUTME: Server binary for the CGM Bridge glucose data service
// ABOUTME: Loads environment configuration, restores a saved session, and serves the HTTP API
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # CGM Bridge Server Binary
//!
//! Starts the OAuth bridge to the Dexcom API: restores a persisted session
//! when one exists (refreshing an expired token once), otherwise directs
//! the user to the authorization URL, then serves the HTTP API.

use anyhow::Result;
use cgm_bridge::{config::environment::ServerConfig, logging, server, server::ServerResources};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cgm-bridge")]
#[command(about = "CGM Bridge - OAuth2 bridge server for Dexcom glucose monitoring data")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    // Initialize production logging
    logging::init_from_env()?;

    info!("Starting CGM Bridge");
    info!("{}", config.summary());

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(config)?);

    // Restore a saved session on startup so a restart does not force
    // re-authentication while the refresh token is still good.
    match resources.lifecycle.load_persisted_session().await {
        Ok(true) => info!("Loaded valid saved tokens - already authenticated"),
        Ok(false) => info!(
            "No usable saved session - visit http://localhost:{port} to start the OAuth flow"
        ),
        Err(e) => warn!("Could not restore saved session: {e}"),
    }

    display_available_endpoints(port);

    server::serve(resources, port).await
}

/// Display all available API endpoints
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());

    info!("=== Available API Endpoints ===");
    info!("OAuth Flow:");
    info!("   Session / Auth URL: GET http://{host}:{port}/");
    info!("   OAuth Callback:     GET http://{host}:{port}/callback");
    info!("   Logout:             GET http://{host}:{port}/logout");
    info!("Glucose Data:");
    info!("   Latest Reading:     GET http://{host}:{port}/latest-reading");
    info!("   Readings:           GET http://{host}:{port}/readings?startDate=...&endDate=...");
    info!("   Devices:            GET http://{host}:{port}/devices");
    info!("   Data Range:         GET http://{host}:{port}/data-range");
    info!("   Alerts:             GET http://{host}:{port}/alerts?startDate=...&endDate=...");
    info!("   Calibrations:       GET http://{host}:{port}/calibrations?startDate=...&endDate=...");
    info!("   Events:             GET http://{host}:{port}/events?startDate=...&endDate=...");
    info!("   Endpoint Probe:     GET http://{host}:{port}/status");
    info!("Monitoring:");
    info!("   Health Check:       GET http://{host}:{port}/health");
    info!("=== End of Endpoint List ===");
}
