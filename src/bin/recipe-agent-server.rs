// ABOUTME: HTTP server binary exposing the recipe workflow and meal planner
// ABOUTME: Loads environment configuration, initializes logging, and serves the axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recipe Agent Server Binary
//!
//! Serves `POST /` (one recipe), `POST /meal-plan` (a week of recipes), and
//! the health endpoints.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use recipe_agent::{
    config::AgentConfig,
    external::http_client::initialize_shared_client,
    logging,
    routes::{router, AppState},
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "recipe-agent-server")]
#[command(about = "Recipe agent - researches, writes, and refines recipes over HTTP")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AgentConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.server.port = http_port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    logging::init_from_config(&config)?;
    info!("Starting recipe agent server");
    info!("{}", config.summary());

    initialize_shared_client(
        config.server.client_timeout_secs,
        config.server.client_connect_timeout_secs,
    );

    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state, &config.server);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    display_available_endpoints(&address);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

fn display_available_endpoints(address: &str) {
    info!("=== Available API Endpoints ===");
    info!("   Hello:        GET  http://{address}/");
    info!("   Recipe:       POST http://{address}/");
    info!("   Meal plan:    POST http://{address}/meal-plan");
    info!("   Health:       GET  http://{address}/health");
    info!("   Readiness:    GET  http://{address}/ready");
    info!("=== End of Endpoint List ===");
}
