// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facebook Login server
//!
//! Signs users in with Facebook, keeps one record per Facebook account,
//! and serves a profile page to logged-in users.

use facebook_login::{config::Config, db::Database, services::FacebookClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment; refuse to start if incomplete
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Facebook Login");

    let db = Database::connect(&config.database).await?;
    let facebook = FacebookClient::from_config(&config);

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, facebook));

    // Build router
    let app = facebook_login::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server is running on port {}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("facebook_login=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
