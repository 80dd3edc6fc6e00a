// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JudoTrack API Server
//!
//! Records judo competition results for club athletes and enforces who may
//! see, enter, and manage each competition.

use judotrack::{config::Config, db::Database, AppState};
use std::sync::Arc;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        category_policy = ?config.category_policy,
        "Starting JudoTrack API"
    );

    let db = Database::connect(&config.storage).await?;
    tracing::info!(storage = ?config.storage, "Storage ready");

    let state = Arc::new(AppState::new(config.clone(), db));

    if state
        .accounts
        .bootstrap(&config.bootstrap_dev_password)
        .await?
    {
        tracing::info!("Empty database initialized with the bootstrap dev account");
    }

    if !state.feedback.is_enabled() {
        tracing::info!("GEMINI_API_KEY not set, AI feedback disabled");
    }

    // Build router
    let app = judotrack::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

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

    let mut filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    if let Ok(directive) = "judotrack=debug".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::registry().with(filter).with(format).init();
}
