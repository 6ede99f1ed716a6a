// SPDX-License-Identifier: MIT

//! Chapter-Roster API Server
//!
//! Serves club statistics, roster data and eligibility reports for a
//! riders chapter, backed by the chapter's Google Sheets activity log.

use chapter_roster::{config::Config, services::SheetsService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Chapter-Roster API");

    // Initialize the Google Sheets backend
    let sheets = SheetsService::new(config.sheets_api_key.clone(), config.spreadsheet_id.clone());
    tracing::info!(
        spreadsheet = %config.spreadsheet_id,
        "Sheets service initialized"
    );

    // Build shared state
    let state = Arc::new(AppState { config: config.clone(), sheets });

    // Build router
    let app = chapter_roster::routes::create_router(state);

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

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chapter_roster=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
