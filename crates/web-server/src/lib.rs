//! # Tally Web Server
//!
//! A thin axum layer that owns all I/O around the analytics engine: it accepts
//! fully-formed JSON snapshots, invokes one engine operation and returns the
//! structured result. Engine error kinds map onto distinct status codes so a
//! caller can tell a bad request from bad underlying data or missing history.

use analytics::AnalyticsEngine;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::AnalyticsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;


/// Largest accepted request body. Transaction lists are the biggest payloads.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// The shared application state that all handlers can access.
#[derive(Debug)]
pub struct AppState {
    pub engine: AnalyticsEngine,
}

/// Builds the router around an already configured engine.
pub fn create_router(engine: AnalyticsEngine) -> Router {
    let app_state = Arc::new(AppState { engine });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/ratios", post(handlers::calculate_ratios))
        .route("/api/health-score", post(handlers::assess_health))
        .route("/api/budgets/execution", post(handlers::budget_execution))
        .route("/api/budgets/overview", post(handlers::budget_overview))
        .route("/api/forecast", post(handlers::forecast))
        .route("/api/anomalies", post(handlers::detect_anomalies))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// The main function to configure and run the web server.
/// Tracing is expected to be initialized by the caller.
pub async fn run_server(addr: SocketAddr, config: &AnalyticsConfig) -> anyhow::Result<()> {
    let engine = AnalyticsEngine::new(config)?;
    let app = create_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
