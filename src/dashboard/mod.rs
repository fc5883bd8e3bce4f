//! Dashboard: Axum web server fronting the session registry.
//!
//! Serves the JSON API used by the presentation shell. CORS enabled for
//! local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use routes::AppState;

/// Bind and serve until Ctrl+C.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind dashboard address {addr}"))?;
    info!(%addr, "Dashboard server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Dashboard server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received.");
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/sessions", post(routes::login))
        .route(
            "/api/sessions/:token",
            get(routes::get_session).delete(routes::logout),
        )
        .route("/api/sessions/:token/capital", post(routes::lock_capital))
        .route("/api/sessions/:token/allocations", post(routes::allocate))
        .route("/api/sessions/:token/decisions", post(routes::decide))
        .route("/api/sessions/:token/quotations", post(routes::compare_quotation))
        .route("/api/sessions/:token/build-vs-buy", post(routes::compare_build_vs_buy))
        .route("/api/sessions/:token/summary", get(routes::get_summary))
        .route(
            "/api/sessions/:token/snapshot",
            get(routes::export_snapshot).put(routes::restore_snapshot),
        )
        .route("/api/sessions/:token/backup", post(routes::save_backup))
        .route("/api/sessions/:token/backup/restore", post(routes::restore_backup))
        .route("/api/sessions/:token/report", get(routes::master_report))
        .route("/api/sessions/:token/reports/:sector", get(routes::sector_report))
        .route("/api/sessions/:token/sync", post(routes::sync_remote))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
