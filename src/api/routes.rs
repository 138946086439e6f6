//! Router, shared state and server entry point.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::alerts;
use crate::config::Config;
use crate::engine::AlertEngine;
use crate::source::BudgetSource;

/// Shared application state.
pub struct AppState {
    pub engine: Arc<AlertEngine>,
    /// Budget Status service, if one is configured.
    pub source: Option<Arc<dyn BudgetSource>>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(alerts::health))
        .route("/api/alerts", get(alerts::list))
        .route("/api/alerts/summary", get(alerts::summary))
        .route("/api/alerts/refresh", post(alerts::refresh))
        .route("/api/alerts/dismiss-all", post(alerts::dismiss_all))
        .route("/api/alerts/dismissed", delete(alerts::clear_dismissed))
        .route("/api/alerts/:id/dismiss", post(alerts::dismiss))
        .route("/api/budgets/snapshot", put(alerts::apply_snapshot))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` is cancelled.
pub async fn serve(
    config: &Config,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Budget alert API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
