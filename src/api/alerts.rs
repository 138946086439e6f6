//! Alert feed endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::routes::AppState;
use super::types::{AlertQuery, HealthResponse, RefreshResponse};
use crate::alerts::{AlertSummary, TierFilter};
use crate::budget::parse_snapshot;
use crate::engine::{AlertFeed, RefreshOutcome};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        budgets: state.engine.records().await.len(),
        dismissed: state.engine.store().len().await,
        source_configured: state.source.is_some(),
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AlertQuery>,
) -> ApiResult<AlertFeed> {
    let filter = match q.tier.as_deref() {
        Some(raw) => raw
            .parse::<TierFilter>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        None => TierFilter::All,
    };
    Ok(Json(state.engine.feed(filter).await))
}

pub async fn summary(State(state): State<Arc<AppState>>) -> Json<AlertSummary> {
    Json(state.engine.feed(TierFilter::All).await.summary)
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> ApiResult<RefreshResponse> {
    let source = state.source.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "No budget status source configured".to_string(),
        )
    })?;

    let outcome = state
        .engine
        .refresh_from(source.as_ref())
        .await
        .map_err(|e| {
            tracing::warn!("Budget refresh failed: {}", e);
            (StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let response = match outcome {
        RefreshOutcome::Applied(feed) => RefreshResponse {
            outcome: "applied".to_string(),
            feed: Some(feed),
        },
        RefreshOutcome::Superseded => RefreshResponse {
            outcome: "superseded".to_string(),
            feed: None,
        },
        RefreshOutcome::Cancelled => RefreshResponse {
            outcome: "cancelled".to_string(),
            feed: None,
        },
    };
    Ok(Json(response))
}

pub async fn apply_snapshot(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<AlertFeed> {
    let records =
        parse_snapshot(&body).map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(state.engine.refresh(records).await))
}

pub async fn dismiss(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<AlertFeed> {
    Json(state.engine.dismiss(&id).await)
}

pub async fn dismiss_all(State(state): State<Arc<AppState>>) -> Json<AlertFeed> {
    Json(state.engine.dismiss_all().await)
}

pub async fn clear_dismissed(State(state): State<Arc<AppState>>) -> Json<AlertFeed> {
    Json(state.engine.clear_dismissed().await)
}
