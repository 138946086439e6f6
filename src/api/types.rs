//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::engine::AlertFeed;

#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    /// `all` (default), `critical`, `warning`, `info` or `success`.
    pub tier: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub budgets: usize,
    pub dismissed: usize,
    /// Whether a Budget Status service is configured for `/api/alerts/refresh`.
    pub source_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// `applied`, `superseded` or `cancelled`.
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<AlertFeed>,
}
