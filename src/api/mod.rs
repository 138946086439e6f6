//! HTTP API for the budget alert engine.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/alerts?tier=...` - Current alert feed, optionally filtered by tier
//! - `GET /api/alerts/summary` - Banner summary
//! - `POST /api/alerts/refresh` - Fetch a fresh snapshot from the Budget Status service
//! - `PUT /api/budgets/snapshot` - Apply a snapshot supplied in the request body
//! - `POST /api/alerts/{id}/dismiss` - Dismiss one alert
//! - `POST /api/alerts/dismiss-all` - Dismiss every active alert
//! - `DELETE /api/alerts/dismissed` - Clear all dismissals

mod alerts;
mod routes;
pub mod types;

pub use routes::{create_router, serve, AppState};
pub use types::*;
