//! Alerts module - classification and the alert feed.
//!
//! # Key Concepts
//! - Tier: severity of a budget's spend ratio (critical, warning, info, success)
//! - Priority: display urgency derived from the tier, used for ordering
//! - Pipeline: pure recomputation of the feed from a snapshot and the dismissed ids

mod classifier;
mod pipeline;
mod types;

pub use classifier::{classify, tier_for};
pub use pipeline::{
    build_summary, filter, generate, overview, summarize, AlertCounts, AlertSummary,
    BudgetOverview, TierCounts,
};
pub use types::{Alert, AlertDetails, AlertPriority, AlertTier, TierFilter};
