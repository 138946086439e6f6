//! Budget module - budget snapshots and period arithmetic.
//!
//! # Key Concepts
//! - Record: one category budget with its spend, as reported by the Budget Status service
//! - Period: the recurring window a budget applies to, and how many days of it are left
//! - Snapshot: the full array of records delivered on each refresh

mod period;
mod record;
mod snapshot;

pub use period::{days_elapsed, days_remaining, total_days};
pub use record::{parse_start_date, BudgetMetrics, BudgetPeriod, BudgetRecord};
pub use snapshot::parse_snapshot;
