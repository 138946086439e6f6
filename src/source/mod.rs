//! Budget sources - where snapshots come from.
//!
//! The engine never talks to the network itself. A [`BudgetSource`] is
//! awaited at the boundary and its result handed to the pure pipeline.

mod http;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::budget::{parse_snapshot, BudgetRecord};

pub use http::HttpBudgetSource;

/// Producer of budget snapshots.
#[async_trait]
pub trait BudgetSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fetch and decode the current snapshot.
    async fn fetch(&self) -> anyhow::Result<Vec<BudgetRecord>>;
}

/// Source that always returns the same JSON snapshot, optionally after a delay.
#[derive(Debug, Clone)]
pub struct StaticBudgetSource {
    snapshot: Value,
    delay: Option<Duration>,
}

impl StaticBudgetSource {
    pub fn new(snapshot: Value) -> Self {
        Self {
            snapshot,
            delay: None,
        }
    }

    /// Wait this long before answering. Useful to simulate a slow service.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl BudgetSource for StaticBudgetSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> anyhow::Result<Vec<BudgetRecord>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(parse_snapshot(&self.snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_source_parses() {
        let source = StaticBudgetSource::new(json!([{ "budget_id": 1, "spent": 5 }]));
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].spent, 5.0);
    }

    #[tokio::test]
    async fn test_static_source_rejects_bad_snapshot() {
        let source = StaticBudgetSource::new(json!("nope"));
        let err = source.fetch().await.unwrap_err();
        assert!(err.downcast_ref::<crate::error::AlertError>().is_some());
    }
}
