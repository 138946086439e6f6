//! Alert engine - the stateful façade used by the API and the refresh timer.
//!
//! Holds the latest applied budget snapshot and the [`DismissalStore`], and
//! recomputes the feed from scratch on every call. Refreshes follow a
//! "latest wins" discipline: each refresh takes a generation number, and a
//! fetch whose generation is no longer current is discarded on arrival.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::alerts::{self, Alert, AlertSummary, TierFilter};
use crate::budget::BudgetRecord;
use crate::dismissal::DismissalStore;
use crate::source::BudgetSource;

/// What the consuming view renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFeed {
    /// Alerts matching the requested filter, most urgent first.
    pub alerts: Vec<Alert>,
    /// Counts over all alerts (unfiltered) plus the budget overview.
    pub summary: AlertSummary,
    /// Size of the dismissal set.
    pub dismissed_count: usize,
}

/// Result of [`AlertEngine::refresh_from`].
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The fetched snapshot was applied.
    Applied(AlertFeed),
    /// A newer refresh started while this one was in flight; the result was dropped.
    Superseded,
    /// The fetch was cancelled before it completed.
    Cancelled,
}

pub struct AlertEngine {
    store: Arc<DismissalStore>,
    records: RwLock<Arc<Vec<BudgetRecord>>>,
    generation: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
}

impl AlertEngine {
    /// Create an engine with an empty snapshot.
    ///
    /// The store should already be loaded.
    pub fn new(store: Arc<DismissalStore>) -> Self {
        Self {
            store,
            records: RwLock::new(Arc::new(Vec::new())),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &Arc<DismissalStore> {
        &self.store
    }

    /// The currently applied snapshot.
    pub async fn records(&self) -> Arc<Vec<BudgetRecord>> {
        Arc::clone(&*self.records.read().await)
    }

    /// Apply a snapshot that is already in hand.
    ///
    /// Any fetch still in flight is cancelled, so it cannot overwrite these records.
    /// After [`AlertEngine::shutdown`] the snapshot is ignored and the current feed returned.
    pub async fn refresh(&self, records: Vec<BudgetRecord>) -> AlertFeed {
        if self.shutdown.is_cancelled() {
            tracing::debug!(budgets = records.len(), "Ignoring snapshot after shutdown");
            return self.feed(TierFilter::All).await;
        }
        let (generation, _token) = self.begin_refresh().await;
        self.apply(generation, records).await;
        self.feed(TierFilter::All).await
    }

    /// Fetch a snapshot from `source` and apply it if it is still the latest.
    pub async fn refresh_from(&self, source: &dyn BudgetSource) -> anyhow::Result<RefreshOutcome> {
        if self.shutdown.is_cancelled() {
            return Ok(RefreshOutcome::Cancelled);
        }
        let (generation, token) = self.begin_refresh().await;

        let fetched = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(generation, source = source.name(), "Budget fetch cancelled");
                return Ok(RefreshOutcome::Cancelled);
            }
            result = source.fetch() => result,
        };

        if !self.is_current(generation) {
            tracing::debug!(generation, source = source.name(), "Discarding superseded budget fetch");
            return Ok(RefreshOutcome::Superseded);
        }

        let records = fetched?;
        if !self.apply(generation, records).await {
            return Ok(RefreshOutcome::Superseded);
        }
        Ok(RefreshOutcome::Applied(self.feed(TierFilter::All).await))
    }

    /// Recompute the feed as of now.
    pub async fn feed(&self, filter: TierFilter) -> AlertFeed {
        self.feed_at(filter, Utc::now()).await
    }

    /// Recompute the feed as of `now`.
    ///
    /// Works on an immutable copy of the records and of the dismissal set.
    pub async fn feed_at(&self, filter: TierFilter, now: DateTime<Utc>) -> AlertFeed {
        let records = self.records().await;
        let dismissed = self.store.snapshot().await;

        let all = alerts::generate(&records, &dismissed, now);
        let summary = alerts::build_summary(&records, &all, &dismissed, now);
        AlertFeed {
            alerts: alerts::filter(&all, filter),
            summary,
            dismissed_count: dismissed.len(),
        }
    }

    /// Dismiss one alert and return the recomputed feed.
    pub async fn dismiss(&self, id: &str) -> AlertFeed {
        if self.store.dismiss(id).await {
            tracing::info!(alert_id = id, "Alert dismissed");
        }
        self.feed(TierFilter::All).await
    }

    /// Dismiss every alert currently in the feed.
    ///
    /// The ids come from the snapshot applied when the call starts. Alerts
    /// introduced by a refresh that lands during the call stay visible.
    pub async fn dismiss_all(&self) -> AlertFeed {
        let ids: Vec<String> = {
            let records = self.records.read().await;
            let dismissed = self.store.snapshot().await;
            alerts::generate(&records, &dismissed, Utc::now())
                .into_iter()
                .map(|alert| alert.id)
                .collect()
        };
        let added = self.store.dismiss_all(ids).await;
        tracing::info!(count = added, "Dismissed all active alerts");
        self.feed(TierFilter::All).await
    }

    /// Forget all dismissals; alerts that still apply reappear.
    pub async fn clear_dismissed(&self) -> AlertFeed {
        let cleared = self.store.clear().await;
        tracing::info!(count = cleared, "Cleared dismissed alerts");
        self.feed(TierFilter::All).await
    }

    /// Cancel any in-flight fetch and refuse to start new ones.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn begin_refresh(&self) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.shutdown.child_token();
        if let Some(previous) = self.in_flight.lock().await.replace(token.clone()) {
            previous.cancel();
        }
        (generation, token)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Store `records` unless a newer refresh has started. Returns whether they were applied.
    async fn apply(&self, generation: u64, records: Vec<BudgetRecord>) -> bool {
        let mut current = self.records.write().await;
        if !self.is_current(generation) {
            return false;
        }
        tracing::info!(generation, budgets = records.len(), "Applied budget snapshot");
        *current = Arc::new(records);
        true
    }
}

/// Refresh from `source` every `interval` until `shutdown` fires.
///
/// Fetch errors are logged and the loop keeps going.
pub fn spawn_refresh_loop(
    engine: Arc<AlertEngine>,
    source: Arc<dyn BudgetSource>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            match engine.refresh_from(source.as_ref()).await {
                Ok(RefreshOutcome::Applied(feed)) => tracing::debug!(
                    alerts = feed.summary.counts.total_alerts,
                    "Scheduled refresh applied"
                ),
                Ok(outcome) => tracing::debug!(?outcome, "Scheduled refresh dropped"),
                Err(e) => tracing::warn!(source = source.name(), "Scheduled refresh failed: {}", e),
            }
        }
        tracing::debug!("Refresh loop stopped");
    })
}
