//! Dismissal store - the set of alert ids the user has hidden.
//!
//! The in-memory set is authoritative. Every mutation updates it first and
//! then rewrites the persisted list through a [`DismissalBackend`]. The set is
//! unlocked before the write starts, so readers never wait on storage. A
//! failed read or write is logged and otherwise ignored: dismissal is a
//! convenience, so the engine keeps working from memory.

mod file;
mod memory;
mod sqlite;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

pub use file::JsonFileDismissalBackend;
pub use memory::MemoryDismissalBackend;
pub use sqlite::SqliteDismissalBackend;

/// Key under which the dismissed ids are persisted.
pub const DISMISSED_ALERTS_KEY: &str = "dismissedAlerts";

/// Durable storage for the dismissed id list.
#[async_trait]
pub trait DismissalBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Read the persisted list. A store that was never written yields an empty list.
    async fn load(&self) -> anyhow::Result<Vec<String>>;

    /// Replace the persisted list.
    async fn save(&self, ids: &[String]) -> anyhow::Result<()>;

    /// Remove the persisted list entirely.
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Insertion-ordered set of ids.
#[derive(Debug, Default)]
struct DismissedIds {
    order: Vec<String>,
    members: HashSet<String>,
    /// Bumped on every mutation.
    version: u64,
}

impl DismissedIds {
    fn insert(&mut self, id: String) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    fn clear(&mut self) -> usize {
        let count = self.order.len();
        self.order.clear();
        self.members.clear();
        count
    }
}

/// Owner of the dismissed id set.
///
/// # Invariants
/// - Membership only grows until [`DismissalStore::clear`] is called.
/// - Writes are serialized and always store the newest set, so once a
///   mutation returns, the persisted list reflects it or a later one.
pub struct DismissalStore {
    ids: Mutex<DismissedIds>,
    /// Version of the set last handed to the backend.
    persisted: Mutex<u64>,
    backend: Arc<dyn DismissalBackend>,
}

impl DismissalStore {
    /// Create an empty store. Call [`DismissalStore::load`] once at startup.
    pub fn new(backend: Arc<dyn DismissalBackend>) -> Self {
        Self {
            ids: Mutex::new(DismissedIds::default()),
            persisted: Mutex::new(0),
            backend,
        }
    }

    /// Replace the in-memory set with the persisted list.
    ///
    /// On a read failure the store starts empty.
    pub async fn load(&self) -> HashSet<String> {
        let loaded = match self.backend.load().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    "Failed to load dismissed alerts, starting empty: {}",
                    e
                );
                Vec::new()
            }
        };

        let mut ids = self.ids.lock().await;
        ids.clear();
        for id in loaded {
            ids.insert(id);
        }
        tracing::info!(
            backend = self.backend.name(),
            count = ids.order.len(),
            "Loaded dismissed alerts"
        );
        ids.members.clone()
    }

    /// Dismiss one alert id. Returns `true` if it was not already dismissed.
    pub async fn dismiss(&self, id: &str) -> bool {
        let (added, version) = {
            let mut ids = self.ids.lock().await;
            let added = ids.insert(id.to_string());
            ids.version += 1;
            (added, ids.version)
        };
        self.persist(version).await;
        added
    }

    /// Dismiss several ids at once. Returns how many were new.
    pub async fn dismiss_all<I>(&self, new_ids: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let (added, version) = {
            let mut ids = self.ids.lock().await;
            let added = new_ids.into_iter().filter(|id| ids.insert(id.clone())).count();
            ids.version += 1;
            (added, ids.version)
        };
        self.persist(version).await;
        added
    }

    /// Forget every dismissal. Returns how many ids were cleared.
    pub async fn clear(&self) -> usize {
        let (cleared, version) = {
            let mut ids = self.ids.lock().await;
            let cleared = ids.clear();
            ids.version += 1;
            (cleared, ids.version)
        };
        self.persist(version).await;
        cleared
    }

    /// Immutable copy of the current set.
    pub async fn snapshot(&self) -> HashSet<String> {
        self.ids.lock().await.members.clone()
    }

    /// Dismissed ids in the order they were dismissed.
    pub async fn ids(&self) -> Vec<String> {
        self.ids.lock().await.order.clone()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.ids.lock().await.members.contains(id)
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Write the newest set unless a write covering `version` already happened.
    ///
    /// An empty set removes the persisted list.
    async fn persist(&self, version: u64) {
        let mut persisted = self.persisted.lock().await;
        if *persisted >= version {
            return;
        }

        let (latest, order) = {
            let ids = self.ids.lock().await;
            (ids.version, ids.order.clone())
        };

        let result = if order.is_empty() {
            self.backend.clear().await
        } else {
            self.backend.save(&order).await
        };
        if let Err(e) = result {
            tracing::warn!(
                backend = self.backend.name(),
                count = order.len(),
                "Failed to persist dismissed alerts, keeping them in memory only: {}",
                e
            );
        }
        *persisted = latest;
    }
}
