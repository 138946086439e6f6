//! Process-local dismissal backend.

use std::sync::Mutex;

use async_trait::async_trait;

use super::DismissalBackend;

/// Keeps the list in memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryDismissalBackend {
    ids: Mutex<Option<Vec<String>>>,
}

impl MemoryDismissalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously persisted list.
    pub fn with_ids(ids: Vec<String>) -> Self {
        Self {
            ids: Mutex::new(Some(ids)),
        }
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Option<Vec<String>>>> {
        self.ids
            .lock()
            .map_err(|_| anyhow::anyhow!("memory dismissal backend lock poisoned"))
    }
}

#[async_trait]
impl DismissalBackend for MemoryDismissalBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.lock()?.clone().unwrap_or_default())
    }

    async fn save(&self, ids: &[String]) -> anyhow::Result<()> {
        *self.lock()? = Some(ids.to_vec());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
