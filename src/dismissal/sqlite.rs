//! SQLite dismissal backend.
//!
//! Uses a small key-value table; the dismissed ids live in one row as a JSON
//! array. rusqlite is blocking, so every call runs on the blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::{DismissalBackend, DISMISSED_ALERTS_KEY};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

pub struct SqliteDismissalBackend {
    conn: Arc<Mutex<Connection>>,
    key: String,
}

impl SqliteDismissalBackend {
    /// Open (or create) the database file and ensure the table exists.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "Opened dismissal database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            key: DISMISSED_ALERTS_KEY.to_string(),
        })
    }

    /// Store the list under a different key (e.g. one per user).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    async fn with_conn<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> anyhow::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let key = self.key.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| anyhow::anyhow!("sqlite connection lock poisoned"))?;
            f(&conn, &key)
        })
        .await?
    }
}

#[async_trait]
impl DismissalBackend for SqliteDismissalBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self) -> anyhow::Result<Vec<String>> {
        self.with_conn(|conn, key| {
            let result = conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(raw) => Ok(serde_json::from_str(&raw)?),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Vec::new()),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn save(&self, ids: &[String]) -> anyhow::Result<()> {
        let value = serde_json::to_string(ids)?;
        self.with_conn(move |conn, key| {
            let now = chrono::Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key, value, now],
            )?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.with_conn(|conn, key| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_load_clear() {
        let backend = SqliteDismissalBackend::open_in_memory().unwrap();

        assert!(backend.load().await.unwrap().is_empty());

        let ids = vec!["budget-1-monthly".to_string(), "budget-2-weekly".to_string()];
        backend.save(&ids).await.unwrap();
        assert_eq!(backend.load().await.unwrap(), ids);

        // Overwrite
        backend.save(&ids[..1]).await.unwrap();
        assert_eq!(backend.load().await.unwrap(), ids[..1].to_vec());

        backend.clear().await.unwrap();
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("alerts.db");

        {
            let backend = SqliteDismissalBackend::open(&path).unwrap();
            backend.save(&["budget-7-yearly".to_string()]).await.unwrap();
        }

        let reopened = SqliteDismissalBackend::open(&path).unwrap();
        assert_eq!(reopened.load().await.unwrap(), vec!["budget-7-yearly"]);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.db");
        let alice = SqliteDismissalBackend::open(&path).unwrap().with_key("alice");
        let bob = SqliteDismissalBackend::open(&path).unwrap().with_key("bob");

        alice.save(&["budget-1-daily".to_string()]).await.unwrap();
        assert!(bob.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_an_error() {
        let backend = SqliteDismissalBackend::open_in_memory().unwrap();
        backend
            .with_conn(|conn, key| {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, 'not json', '')",
                    params![key],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(backend.load().await.is_err());
    }
}
