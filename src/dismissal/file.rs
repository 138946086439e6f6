//! JSON file dismissal backend.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::DismissalBackend;

/// Stores the list as a JSON array in a single file.
///
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileDismissalBackend {
    path: PathBuf,
}

impl JsonFileDismissalBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DismissalBackend for JsonFileDismissalBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> anyhow::Result<Vec<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, ids: &[String]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, serde_json::to_string_pretty(ids)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileDismissalBackend::new(dir.path().join("dismissed.json"));
        assert!(backend.load().await.unwrap().is_empty());
        // Clearing a file that was never written is fine.
        backend.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_roundtrip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("dismissed.json");
        let backend = JsonFileDismissalBackend::new(&path);
        assert_eq!(backend.path(), path.as_path());

        backend
            .save(&["budget-1-monthly".to_string(), "budget-3-daily".to_string()])
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let on_disk: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk, vec!["budget-1-monthly", "budget-3-daily"]);
        assert!(!backend.temp_path().exists());

        backend.clear().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dismissed.json");
        std::fs::write(&path, "{\"not\": \"a list\"}").unwrap();

        let backend = JsonFileDismissalBackend::new(&path);
        assert!(backend.load().await.is_err());
    }
}
