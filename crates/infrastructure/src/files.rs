// Photo storage on the local filesystem. Stored paths are bare file names
// relative to the configured root, which keeps the database rows portable
// across hosts.

use async_trait::async_trait;
use person_registry_application::files::FileManager;
use person_registry_domain::{DomainError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tracing::debug;

pub struct LocalFileManager {
    root: PathBuf,
    sequence: AtomicU64,
}

impl LocalFileManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates the storage directory if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            DomainError::infrastructure(format!(
                "failed to create photo directory {}: {e}",
                self.root.display()
            ))
        })
    }

    /// Strips any directory components from a client-supplied file name.
    fn base_name(file_name: &str) -> &str {
        Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo")
    }

    fn resolve(&self, stored_path: &str) -> Result<PathBuf> {
        if stored_path.contains(['/', '\\']) || stored_path.contains("..") {
            return Err(DomainError::infrastructure(format!(
                "invalid stored file path '{stored_path}'"
            )));
        }
        Ok(self.root.join(stored_path))
    }

    fn unique_name(&self, file_name: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{nanos}-{seq}-{}", Self::base_name(file_name))
    }
}

#[async_trait]
impl FileManager for LocalFileManager {
    async fn upload(&self, file_name: &str, content: &[u8]) -> Result<String> {
        let name = self.unique_name(file_name);
        let target = self.root.join(&name);
        fs::write(&target, content).await.map_err(|e| {
            DomainError::infrastructure(format!("failed to write {}: {e}", target.display()))
        })?;
        debug!(path = %name, bytes = content.len(), "file stored");
        Ok(name)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::infrastructure(format!(
                "failed to remove {}: {e}",
                target.display()
            ))),
        }
    }

    async fn replace(
        &self,
        file_name: &str,
        content: &[u8],
        existing_path: &str,
    ) -> Result<String> {
        let path = self.upload(file_name, content).await?;
        self.delete(existing_path).await?;
        Ok(path)
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.resolve(path)?;
        fs::read(&target).await.map_err(|e| {
            DomainError::infrastructure(format!("failed to read {}: {e}", target.display()))
        })
    }
}
