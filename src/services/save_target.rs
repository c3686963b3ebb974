use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use crate::errors::FileClientError;

/// Name used when a download has no usable file name.
pub const DEFAULT_SAVE_NAME: &str = "file.txt";

/// Where downloaded content ends up on the client side.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    async fn save(&self, name: &str, content: &[u8]) -> Result<(), FileClientError>;
}

/// Saves downloads into a local directory under the remote file's base name.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Local path a remote name is saved to. Only the last path segment is
    /// used so a name can never escape the target directory.
    pub fn local_path(&self, name: &str) -> PathBuf {
        let base = name
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .filter(|segment| *segment != "." && *segment != "..")
            .unwrap_or(DEFAULT_SAVE_NAME);

        self.dir.join(base)
    }
}

#[async_trait]
impl SaveTarget for DirectoryTarget {
    async fn save(&self, name: &str, content: &[u8]) -> Result<(), FileClientError> {
        let path = self.local_path(name);
        let save_error = |source| FileClientError::Save {
            name: name.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(save_error)?;
        tokio::fs::write(&path, content).await.map_err(save_error)?;

        info!("💾 Saved {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl SaveTarget for MemoryTarget {
    async fn save(&self, name: &str, content: &[u8]) -> Result<(), FileClientError> {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((name.to_string(), content.to_vec()));
        Ok(())
    }
}
