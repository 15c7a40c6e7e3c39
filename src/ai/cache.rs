//! Response Cache
//!
//! Content-addressable store of generated text. One file per entry under the
//! cache root; the filename is the hex SHA-256 of `prompt ++ model`, the content
//! is the raw post-processed response.
//!
//! The cache is shared across runs and assumes a single writer; concurrent runs
//! against the same directory are not coordinated.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::{AutodocError, Result};

/// Cache key for a rendered prompt and model
pub fn cache_key(prompt: &str, model: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hasher.update(model.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// On-disk response cache
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Load an entry; a missing entry is `None`, any other failure is an error
    pub async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(key, bytes = bytes.len(), "Cache hit");
                String::from_utf8(bytes).map(Some).map_err(|e| AutodocError::CacheIo {
                    path,
                    source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AutodocError::CacheIo { path, source }),
        }
    }

    /// Create or overwrite an entry
    pub async fn save(&self, key: &str, content: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| AutodocError::CacheIo {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.entry_path(key);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| AutodocError::CacheIo {
                path: path.clone(),
                source,
            })?;

        debug!(key, bytes = content.len(), "Cache entry saved");
        Ok(())
    }
}
