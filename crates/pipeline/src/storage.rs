//! Object storage seam.
//!
//! The warehouse's bulk loader and unloader talk to object storage by URL;
//! the pipeline itself only needs get/put/copy/delete on whole objects.
//! [`FsBlobStore`] backs local runs and tests with a directory tree.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use pipeline_core::{Error, Result};

/// Whole-object storage operations, keyed by URL or path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
    async fn put(&self, key: &str, body: &[u8]) -> Result<()>;
    async fn copy(&self, src: &str, dest: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Filesystem-backed object store. Keys may carry a `scheme://` prefix;
/// the remainder is resolved under the store's root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        let relative = match key.find("://") {
            Some(pos) => &key[pos + 3..],
            None => key,
        };
        self.root.join(relative.trim_start_matches('/'))
    }

    async fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::storage(format!("mkdir {}: {e}", parent.display())))?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key);
        fs::read(&path)
            .await
            .map_err(|e| Error::storage(format!("read {key}: {e}")))
    }

    async fn put(&self, key: &str, body: &[u8]) -> Result<()> {
        let path = self.resolve(key);
        self.ensure_parent(&path).await?;
        fs::write(&path, body)
            .await
            .map_err(|e| Error::storage(format!("write {key}: {e}")))?;
        debug!(key, bytes = body.len(), "Object written");
        Ok(())
    }

    async fn copy(&self, src: &str, dest: &str) -> Result<()> {
        let from = self.resolve(src);
        let to = self.resolve(dest);
        self.ensure_parent(&to).await?;
        fs::copy(&from, &to)
            .await
            .map_err(|e| Error::storage(format!("copy {src} -> {dest}: {e}")))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key);
        fs::remove_file(&path)
            .await
            .map_err(|e| Error::storage(format!("delete {key}: {e}")))
    }
}
