use std::path::PathBuf;

use super::{FileStore, StorageError};

/// Filesystem-backed document store. Files land under `root` and are served
/// back under `base_url` (the binary mounts the root at `/files`).
pub struct LocalFileStore {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }
}

impl FileStore for LocalFileStore {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if path.split('/').any(|segment| segment == "..") {
            return Err(StorageError::Rejected(format!("invalid path: {path}")));
        }

        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Content-addressed paths make re-uploads of identical bytes a no-op.
        if !target.exists() {
            std::fs::write(&target, bytes)?;
        }

        tracing::info!(path, size = bytes.len(), "document stored");
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}
