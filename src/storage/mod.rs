pub mod local;

pub use local::*;

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload rejected: {0}")]
    Rejected(String),
}

/// Object storage seam: persist original document bytes and hand back a
/// durable, retrievable URL.
pub trait FileStore: Send + Sync {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, StorageError>;
    fn public_url(&self, path: &str) -> String;
}

/// Content-addressed storage path for an uploaded document:
/// `<sha256-prefix>/<sanitized-name>`. Identical bytes map to the same path.
pub fn document_path(file_name: &str, bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let prefix = hex::encode(&digest[..8]);
    format!("{prefix}/{}", sanitize_file_name(file_name))
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}
