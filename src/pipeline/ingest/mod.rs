pub mod coordinator;
pub mod notify;
pub mod service;

pub use coordinator::*;
pub use notify::*;
pub use service::*;

use thiserror::Error;

use crate::pipeline::commit::CommitError;

#[derive(Error, Debug)]
pub enum IngestError {
    /// The workflow is not in a confirmable state (no file, missing
    /// metadata, or wrong stage). Rejected locally, no network call made.
    #[error("Upload not ready: {0}")]
    NotReady(String),

    #[error(transparent)]
    Commit(#[from] CommitError),
}
