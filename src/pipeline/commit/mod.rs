pub mod orchestrator;

pub use orchestrator::*;

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum CommitError {
    /// The original file could not be stored. Fatal: nothing is persisted.
    #[error("Document storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The primary record write failed after the file was stored. Fatal:
    /// no derived writes are attempted; the stored file is an accepted
    /// orphan, not corrected here.
    #[error("Health record write failed: {0}")]
    PrimaryWrite(String),
}

/// The four derived collections fanned out after the primary write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedKind {
    Parameters,
    Conditions,
    Medications,
    Recommendations,
}

impl DerivedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parameters => "parameters",
            Self::Conditions => "conditions",
            Self::Medications => "medications",
            Self::Recommendations => "recommendations",
        }
    }
}

/// A derived write that failed. Soft: the record itself stands.
#[derive(Debug, Clone)]
pub struct CommitWarning {
    pub kind: DerivedKind,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub record_id: Uuid,
    pub document_url: String,
    pub warnings: Vec<CommitWarning>,
}
