use chrono::NaiveDate;
use uuid::Uuid;

/// An in-memory document handed to the ingestion workflow.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Content type as declared by the sender. Informational only — the
    /// gateway categorizes by magic bytes.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Mandatory user-chosen metadata for a record: which condition the document
/// belongs to and the date it covers.
#[derive(Debug, Clone, Copy)]
pub struct UploadMetadata {
    pub condition_id: Uuid,
    pub document_date: NaiveDate,
}
