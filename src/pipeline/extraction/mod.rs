pub mod format;
pub mod gateway;
pub mod llm;
pub mod pdf;
pub mod prompt;
pub mod sanitize;

pub use format::*;
pub use gateway::*;
pub use llm::*;
pub use pdf::*;
pub use prompt::*;
pub use sanitize::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Document contains no extractable text")]
    NoTextContent,

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Text encoding error: {0}")]
    Encoding(String),

    #[error("Analysis service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),
}

impl ExtractionError {
    /// True for failures of the text-extraction step itself — the document
    /// can still be uploaded without analysis.
    pub fn is_text_failure(&self) -> bool {
        matches!(
            self,
            Self::NoTextContent | Self::PdfParsing(_) | Self::Encoding(_)
        )
    }
}
