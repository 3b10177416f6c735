use serde::Deserialize;
use serde_json::Value;

use crate::models::UploadedFile;
use crate::pipeline::extraction::{DocumentGateway, ExtractionError};

/// Coordinator-side seam to the extraction gateway. Implemented in-process
/// by `DocumentGateway` and over HTTP by `RemoteExtractionService`.
pub trait ExtractionService: Send + Sync {
    /// Pre-flight: whether the model credential is configured. Lets the
    /// coordinator short-circuit to the placeholder without a request cycle.
    fn analysis_available(&self) -> bool;

    fn extract(&self, file: &UploadedFile) -> Result<Value, ExtractionError>;
}

impl ExtractionService for DocumentGateway {
    fn analysis_available(&self) -> bool {
        DocumentGateway::analysis_available(self)
    }

    fn extract(&self, file: &UploadedFile) -> Result<Value, ExtractionError> {
        DocumentGateway::extract(self, file)
    }
}

/// HTTP client for an out-of-process extraction gateway.
pub struct RemoteExtractionService {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct StatusBody {
    configured: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    details: Option<String>,
}

impl RemoteExtractionService {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

impl ExtractionService for RemoteExtractionService {
    fn analysis_available(&self) -> bool {
        let url = format!("{}/api/extract/status", self.base_url);
        match self.client.get(&url).send() {
            Ok(response) => response
                .json::<StatusBody>()
                .map(|body| body.configured)
                .unwrap_or(false),
            Err(e) => {
                tracing::debug!(error = %e, "extraction pre-flight unreachable");
                false
            }
        }
    }

    fn extract(&self, file: &UploadedFile) -> Result<Value, ExtractionError> {
        let url = format!("{}/api/extract", self.base_url);

        let part = reqwest::blocking::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ExtractionError::UnsupportedMedia(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| ExtractionError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .map_err(|e| ExtractionError::MalformedResponse(e.to_string()));
        }

        let detail = response
            .json::<ErrorBody>()
            .map(|body| match body.details {
                Some(details) => format!("{}: {details}", body.error),
                None => body.error,
            })
            .unwrap_or_else(|_| format!("gateway returned {status}"));

        Err(match status.as_u16() {
            415 => ExtractionError::UnsupportedMedia(detail),
            422 => ExtractionError::NoTextContent,
            502 => ExtractionError::MalformedResponse(detail),
            status if status >= 500 => ExtractionError::ServiceUnavailable(detail),
            _ => ExtractionError::MalformedResponse(detail),
        })
    }
}
