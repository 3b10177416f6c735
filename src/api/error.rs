//! API error types with the structured `{ error, details? }` wire body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::extraction::ExtractionError;

/// Error response body of the extraction gateway contract.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unsupported media type")]
    UnsupportedMedia(String),
    #[error("No extractable text in document")]
    NoTextContent(Option<String>),
    #[error("Analysis service unavailable")]
    AnalysisUnavailable(String),
    #[error("Malformed analysis response")]
    UpstreamMalformed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "Invalid request", Some(detail))
            }
            ApiError::UnsupportedMedia(detail) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported document type",
                Some(detail),
            ),
            ApiError::NoTextContent(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "No text could be extracted from the document",
                detail,
            ),
            ApiError::AnalysisUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Analysis service unavailable",
                Some(detail),
            ),
            ApiError::UpstreamMalformed(detail) => (
                StatusCode::BAD_GATEWAY,
                "Analysis service returned an unreadable result",
                Some(detail),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                // Internal details stay out of the response
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error", None)
            }
        };

        let body = ErrorBody {
            error: error.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedMedia(detail) => ApiError::UnsupportedMedia(detail),
            ExtractionError::NoTextContent => ApiError::NoTextContent(None),
            ExtractionError::PdfParsing(detail) | ExtractionError::Encoding(detail) => {
                ApiError::NoTextContent(Some(detail))
            }
            ExtractionError::ServiceUnavailable(detail) => ApiError::AnalysisUnavailable(detail),
            ExtractionError::MalformedResponse(detail) => ApiError::UpstreamMalformed(detail),
        }
    }
}
