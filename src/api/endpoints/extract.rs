//! Extraction gateway endpoints: document upload and credential pre-flight.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::UploadedFile;

/// Maximum accepted document size (25 MB). Enforced here — the gateway
/// itself does not limit input size.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Serialize)]
pub struct StatusResponse {
    pub configured: bool,
}

/// `POST /api/extract` — multipart document in, model-derived JSON out.
///
/// 200 → `{ parameters, aiAnalysis: { conditions, medications,
/// recommendations, summary } }`; failures map per `ApiError`.
pub async fn upload(
    State(ctx): State<ApiContext>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let file = read_file_part(multipart).await?;

    if file.bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".into()));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::BadRequest(format!(
            "File exceeds the {} MB upload limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    let gateway = ctx.gateway.clone();
    let value = tokio::task::spawn_blocking(move || gateway.extract(&file))
        .await
        .map_err(|e| ApiError::Internal(format!("extraction task failed: {e}")))??;

    Ok(Json(value))
}

/// `GET /api/extract/status` — pre-flight: is the model credential
/// configured? Lets clients skip the upload request cycle entirely.
pub async fn status(State(ctx): State<ApiContext>) -> Json<StatusResponse> {
    Json(StatusResponse {
        configured: ctx.gateway.analysis_available(),
    })
}

async fn read_file_part(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("document").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read file part: {e}")))?;

        return Ok(UploadedFile::new(name, content_type, bytes.to_vec()));
    }

    Err(ApiError::BadRequest(
        "Multipart body is missing a 'file' part".into(),
    ))
}
