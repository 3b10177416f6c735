use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub analysis_configured: bool,
    pub version: &'static str,
}

/// `GET /api/health` — liveness and capability check.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        analysis_configured: ctx.gateway.analysis_available(),
        version: crate::config::APP_VERSION,
    })
}
