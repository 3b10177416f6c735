//! Extraction gateway router.
//!
//! `/api` carries the gateway contract; `/files` serves stored documents so
//! the URLs handed out by the persistence layer resolve.

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the `/api` router for the extraction gateway.
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/extract", post(endpoints::extract::upload))
        .route("/extract/status", get(endpoints::extract::status))
        .with_state(ctx)
        // Multipart framing needs headroom beyond the document limit
        .layer(DefaultBodyLimit::max(
            endpoints::extract::MAX_UPLOAD_BYTES + 1024 * 1024,
        ));

    Router::new().nest("/api", api)
}

/// Full application router: the API plus static serving of stored
/// documents and request tracing.
pub fn app_router(ctx: ApiContext, documents_dir: &Path) -> Router {
    api_router(ctx)
        .nest_service("/files", ServeDir::new(documents_dir))
        .layer(TraceLayer::new_for_http())
}
