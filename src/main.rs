use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use vitalvault::api::router::app_router;
use vitalvault::api::types::ApiContext;
use vitalvault::config::{self, LlmConfig};
use vitalvault::db;
use vitalvault::pipeline::extraction::{ChatApiClient, DocumentGateway};

// Setup stays synchronous: the gateway's blocking HTTP client must not be
// built on a runtime thread.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let documents_dir = config::documents_dir();
    std::fs::create_dir_all(&documents_dir).expect("Cannot create documents directory");

    // Run migrations up front so the first upload doesn't pay for them
    db::open_database(&config::database_path()).expect("Cannot open database");

    let llm = LlmConfig {
        api_key: std::env::var("VITALVAULT_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty()),
        ..LlmConfig::default()
    };
    if llm.api_key.is_none() {
        tracing::warn!("VITALVAULT_API_KEY not set — uploads will proceed without analysis");
    }

    let gateway = Arc::new(DocumentGateway::new(Box::new(ChatApiClient::new(&llm))));
    let app = app_router(ApiContext::new(gateway), &documents_dir);

    let runtime = tokio::runtime::Runtime::new().expect("Cannot start async runtime");
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(config::DEFAULT_BIND)
            .await
            .expect("Cannot bind server address");
        tracing::info!(addr = config::DEFAULT_BIND, "extraction gateway listening");
        axum::serve(listener, app).await.expect("Server failed");
    });
}
