use std::sync::Arc;

use crate::pipeline::extraction::DocumentGateway;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiContext {
    pub gateway: Arc<DocumentGateway>,
}

impl ApiContext {
    pub fn new(gateway: Arc<DocumentGateway>) -> Self {
        Self { gateway }
    }
}
