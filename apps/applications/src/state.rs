use std::sync::Arc;

use portal_common::events::EventPublisher;
use crate::applications::ApplicationStore;
use crate::job_client::JobStatusClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ApplicationStore>,
    pub events: Arc<dyn EventPublisher>,
    pub jobs: Arc<dyn JobStatusClient>,
    pub max_page_size: i64,
}
