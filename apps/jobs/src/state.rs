use std::sync::Arc;

use portal_common::events::EventPublisher;
use sqlx::PgPool;

use crate::clients::{AppliedJobsClient, SavedJobsClient};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub events: Arc<dyn EventPublisher>,
    pub saved_jobs: Arc<dyn SavedJobsClient>,
    pub applied_jobs: Arc<dyn AppliedJobsClient>,
    pub max_page_size: i64,
}
