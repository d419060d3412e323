pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/jobs",
            get(handlers::handle_list_jobs).post(handlers::handle_create_job),
        )
        .route("/api/jobs/recommended", get(handlers::handle_recommended_jobs))
        .route("/api/jobs/:job_id/details", get(handlers::handle_job_details))
        .route(
            "/api/jobs/:job_id/increment-applications",
            post(handlers::handle_increment_applications),
        )
        // Service-to-service
        .route("/internal/jobs/:job_id/is-active", get(handlers::handle_is_active))
        .route("/internal/jobs/:job_id/basic-info", get(handlers::handle_basic_info))
        .with_state(state)
}
