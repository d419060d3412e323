pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers::{candidates, dashboard, documents, pools, profile, verifications};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .merge(profile_routes())
        .merge(pool_routes())
        .merge(candidate_routes())
        .merge(verification_routes())
        .merge(document_routes())
        .merge(dashboard_routes())
        .with_state(state)
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/consultants", post(profile::handle_create_consultant))
        .route(
            "/api/consultants/profile",
            get(profile::handle_get_own_profile).put(profile::handle_update_own_profile),
        )
        .route(
            "/api/consultants/profile/specializations",
            put(profile::handle_update_specializations),
        )
        .route(
            "/api/consultants/profile/completeness",
            get(profile::handle_profile_completeness),
        )
        .route(
            "/api/consultants/:consultant_id/profile",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        .route(
            "/api/consultants/user/:user_id/exists",
            get(profile::handle_consultant_exists),
        )
        .route("/api/consultants/user/:user_id", get(profile::handle_get_by_user))
}

fn pool_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/consultants/pools",
            get(pools::handle_list_pools).post(pools::handle_create_pool),
        )
        .route("/api/consultants/pools/active", get(pools::handle_list_active_pools))
        .route("/api/consultants/pools/top", get(pools::handle_top_pools))
        .route(
            "/api/consultants/pools/:pool_id",
            get(pools::handle_get_pool)
                .put(pools::handle_update_pool)
                .delete(pools::handle_delete_pool),
        )
        .route(
            "/api/consultants/pools/:pool_id/metrics",
            get(pools::handle_pool_metrics),
        )
}

fn candidate_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/consultants/pools/:pool_id/candidates",
            get(candidates::handle_list_pool_candidates).post(candidates::handle_add_candidate),
        )
        .route(
            "/api/consultants/pools/:pool_id/candidates/availability/:availability",
            get(candidates::handle_list_pool_candidates_by_availability),
        )
        .route(
            "/api/consultants/pools/:pool_id/candidates/search",
            get(candidates::handle_search_pool_candidates),
        )
        .route("/api/consultants/candidates", get(candidates::handle_list_candidates))
        .route(
            "/api/consultants/candidates/recent",
            get(candidates::handle_recent_candidates),
        )
        .route(
            "/api/consultants/candidates/availability/:availability",
            get(candidates::handle_list_candidates_by_availability),
        )
        .route(
            "/api/consultants/candidates/:candidate_id",
            get(candidates::handle_get_candidate)
                .put(candidates::handle_update_candidate)
                .delete(candidates::handle_delete_candidate),
        )
        .route(
            "/api/consultants/candidates/:candidate_id/availability",
            patch(candidates::handle_update_availability),
        )
        .route(
            "/api/consultants/candidates/:candidate_id/deploy",
            post(candidates::handle_deploy_candidate),
        )
}

fn verification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/consultants/candidates/:candidate_id/verification",
            post(verifications::handle_initiate_verification)
                .get(verifications::handle_get_verification)
                .put(verifications::handle_update_verification),
        )
        .route(
            "/api/consultants/candidates/:candidate_id/verification/reject",
            post(verifications::handle_reject_verification),
        )
        .route(
            "/api/consultants/verifications/pending",
            get(verifications::handle_pending_verifications),
        )
        .route(
            "/api/consultants/verifications/status/:status",
            get(verifications::handle_verifications_by_status),
        )
        .route(
            "/api/consultants/verifications/police-required",
            get(verifications::handle_police_required),
        )
        .route(
            "/api/consultants/verifications/health-check-required",
            get(verifications::handle_health_check_required),
        )
        .route(
            "/api/consultants/verifications/statistics",
            get(verifications::handle_verification_statistics),
        )
}

fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/consultants/documents",
            get(documents::handle_list_documents).post(documents::handle_upload_document),
        )
        .route(
            "/api/consultants/documents/pending",
            get(documents::handle_pending_documents),
        )
        .route(
            "/api/consultants/documents/verified",
            get(documents::handle_verified_documents),
        )
        .route(
            "/api/consultants/documents/type/:document_type",
            get(documents::handle_documents_by_type),
        )
        .route(
            "/api/consultants/documents/status/:status",
            get(documents::handle_documents_by_status),
        )
        .route(
            "/api/consultants/documents/:document_id",
            get(documents::handle_get_document).delete(documents::handle_delete_document),
        )
        .route(
            "/api/consultants/documents/:document_id/status",
            patch(documents::handle_update_document_status),
        )
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/consultants/dashboard", get(dashboard::handle_dashboard))
        .route("/api/consultants/dashboard/overview", get(dashboard::handle_overview))
        .route("/api/consultants/dashboard/workforce", get(dashboard::handle_workforce))
        .route(
            "/api/consultants/dashboard/pool-performance",
            get(dashboard::handle_pool_performance),
        )
        .route(
            "/api/consultants/dashboard/verification-progress",
            get(dashboard::handle_verification_progress),
        )
        .route(
            "/api/consultants/dashboard/recent-activity",
            get(dashboard::handle_recent_activity),
        )
        .route("/api/consultants/dashboard/commission", get(dashboard::handle_commission))
        .route("/api/consultants/dashboard/performance", get(dashboard::handle_performance))
}
