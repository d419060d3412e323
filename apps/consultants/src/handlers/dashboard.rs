use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use portal_common::headers::AuthenticatedUser;
use portal_common::AppError;
use tracing::debug;

use super::current_consultant;
use crate::models::dashboard::{
    CommissionSummaryResponse, ConsultantPerformanceResponse, DashboardOverviewResponse,
    DashboardResponse, PoolPerformanceResponse, RecentActivityResponse,
    VerificationProgressResponse, WorkforceMetricsResponse,
};
use crate::models::pool::{PoolRow, PoolSummaryResponse};
use crate::state::AppState;
use crate::store;

const TOP_POOLS: i64 = 5;
const RECENT_CANDIDATES: i64 = 10;
const RECENT_POOLS: i64 = 5;
const RECENT_WINDOW_DAYS: i64 = 30;
const ONBOARDED_ON_HOME: i64 = 5;

fn summaries(rows: Vec<PoolRow>) -> Vec<PoolSummaryResponse> {
    rows.into_iter().map(Into::into).collect()
}

/// GET /api/consultants/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let (pools, workforce, onboarded) = tokio::try_join!(
        store::pools::overview_stats(&state.db, consultant.id),
        store::candidates::workforce_stats(&state.db, consultant.id),
        store::candidates::recently_onboarded(&state.db, consultant.id, ONBOARDED_ON_HOME),
    )?;
    debug!(consultant_id = consultant.id, ?pools, ?workforce, "Dashboard aggregated");
    Ok(Json(DashboardResponse::new(&consultant, &pools, &workforce, onboarded)))
}

/// GET /api/consultants/dashboard/overview
pub async fn handle_overview(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<DashboardOverviewResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let (pools, workforce, verifications) = tokio::try_join!(
        store::pools::overview_stats(&state.db, consultant.id),
        store::candidates::workforce_stats(&state.db, consultant.id),
        store::verifications::statistics(&state.db, consultant.id),
    )?;
    Ok(Json(DashboardOverviewResponse::new(&pools, &workforce, &verifications)))
}

/// GET /api/consultants/dashboard/workforce
pub async fn handle_workforce(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<WorkforceMetricsResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let workforce = store::candidates::workforce_stats(&state.db, consultant.id).await?;
    Ok(Json(WorkforceMetricsResponse::from(&workforce)))
}

/// GET /api/consultants/dashboard/pool-performance
pub async fn handle_pool_performance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<PoolPerformanceResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let (stats, top) = tokio::try_join!(
        store::pools::overview_stats(&state.db, consultant.id),
        store::pools::top_by_candidates(&state.db, consultant.id, TOP_POOLS),
    )?;
    Ok(Json(PoolPerformanceResponse::new(&stats, summaries(top))))
}

/// GET /api/consultants/dashboard/verification-progress
pub async fn handle_verification_progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<VerificationProgressResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let stats = store::verifications::statistics(&state.db, consultant.id).await?;
    Ok(Json(VerificationProgressResponse::from(&stats)))
}

/// GET /api/consultants/dashboard/recent-activity
pub async fn handle_recent_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<RecentActivityResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    let (candidates, pools, verifications) = tokio::try_join!(
        store::candidates::recent(&state.db, consultant.id, since, RECENT_CANDIDATES),
        store::pools::recent(&state.db, consultant.id, RECENT_POOLS),
        store::verifications::statistics(&state.db, consultant.id),
    )?;
    Ok(Json(RecentActivityResponse {
        recent_candidates: candidates.into_iter().map(Into::into).collect(),
        recent_pools: summaries(pools),
        pending_verifications_count: verifications.open(),
    }))
}

/// GET /api/consultants/dashboard/commission
pub async fn handle_commission(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CommissionSummaryResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let (stats, top) = tokio::try_join!(
        store::pools::overview_stats(&state.db, consultant.id),
        store::pools::top_by_commission(&state.db, consultant.id, TOP_POOLS),
    )?;
    Ok(Json(CommissionSummaryResponse {
        total_commission_earned: stats.total_commission,
        total_pools: stats.total_pools,
        top_earning_pools: summaries(top),
    }))
}

/// GET /api/consultants/dashboard/performance
pub async fn handle_performance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ConsultantPerformanceResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let (pools, workforce, verifications) = tokio::try_join!(
        store::pools::overview_stats(&state.db, consultant.id),
        store::candidates::workforce_stats(&state.db, consultant.id),
        store::verifications::statistics(&state.db, consultant.id),
    )?;
    let overview = DashboardOverviewResponse::new(&pools, &workforce, &verifications);
    Ok(Json(ConsultantPerformanceResponse::new(&consultant, &overview)))
}
