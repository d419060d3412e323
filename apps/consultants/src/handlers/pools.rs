use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use portal_common::db::is_unique_violation;
use portal_common::headers::AuthenticatedUser;
use portal_common::{AppError, ErrorCode};
use serde::Deserialize;
use tracing::info;

use super::{current_consultant, owned_pool};
use crate::models::pool::{
    CreatePoolRequest, PoolMetricsResponse, PoolResponse, UpdatePoolRequest,
};
use crate::models::PoolStatus;
use crate::state::AppState;
use crate::store;
use crate::store::tx::PgConsultantTx;
use crate::workflows;

const DEFAULT_TOP_POOLS: i64 = 5;
const MAX_TOP_POOLS: i64 = 50;

fn duplicate_pool(name: &str) -> AppError {
    AppError::conflict(
        ErrorCode::DuplicateResource,
        format!("Pool with name '{name}' already exists"),
    )
}

fn map_unique(name: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            duplicate_pool(name)
        } else {
            AppError::Database(e)
        }
    }
}

/// POST /api/consultants/pools
pub async fn handle_create_pool(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreatePoolRequest>,
) -> Result<(StatusCode, Json<PoolResponse>), AppError> {
    let new_pool = req.validate()?;
    let consultant = current_consultant(&state, &user).await?;

    if store::pools::name_taken(&state.db, consultant.id, &new_pool.name, None).await? {
        return Err(duplicate_pool(&new_pool.name));
    }
    let pool = store::pools::insert(&state.db, consultant.id, &new_pool)
        .await
        .map_err(map_unique(&new_pool.name))?;
    info!(pool_id = pool.id, consultant_id = consultant.id, "Pool created");

    Ok((StatusCode::CREATED, Json(pool.into())))
}

/// GET /api/consultants/pools
pub async fn handle_list_pools(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<PoolResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let pools = store::pools::list(&state.db, consultant.id).await?;
    Ok(Json(pools.into_iter().map(Into::into).collect()))
}

/// GET /api/consultants/pools/active
pub async fn handle_list_active_pools(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<PoolResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let pools = store::pools::list_by_status(&state.db, consultant.id, PoolStatus::Active).await?;
    Ok(Json(pools.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct TopPoolsQuery {
    pub limit: Option<i64>,
}

/// GET /api/consultants/pools/top
pub async fn handle_top_pools(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TopPoolsQuery>,
) -> Result<Json<Vec<PoolResponse>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_POOLS).clamp(1, MAX_TOP_POOLS);
    let consultant = current_consultant(&state, &user).await?;
    let pools = store::pools::top_by_candidates(&state.db, consultant.id, limit).await?;
    Ok(Json(pools.into_iter().map(Into::into).collect()))
}

/// GET /api/consultants/pools/:pool_id
pub async fn handle_get_pool(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(pool_id): Path<i64>,
) -> Result<Json<PoolResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(Json(owned_pool(&state, &consultant, pool_id).await?.into()))
}

/// PUT /api/consultants/pools/:pool_id
pub async fn handle_update_pool(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(pool_id): Path<i64>,
    Json(req): Json<UpdatePoolRequest>,
) -> Result<Json<PoolResponse>, AppError> {
    let status = req.validate()?;
    let consultant = current_consultant(&state, &user).await?;
    let mut pool = owned_pool(&state, &consultant, pool_id).await?;

    if let Some(name) = req.renamed_to(&pool) {
        if store::pools::name_taken(&state.db, consultant.id, name, Some(pool.id)).await? {
            return Err(duplicate_pool(name));
        }
    }

    req.apply_to(&mut pool, status);
    let saved = store::pools::save(&state.db, &pool)
        .await
        .map_err(map_unique(&pool.name))?;
    info!(pool_id, "Pool updated");
    Ok(Json(saved.into()))
}

/// DELETE /api/consultants/pools/:pool_id
pub async fn handle_delete_pool(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(pool_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let pool = owned_pool(&state, &consultant, pool_id).await?;

    let tx = PgConsultantTx::begin(&state.db).await?;
    workflows::remove_pool(tx, &pool).await?;
    info!(pool_id, consultant_id = consultant.id, "Pool deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/consultants/pools/:pool_id/metrics
pub async fn handle_pool_metrics(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(pool_id): Path<i64>,
) -> Result<Json<PoolMetricsResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(Json(owned_pool(&state, &consultant, pool_id).await?.into()))
}
