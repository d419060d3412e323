use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use portal_common::headers::AuthenticatedUser;
use portal_common::{AppError, ErrorCode};
use serde::Deserialize;
use tracing::info;

use crate::profiles::{self, UpdateProfileRequest, UserProfileResponse, UserProfileRow};
use crate::saved_jobs;
use crate::state::AppState;

/// GET /users/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfileResponse>, AppError> {
    let profile = profiles::find(&state.db, user.id).await?.ok_or_else(|| {
        AppError::not_found(ErrorCode::UserNotFound, "User profile not found")
    })?;
    Ok(Json(profile.into()))
}

/// PUT /users/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let mut profile = match profiles::find(&state.db, user.id).await? {
        Some(existing) => existing,
        None => {
            info!(user_id = user.id, "Creating profile on first update");
            UserProfileRow::new_for(&user)
        }
    };

    req.apply(&mut profile);
    let saved = profiles::upsert(&state.db, &profile).await?;
    Ok(Json(saved.into()))
}

/// GET /users/saved-jobs
pub async fn handle_list_saved_jobs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<i64>>, AppError> {
    Ok(Json(saved_jobs::all_for_user(&state.db, user.id).await?))
}

/// POST /users/saved-jobs/:job_id
pub async fn handle_save_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    saved_jobs::save(&state.db, user.id, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/saved-jobs/:job_id
pub async fn handle_unsave_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    saved_jobs::unsave(&state.db, user.id, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCheckQuery {
    pub user_id: i64,
    pub job_id: i64,
}

/// POST /internal/saved-jobs/batch-check?userId=
pub async fn handle_batch_check(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(job_ids): Json<Vec<i64>>,
) -> Result<Json<BTreeSet<i64>>, AppError> {
    let saved = saved_jobs::batch_check(&state.db, params.user_id, &job_ids).await?;
    Ok(Json(saved))
}

/// GET /internal/saved-jobs/check?userId=&jobId=
pub async fn handle_check(
    State(state): State<AppState>,
    Query(params): Query<SavedCheckQuery>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(
        saved_jobs::is_saved(&state.db, params.user_id, params.job_id).await?,
    ))
}
