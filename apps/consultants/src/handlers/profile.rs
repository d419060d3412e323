use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use portal_common::db::is_unique_violation;
use portal_common::headers::AuthenticatedUser;
use portal_common::{AppError, ErrorCode};
use tracing::info;

use super::{consultant_not_found, current_consultant};
use crate::models::consultant::{
    ConsultantProfileResponse, ConsultantRow, CreateConsultantParams, ProfileUpdate,
    SpecializationsUpdate,
};
use crate::state::AppState;
use crate::store;

fn email_in_use(email: &str) -> AppError {
    AppError::conflict(
        ErrorCode::ConsultantAlreadyExists,
        format!("Consultant with email '{email}' already exists"),
    )
}

/// Validates and saves a profile edit, rejecting an email owned by another consultant.
async fn save_profile(
    state: &AppState,
    mut consultant: ConsultantRow,
    req: ProfileUpdate,
) -> Result<ConsultantProfileResponse, AppError> {
    if let Some(email) = req.email.as_deref() {
        if !email.eq_ignore_ascii_case(&consultant.email)
            && store::consultants::email_taken(&state.db, email, Some(consultant.id)).await?
        {
            return Err(email_in_use(email));
        }
    }

    req.apply_to(&mut consultant);
    let saved = store::consultants::save(&state.db, &consultant)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_in_use(&consultant.email)
            } else {
                AppError::Database(e)
            }
        })?;
    info!(
        consultant_id = saved.id,
        complete = saved.is_profile_complete,
        "Consultant profile updated"
    );
    Ok(saved.into())
}

/// POST /api/consultants
pub async fn handle_create_consultant(
    State(state): State<AppState>,
    Query(params): Query<CreateConsultantParams>,
) -> Result<(StatusCode, Json<ConsultantProfileResponse>), AppError> {
    params.validate()?;

    if store::consultants::exists_for_user(&state.db, params.user_id).await? {
        return Err(AppError::conflict(
            ErrorCode::ConsultantAlreadyExists,
            format!("Consultant profile already exists for userId: {}", params.user_id),
        ));
    }
    if store::consultants::email_taken(&state.db, &params.email, None).await? {
        return Err(email_in_use(params.email.trim()));
    }

    let consultant = store::consultants::insert(&state.db, &params)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(
                    ErrorCode::ConsultantAlreadyExists,
                    ErrorCode::ConsultantAlreadyExists.default_message(),
                )
            } else {
                AppError::Database(e)
            }
        })?;
    info!(consultant_id = consultant.id, user_id = params.user_id, "Consultant profile created");

    Ok((StatusCode::CREATED, Json(consultant.into())))
}

/// GET /api/consultants/profile
pub async fn handle_get_own_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ConsultantProfileResponse>, AppError> {
    Ok(Json(current_consultant(&state, &user).await?.into()))
}

/// PUT /api/consultants/profile
pub async fn handle_update_own_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<ConsultantProfileResponse>, AppError> {
    req.validate()?;
    let consultant = current_consultant(&state, &user).await?;
    Ok(Json(save_profile(&state, consultant, req).await?))
}

async fn consultant_by_id(state: &AppState, consultant_id: i64) -> Result<ConsultantRow, AppError> {
    store::consultants::find_by_id(&state.db, consultant_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                ErrorCode::ConsultantNotFound,
                format!("Consultant not found with id: {consultant_id}"),
            )
        })
}

/// GET /api/consultants/:consultant_id/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(consultant_id): Path<i64>,
) -> Result<Json<ConsultantProfileResponse>, AppError> {
    Ok(Json(consultant_by_id(&state, consultant_id).await?.into()))
}

/// PUT /api/consultants/:consultant_id/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(consultant_id): Path<i64>,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<ConsultantProfileResponse>, AppError> {
    req.validate()?;
    let consultant = consultant_by_id(&state, consultant_id).await?;
    Ok(Json(save_profile(&state, consultant, req).await?))
}

/// PUT /api/consultants/profile/specializations
pub async fn handle_update_specializations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<SpecializationsUpdate>,
) -> Result<Json<ConsultantProfileResponse>, AppError> {
    req.validate()?;
    let mut consultant = current_consultant(&state, &user).await?;
    req.apply_to(&mut consultant);
    let saved = store::consultants::save(&state.db, &consultant).await?;
    info!(consultant_id = saved.id, "Specializations updated");
    Ok(Json(saved.into()))
}

/// GET /api/consultants/profile/completeness
pub async fn handle_profile_completeness(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<i32>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(Json(consultant.completeness_percentage()))
}

/// GET /api/consultants/user/:user_id/exists
pub async fn handle_consultant_exists(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(store::consultants::exists_for_user(&state.db, user_id).await?))
}

/// GET /api/consultants/user/:user_id
pub async fn handle_get_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ConsultantProfileResponse>, AppError> {
    let consultant = store::consultants::find_by_user_id(&state.db, user_id)
        .await?
        .ok_or_else(|| consultant_not_found(user_id))?;
    Ok(Json(consultant.into()))
}
