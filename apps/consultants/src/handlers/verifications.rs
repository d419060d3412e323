use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use portal_common::headers::AuthenticatedUser;
use portal_common::{AppError, ErrorCode};
use tracing::info;

use super::{current_consultant, owned_candidate};
use crate::models::verification::{
    verifier_or_default, RejectParams, VerificationResponse, VerificationRow, VerificationStats,
    VerificationUpdate, VerifierParams,
};
use crate::models::{parse_param, VerificationStatus};
use crate::state::AppState;
use crate::store;
use crate::store::tx::PgConsultantTx;
use crate::workflows;

fn verification_not_found(candidate_id: i64) -> AppError {
    AppError::not_found(
        ErrorCode::ResourceNotFound,
        format!("Verification not found for candidate id: {candidate_id}"),
    )
}

async fn load(state: &AppState, consultant_id: i64, candidate_id: i64) -> Result<VerificationRow, AppError> {
    store::verifications::find_by_candidate(&state.db, consultant_id, candidate_id)
        .await?
        .ok_or_else(|| verification_not_found(candidate_id))
}

fn to_responses(rows: Vec<VerificationRow>) -> Json<Vec<VerificationResponse>> {
    Json(rows.into_iter().map(Into::into).collect())
}

/// POST /api/consultants/candidates/:candidate_id/verification
pub async fn handle_initiate_verification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
) -> Result<(StatusCode, Json<VerificationResponse>), AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let candidate = owned_candidate(&state, &consultant, candidate_id).await?;
    if store::verifications::exists_for(&state.db, candidate.id).await? {
        return Err(AppError::conflict(
            ErrorCode::DuplicateResource,
            "Verification already exists for this candidate",
        ));
    }

    let verification_id = store::verifications::insert(&state.db, candidate.id).await?;
    info!(verification_id, candidate_id, "Verification initiated");

    let verification = load(&state, consultant.id, candidate.id).await?;
    Ok((StatusCode::CREATED, Json(verification.into())))
}

/// GET /api/consultants/candidates/:candidate_id/verification
pub async fn handle_get_verification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
) -> Result<Json<VerificationResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(Json(load(&state, consultant.id, candidate_id).await?.into()))
}

/// PUT /api/consultants/candidates/:candidate_id/verification
pub async fn handle_update_verification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
    Query(params): Query<VerifierParams>,
    Json(req): Json<VerificationUpdate>,
) -> Result<Json<VerificationResponse>, AppError> {
    let status = req.validate()?;
    let consultant = current_consultant(&state, &user).await?;
    let verification = load(&state, consultant.id, candidate_id).await?;
    let verifier = verifier_or_default(params.verified_by.as_deref());

    let tx = PgConsultantTx::begin(&state.db).await?;
    let verification =
        workflows::update_verification(tx, verification, req, status, verifier, Utc::now()).await?;
    info!(
        candidate_id,
        status = %verification.status,
        progress = verification.progress(),
        "Verification updated"
    );
    Ok(Json(verification.into()))
}

/// POST /api/consultants/candidates/:candidate_id/verification/reject
pub async fn handle_reject_verification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
    Query(params): Query<RejectParams>,
) -> Result<Json<VerificationResponse>, AppError> {
    let reason = params.rejection_reason.trim();
    if reason.is_empty() {
        return Err(AppError::bad_request(
            ErrorCode::BadRequest,
            "Rejection reason is required",
        ));
    }
    let consultant = current_consultant(&state, &user).await?;
    let verification = load(&state, consultant.id, candidate_id).await?;
    let rejected_by = verifier_or_default(params.rejected_by.as_deref());

    let tx = PgConsultantTx::begin(&state.db).await?;
    let verification = workflows::reject_verification(tx, verification, reason, rejected_by).await?;
    info!(candidate_id, "Verification rejected");
    Ok(Json(verification.into()))
}

/// GET /api/consultants/verifications/pending
pub async fn handle_pending_verifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<VerificationResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let rows = store::verifications::list_by_statuses(
        &state.db,
        consultant.id,
        &[VerificationStatus::New, VerificationStatus::UnderVerification],
    )
    .await?;
    Ok(to_responses(rows))
}

/// GET /api/consultants/verifications/status/:status
pub async fn handle_verifications_by_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(status): Path<String>,
) -> Result<Json<Vec<VerificationResponse>>, AppError> {
    let status = parse_param(&status, "verification status", VerificationStatus::parse)?;
    let consultant = current_consultant(&state, &user).await?;
    let rows = store::verifications::list_by_statuses(&state.db, consultant.id, &[status]).await?;
    Ok(to_responses(rows))
}

/// GET /api/consultants/verifications/police-required
pub async fn handle_police_required(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<VerificationResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(to_responses(
        store::verifications::police_required(&state.db, consultant.id).await?,
    ))
}

/// GET /api/consultants/verifications/health-check-required
pub async fn handle_health_check_required(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<VerificationResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(to_responses(
        store::verifications::health_check_required(&state.db, consultant.id).await?,
    ))
}

/// GET /api/consultants/verifications/statistics
pub async fn handle_verification_statistics(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<VerificationStats>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(Json(store::verifications::statistics(&state.db, consultant.id).await?))
}
