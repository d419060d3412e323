use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use portal_common::headers::AuthenticatedUser;
use portal_common::{AppError, ErrorCode};
use tracing::info;

use super::{current_consultant, owned_candidate, owned_pool};
use crate::models::candidate::{
    AvailabilityParams, CandidateRequest, CandidateResponse, CandidateRow, DeployParams,
    SearchParams,
};
use crate::models::{parse_param, CandidateAvailability};
use crate::state::AppState;
use crate::store;
use crate::store::tx::PgConsultantTx;
use crate::workflows;

const RECENT_WINDOW_DAYS: i64 = 30;
const RECENT_LIMIT: i64 = 10;

/// Global phone/email uniqueness. `except` is the candidate being edited.
async fn ensure_contact_unique(
    state: &AppState,
    req: &CandidateRequest,
    except: Option<i64>,
) -> Result<(), AppError> {
    if let Some(phone) = req.phone_number.as_deref() {
        if store::candidates::phone_taken(&state.db, phone, except).await? {
            return Err(AppError::conflict(
                ErrorCode::DuplicateResource,
                format!("Candidate with phone number '{phone}' already exists"),
            ));
        }
    }
    if let Some(email) = req.email.as_deref() {
        if store::candidates::email_taken(&state.db, email, except).await? {
            return Err(AppError::conflict(
                ErrorCode::DuplicateResource,
                format!("Candidate with email '{email}' already exists"),
            ));
        }
    }
    Ok(())
}

fn to_responses(rows: Vec<CandidateRow>) -> Json<Vec<CandidateResponse>> {
    Json(rows.into_iter().map(Into::into).collect())
}

/// Saves an edited candidate and recounts its pool in one transaction.
async fn save_and_reload(
    state: &AppState,
    consultant_id: i64,
    row: &CandidateRow,
) -> Result<CandidateResponse, AppError> {
    let tx = PgConsultantTx::begin(&state.db).await?;
    Ok(workflows::save_candidate(tx, consultant_id, row).await?.into())
}

// ──────────────────────────────────────────────
// Pool-scoped
// ──────────────────────────────────────────────

/// POST /api/consultants/pools/:pool_id/candidates
pub async fn handle_add_candidate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(pool_id): Path<i64>,
    Json(req): Json<CandidateRequest>,
) -> Result<(StatusCode, Json<CandidateResponse>), AppError> {
    let choices = req.validate(true)?;
    let consultant = current_consultant(&state, &user).await?;
    let pool = owned_pool(&state, &consultant, pool_id).await?;
    ensure_contact_unique(&state, &req, None).await?;

    let tx = PgConsultantTx::begin(&state.db).await?;
    let candidate =
        workflows::add_candidate(tx, consultant.id, pool.id, &req, choices, Utc::now()).await?;
    info!(candidate_id = candidate.id, pool_id, "Candidate added");

    Ok((StatusCode::CREATED, Json(candidate.into())))
}

/// GET /api/consultants/pools/:pool_id/candidates
pub async fn handle_list_pool_candidates(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(pool_id): Path<i64>,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let pool = owned_pool(&state, &consultant, pool_id).await?;
    Ok(to_responses(store::candidates::list_by_pool(&state.db, pool.id).await?))
}

/// GET /api/consultants/pools/:pool_id/candidates/availability/:availability
pub async fn handle_list_pool_candidates_by_availability(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((pool_id, availability)): Path<(i64, String)>,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let availability = parse_param(&availability, "availability", CandidateAvailability::parse)?;
    let consultant = current_consultant(&state, &user).await?;
    let pool = owned_pool(&state, &consultant, pool_id).await?;
    let rows = store::candidates::list_by_pool_and_availability(&state.db, pool.id, availability).await?;
    Ok(to_responses(rows))
}

/// GET /api/consultants/pools/:pool_id/candidates/search
pub async fn handle_search_pool_candidates(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(pool_id): Path<i64>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let pool = owned_pool(&state, &consultant, pool_id).await?;
    let rows = store::candidates::search_in_pool(&state.db, pool.id, &params.search_term).await?;
    Ok(to_responses(rows))
}

// ──────────────────────────────────────────────
// Across all of the consultant's pools
// ──────────────────────────────────────────────

/// GET /api/consultants/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(to_responses(store::candidates::list(&state.db, consultant.id).await?))
}

/// GET /api/consultants/candidates/availability/:availability
pub async fn handle_list_candidates_by_availability(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(availability): Path<String>,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let availability = parse_param(&availability, "availability", CandidateAvailability::parse)?;
    let consultant = current_consultant(&state, &user).await?;
    let rows = store::candidates::list_by_availability(&state.db, consultant.id, availability).await?;
    Ok(to_responses(rows))
}

/// GET /api/consultants/candidates/recent
pub async fn handle_recent_candidates(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    let rows = store::candidates::recent(&state.db, consultant.id, since, RECENT_LIMIT).await?;
    Ok(to_responses(rows))
}

/// GET /api/consultants/candidates/:candidate_id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
) -> Result<Json<CandidateResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(Json(owned_candidate(&state, &consultant, candidate_id).await?.into()))
}

/// PUT /api/consultants/candidates/:candidate_id
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
    Json(req): Json<CandidateRequest>,
) -> Result<Json<CandidateResponse>, AppError> {
    let choices = req.validate(false)?;
    let consultant = current_consultant(&state, &user).await?;
    let mut candidate = owned_candidate(&state, &consultant, candidate_id).await?;
    ensure_contact_unique(&state, &req, Some(candidate.id)).await?;

    req.apply_to(&mut candidate, choices, Utc::now());
    let saved = save_and_reload(&state, consultant.id, &candidate).await?;
    info!(candidate_id, "Candidate updated");
    Ok(Json(saved))
}

/// PATCH /api/consultants/candidates/:candidate_id/availability
pub async fn handle_update_availability(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<CandidateResponse>, AppError> {
    let availability = parse_param(&params.availability, "availability", CandidateAvailability::parse)?;
    let consultant = current_consultant(&state, &user).await?;
    let mut candidate = owned_candidate(&state, &consultant, candidate_id).await?;

    candidate.set_availability(availability, Utc::now());
    let saved = save_and_reload(&state, consultant.id, &candidate).await?;
    info!(candidate_id, availability = availability.as_str(), "Candidate availability changed");
    Ok(Json(saved))
}

/// POST /api/consultants/candidates/:candidate_id/deploy
pub async fn handle_deploy_candidate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
    Query(params): Query<DeployParams>,
) -> Result<Json<CandidateResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let mut candidate = owned_candidate(&state, &consultant, candidate_id).await?;

    candidate.deploy(params.job_id, params.employer_id, Utc::now())?;
    let saved = save_and_reload(&state, consultant.id, &candidate).await?;
    info!(
        candidate_id,
        job_id = params.job_id,
        employer_id = params.employer_id,
        "Candidate deployed"
    );
    Ok(Json(saved))
}

/// DELETE /api/consultants/candidates/:candidate_id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(candidate_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let candidate = owned_candidate(&state, &consultant, candidate_id).await?;

    let tx = PgConsultantTx::begin(&state.db).await?;
    workflows::remove_candidate(tx, &candidate).await?;
    info!(candidate_id, pool_id = candidate.pool_id, "Candidate deleted");
    Ok(StatusCode::NO_CONTENT)
}
