pub mod candidates;
pub mod dashboard;
pub mod documents;
pub mod pools;
pub mod profile;
pub mod verifications;

use portal_common::headers::AuthenticatedUser;
use portal_common::{AppError, ErrorCode};
use crate::models::candidate::CandidateRow;
use crate::models::consultant::ConsultantRow;
use crate::models::pool::PoolRow;
use crate::state::AppState;
use crate::store;

pub(crate) fn consultant_not_found(user_id: i64) -> AppError {
    AppError::not_found(
        ErrorCode::ConsultantNotFound,
        format!("Consultant not found with userId: {user_id}"),
    )
}

/// The consultant profile behind the caller's `X-User-Id`.
pub(crate) async fn current_consultant(
    state: &AppState,
    user: &AuthenticatedUser,
) -> Result<ConsultantRow, AppError> {
    store::consultants::find_by_user_id(&state.db, user.id)
        .await?
        .ok_or_else(|| consultant_not_found(user.id))
}

pub(crate) async fn owned_pool(
    state: &AppState,
    consultant: &ConsultantRow,
    pool_id: i64,
) -> Result<PoolRow, AppError> {
    store::pools::find(&state.db, consultant.id, pool_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                ErrorCode::ResourceNotFound,
                format!("Pool not found with id: {pool_id}"),
            )
        })
}

pub(crate) async fn owned_candidate(
    state: &AppState,
    consultant: &ConsultantRow,
    candidate_id: i64,
) -> Result<CandidateRow, AppError> {
    store::candidates::find(&state.db, consultant.id, candidate_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                ErrorCode::ResourceNotFound,
                format!("Candidate not found with id: {candidate_id}"),
            )
        })
}
