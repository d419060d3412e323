use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use portal_common::db::is_unique_violation;
use portal_common::events::{
    publish_event, ApplicationSubmittedEvent, APPLICATION_EXCHANGE, APPLICATION_SUBMITTED_KEY,
};
use portal_common::headers::AuthenticatedUser;
use portal_common::pagination::{Page, PageParams};
use portal_common::{AppError, ErrorCode};
use serde::Deserialize;
use tracing::{error, info};

use crate::applications::NewApplication;
use crate::job_client::JobStatusClient;
use crate::models::{ApplicationRequest, ApplicationResponse, ApplicationStatus, StatusUpdateParams};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;

fn already_applied() -> AppError {
    AppError::conflict(ErrorCode::AlreadyApplied, "You have already applied to this job")
}

/// Refuses when the job is not ACTIVE or its status cannot be confirmed.
pub async fn ensure_job_open(jobs: &dyn JobStatusClient, job_id: i64) -> Result<(), AppError> {
    match jobs.is_job_active(job_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::bad_request(
            ErrorCode::CannotApply,
            "Job is not available for applications",
        )),
        Err(e) => {
            error!(job_id, error = %e, "Failed to verify job status");
            Err(AppError::bad_request(
                ErrorCode::CannotApply,
                "Unable to verify job availability. Please try again later.",
            ))
        }
    }
}

/// POST /applications
pub async fn handle_submit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<ApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    let job_id = req.job_id()?;
    ensure_job_open(state.jobs.as_ref(), job_id).await?;

    if state.store.exists(job_id, user.id).await? {
        return Err(already_applied());
    }

    let application = state
        .store
        .insert(NewApplication {
            job_id,
            applicant_id: user.id,
            cover_letter: req.cover_letter.as_deref(),
            resume_url: req.resume_url.as_deref(),
        })
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                already_applied()
            } else {
                AppError::Database(e)
            }
        })?;
    info!(
        application_id = application.id,
        job_id,
        applicant_id = user.id,
        "Application submitted"
    );

    if let Err(e) = state.jobs.increment_application_count(job_id).await {
        error!(job_id, error = %e, "Failed to update job application count");
    }

    let event = ApplicationSubmittedEvent {
        application_id: application.id,
        job_id,
        applicant_id: user.id,
    };
    publish_event(
        state.events.as_ref(),
        APPLICATION_EXCHANGE,
        APPLICATION_SUBMITTED_KEY,
        &event,
    )
    .await;

    Ok((StatusCode::CREATED, Json(application.into())))
}

/// GET /applications/my-applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ApplicationResponse>>, AppError> {
    let page = params.resolve(DEFAULT_PAGE_SIZE, state.max_page_size);
    let (rows, total) = state.store.page_for_applicant(user.id, page).await?;
    Ok(Json(Page::new(rows, page, total).map(ApplicationResponse::from)))
}

/// GET /applications/job/:job_id
pub async fn handle_job_applications(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ApplicationResponse>>, AppError> {
    let page = params.resolve(DEFAULT_PAGE_SIZE, state.max_page_size);
    let (rows, total) = state.store.page_for_job(job_id, page).await?;
    Ok(Json(Page::new(rows, page, total).map(ApplicationResponse::from)))
}

/// PATCH /applications/:application_id/status?status=&rejectionReason=
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(application_id): Path<i64>,
    Query(params): Query<StatusUpdateParams>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let status = ApplicationStatus::parse(&params.status)?;

    let updated = state
        .store
        .update_status(application_id, status, params.rejection_reason.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::ApplicationNotFound, "Application not found")
        })?;

    info!(application_id, status = status.as_str(), "Application status updated");
    Ok(Json(updated.into()))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCheckQuery {
    pub user_id: i64,
    pub job_id: i64,
}

/// POST /internal/applications/batch-check?userId=
pub async fn handle_batch_check(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(job_ids): Json<Vec<i64>>,
) -> Result<Json<BTreeSet<i64>>, AppError> {
    Ok(Json(
        state.store.applied_job_ids(params.user_id, &job_ids).await?,
    ))
}

/// GET /internal/applications/check?userId=&jobId=
pub async fn handle_check(
    State(state): State<AppState>,
    Query(params): Query<AppliedCheckQuery>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(
        state.store.exists(params.job_id, params.user_id).await?,
    ))
}

/// GET /internal/applications/job/:job_id/count
pub async fn handle_count(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<i64>, AppError> {
    Ok(Json(state.store.count_for_job(job_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_client::tests::FakeJobs;

    #[tokio::test]
    async fn test_active_job_is_open() {
        assert!(ensure_job_open(&FakeJobs::with_active(&[4]), 4).await.is_ok());
    }

    #[tokio::test]
    async fn test_inactive_job_cannot_be_applied_to() {
        let err = ensure_job_open(&FakeJobs::with_active(&[4]), 5).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CannotApply);
        assert_eq!(err.to_string(), "Job is not available for applications");
    }

    #[tokio::test]
    async fn test_unverifiable_job_cannot_be_applied_to() {
        let err = ensure_job_open(&FakeJobs::failing(), 4).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Unable to verify job availability. Please try again later."
        );
    }
}
