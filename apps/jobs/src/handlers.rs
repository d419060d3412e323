use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use portal_common::events::{publish_event, JobPostedEvent, JOB_EXCHANGE, JOB_POSTED_KEY};
use portal_common::headers::{AuthenticatedUser, MaybeUser};
use portal_common::pagination::{Page, PageParams, PageRequest};
use portal_common::{AppError, ErrorCode};
use tracing::{debug, error, info};

use crate::clients::{applied_ids_or_empty, saved_ids_or_empty};
use crate::filter::JobFilter;
use crate::jobs;
use crate::models::{
    JobBasicInfo, JobCardResponse, JobDetailResponse, JobListParams, JobListResponse, JobRequest,
    JobStatus,
};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const RECOMMENDED_PAGE_SIZE: i64 = 10;

fn job_not_found(job_id: i64) -> AppError {
    AppError::not_found(
        ErrorCode::JobNotFound,
        format!("Job not found with id: {job_id}"),
    )
}

/// Fetches one page and overlays the caller's saved/applied flags.
async fn list_page(
    state: &AppState,
    user_id: Option<i64>,
    filter: &JobFilter,
    page: PageRequest,
) -> Result<Page<JobListResponse>, AppError> {
    let (rows, total) = jobs::find_page(&state.db, filter, page).await?;
    info!(total, page = page.page, size = page.size, "Jobs fetched");

    let job_ids: Vec<i64> = rows.iter().map(|job| job.id).collect();
    let (saved, applied) = tokio::join!(
        saved_ids_or_empty(state.saved_jobs.as_ref(), user_id, &job_ids),
        applied_ids_or_empty(state.applied_jobs.as_ref(), user_id, &job_ids),
    );

    let content = rows
        .into_iter()
        .map(|job| JobListResponse::new(job, &saved, &applied))
        .collect();
    Ok(Page::new(content, page, total))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<JobRequest>,
) -> Result<(StatusCode, Json<JobCardResponse>), AppError> {
    let new_job = req.into_new_job()?;
    let job = jobs::insert(&state.db, user.id, &new_job).await?;
    info!(job_id = job.id, employer_id = user.id, "Job created");

    let event = JobPostedEvent {
        job_id: job.id,
        title: job.title.clone(),
        company: job.company.clone(),
        location: job.location.clone(),
        category: job.category.clone(),
    };
    publish_event(state.events.as_ref(), JOB_EXCHANGE, JOB_POSTED_KEY, &event).await;

    Ok((StatusCode::CREATED, Json(JobCardResponse::from(&job))))
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Query(params): Query<JobListParams>,
) -> Result<Json<Page<JobListResponse>>, AppError> {
    let page = PageParams {
        page: params.page,
        size: params.size,
    }
    .resolve(DEFAULT_PAGE_SIZE, state.max_page_size);
    let filter = JobFilter::from(&params);
    debug!(?filter, ?user_id, "Listing jobs");

    Ok(Json(list_page(&state, user_id, &filter, page).await?))
}

/// GET /api/jobs/recommended
pub async fn handle_recommended_jobs(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<JobListResponse>>, AppError> {
    let page = params.resolve(RECOMMENDED_PAGE_SIZE, state.max_page_size);
    Ok(Json(
        list_page(&state, user_id, &JobFilter::default(), page).await?,
    ))
}

/// GET /api/jobs/:job_id/details
pub async fn handle_job_details(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Path(job_id): Path<i64>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = jobs::find_by_id(&state.db, job_id)
        .await?
        .ok_or_else(|| job_not_found(job_id))?;

    let ids = [job_id];
    let (saved, applied) = tokio::join!(
        saved_ids_or_empty(state.saved_jobs.as_ref(), user_id, &ids),
        applied_ids_or_empty(state.applied_jobs.as_ref(), user_id, &ids),
    );

    // View tracking must not hold up or fail the response.
    let db = state.db.clone();
    tokio::spawn(async move {
        if let Err(e) = jobs::increment_view_count(&db, job_id).await {
            error!(job_id, error = %e, "Failed to increment view count");
        }
    });

    Ok(Json(JobDetailResponse::new(
        job,
        saved.contains(&job_id),
        applied.contains(&job_id),
    )))
}

/// POST /api/jobs/:job_id/increment-applications
pub async fn handle_increment_applications(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !jobs::increment_applications(&state.db, job_id).await? {
        return Err(job_not_found(job_id));
    }
    debug!(job_id, "Application count incremented");
    Ok(StatusCode::OK)
}

/// GET /internal/jobs/:job_id/is-active
pub async fn handle_is_active(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<bool>, AppError> {
    let status = jobs::status_of(&state.db, job_id).await?;
    Ok(Json(status.as_deref() == Some(JobStatus::Active.as_str())))
}

/// GET /internal/jobs/:job_id/basic-info
pub async fn handle_basic_info(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<JobBasicInfo>, AppError> {
    let job = jobs::find_by_id(&state.db, job_id)
        .await?
        .ok_or_else(|| job_not_found(job_id))?;
    Ok(Json(JobBasicInfo {
        job_id: job.id,
        status: job.status,
        application_deadline: job.expires_at,
    }))
}
