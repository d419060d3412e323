use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use portal_common::pagination::{Page, PageParams, PageRequest};
use portal_common::{AppError, ErrorCode};
use serde::Deserialize;
use tracing::{error, info};

use crate::documents::{self, JobSearchResponse, SearchCriteria};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const FEATURED_PAGE_SIZE: i64 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

async fn run_search(
    state: &AppState,
    criteria: SearchCriteria,
    page: PageRequest,
) -> Result<Page<JobSearchResponse>, AppError> {
    info!(?criteria, page = page.page, "Searching jobs");
    let (docs, total) = documents::search(&state.db, &criteria, page)
        .await
        .map_err(|e| {
            error!(error = %e, "Search query failed");
            AppError::server_error(
                ErrorCode::SearchFailed,
                ErrorCode::SearchFailed.default_message(),
            )
        })?;
    Ok(Page::new(docs, page, total).map(JobSearchResponse::from))
}

/// GET /search/jobs
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<JobSearchResponse>>, AppError> {
    let page = PageParams {
        page: params.page,
        size: params.size,
    }
    .resolve(DEFAULT_PAGE_SIZE, state.max_page_size);
    let criteria = SearchCriteria::resolve(
        params.keyword.as_deref(),
        params.category.as_deref(),
        params.location.as_deref(),
    );
    Ok(Json(run_search(&state, criteria, page).await?))
}

/// GET /search/jobs/featured
pub async fn handle_featured(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<JobSearchResponse>>, AppError> {
    let page = params.resolve(FEATURED_PAGE_SIZE, state.max_page_size);
    Ok(Json(run_search(&state, SearchCriteria::Featured, page).await?))
}

/// DELETE /search/jobs/:job_id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if documents::delete(&state.db, job_id).await? {
        info!(job_id, "Job removed from index");
    }
    Ok(StatusCode::NO_CONTENT)
}
