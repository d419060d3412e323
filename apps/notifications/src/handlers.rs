use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use portal_common::headers::AuthenticatedUser;
use portal_common::pagination::{Page, PageParams};
use portal_common::validation::ValidationErrors;
use portal_common::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};

use crate::models::{NotificationResponse, NotificationStatus};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;

/// GET /notifications
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<NotificationResponse>>, AppError> {
    let page = params.resolve(DEFAULT_PAGE_SIZE, state.max_page_size);
    let (rows, total) = state.notifier.store().page_for_user(user.id, page).await?;
    Ok(Json(Page::new(rows, page, total).map(NotificationResponse::from)))
}

/// PATCH /notifications/:notification_id/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<NotificationResponse>, AppError> {
    let row = state
        .notifier
        .store()
        .mark_read(notification_id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::ResourceNotFound, "Notification not found"))?;
    Ok(Json(row.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub related_entity_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailResult {
    pub status: NotificationStatus,
}

/// POST /internal/notifications/email
pub async fn handle_send_email(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<(StatusCode, Json<EmailResult>), AppError> {
    let mut v = ValidationErrors::new();
    if req.user_id.is_none() {
        v.add("userId", "User ID is required", None);
    }
    v.required("email", req.email.as_deref(), "Email is required");
    v.required("title", req.title.as_deref(), "Title is required");
    v.required("message", req.message.as_deref(), "Message is required");
    v.into_result()?;

    let status = state
        .notifier
        .send_email(
            req.user_id.unwrap_or_default(),
            req.email.as_deref().unwrap_or_default().trim(),
            req.title.as_deref().unwrap_or_default(),
            req.message.as_deref().unwrap_or_default(),
            req.related_entity_id,
        )
        .await?;
    Ok((StatusCode::ACCEPTED, Json(EmailResult { status })))
}
