use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use portal_common::db::is_unique_violation;
use portal_common::headers::AuthenticatedUser;
use portal_common::{AppError, ErrorCode};
use tracing::info;

use super::current_consultant;
use crate::models::consultant::ConsultantRow;
use crate::models::document::{
    DocumentResponse, DocumentRow, DocumentStatusParams, DocumentUploadRequest,
};
use crate::models::{parse_param, DocumentStatus, DocumentType};
use crate::state::AppState;
use crate::store;
use crate::store::tx::PgConsultantTx;
use crate::workflows;

fn duplicate_type(document_type: DocumentType) -> AppError {
    AppError::conflict(
        ErrorCode::DuplicateResource,
        format!(
            "Document type {} already exists. Please update or delete the existing document.",
            document_type.as_str()
        ),
    )
}

/// 404 when the document is missing, 403 when it is someone else's.
async fn owned_document(
    state: &AppState,
    consultant: &ConsultantRow,
    document_id: i64,
) -> Result<DocumentRow, AppError> {
    let document = store::documents::find_by_id(&state.db, document_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                ErrorCode::ResourceNotFound,
                format!("Document not found with id: {document_id}"),
            )
        })?;
    if document.consultant_id != consultant.id {
        return Err(AppError::forbidden(
            ErrorCode::Unauthorized,
            "Document does not belong to this consultant",
        ));
    }
    Ok(document)
}

fn to_responses(rows: Vec<DocumentRow>) -> Json<Vec<DocumentResponse>> {
    Json(rows.into_iter().map(Into::into).collect())
}

async fn list_with_status(
    state: &AppState,
    user: &AuthenticatedUser,
    status: DocumentStatus,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let consultant = current_consultant(state, user).await?;
    Ok(to_responses(
        store::documents::list_by_status(&state.db, consultant.id, status).await?,
    ))
}

/// POST /api/consultants/documents
pub async fn handle_upload_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<DocumentUploadRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let doc = req.validate()?;
    let consultant = current_consultant(&state, &user).await?;

    if store::documents::type_exists(&state.db, consultant.id, doc.document_type).await? {
        return Err(duplicate_type(doc.document_type));
    }
    let document = store::documents::insert(&state.db, consultant.id, &doc)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_type(doc.document_type)
            } else {
                AppError::Database(e)
            }
        })?;
    info!(
        document_id = document.id,
        consultant_id = consultant.id,
        document_type = doc.document_type.as_str(),
        "Document uploaded"
    );

    Ok((StatusCode::CREATED, Json(document.into())))
}

/// GET /api/consultants/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(to_responses(store::documents::list(&state.db, consultant.id).await?))
}

/// GET /api/consultants/documents/pending
pub async fn handle_pending_documents(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    list_with_status(&state, &user, DocumentStatus::Pending).await
}

/// GET /api/consultants/documents/verified
pub async fn handle_verified_documents(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    list_with_status(&state, &user, DocumentStatus::Verified).await
}

/// GET /api/consultants/documents/status/:status
pub async fn handle_documents_by_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(status): Path<String>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let status = parse_param(&status, "document status", DocumentStatus::parse)?;
    list_with_status(&state, &user, status).await
}

/// GET /api/consultants/documents/type/:document_type
pub async fn handle_documents_by_type(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(document_type): Path<String>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let document_type = parse_param(&document_type, "document type", DocumentType::parse)?;
    let consultant = current_consultant(&state, &user).await?;
    Ok(to_responses(
        store::documents::list_by_type(&state.db, consultant.id, document_type).await?,
    ))
}

/// GET /api/consultants/documents/:document_id
pub async fn handle_get_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(document_id): Path<i64>,
) -> Result<Json<DocumentResponse>, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    Ok(Json(owned_document(&state, &consultant, document_id).await?.into()))
}

/// DELETE /api/consultants/documents/:document_id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(document_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let consultant = current_consultant(&state, &user).await?;
    let document = owned_document(&state, &consultant, document_id).await?;

    store::documents::delete(&state.db, document.id).await?;
    info!(document_id, consultant_id = consultant.id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/consultants/documents/:document_id/status
pub async fn handle_update_document_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(document_id): Path<i64>,
    Query(params): Query<DocumentStatusParams>,
) -> Result<Json<DocumentResponse>, AppError> {
    let status = parse_param(&params.status, "document status", DocumentStatus::parse)?;
    let consultant = current_consultant(&state, &user).await?;
    let document = owned_document(&state, &consultant, document_id).await?;

    let tx = PgConsultantTx::begin(&state.db).await?;
    let saved = workflows::review_document(
        tx,
        &consultant,
        document,
        status,
        params.rejection_reason,
        params.verified_by,
        Utc::now(),
    )
    .await?;
    info!(document_id, status = status.as_str(), "Document status updated");

    Ok(Json(saved.into()))
}
