use sqlx::{PgExecutor, PgPool};

use crate::models::document::{DocumentRow, NewDocument};
use crate::models::{DocumentStatus, DocumentType};

pub async fn insert(pool: &PgPool, consultant_id: i64, doc: &NewDocument) -> Result<DocumentRow, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        INSERT INTO consultant_documents
            (consultant_id, document_type, document_name, document_url, document_number, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(consultant_id)
    .bind(doc.document_type.as_str())
    .bind(&doc.document_name)
    .bind(&doc.document_url)
    .bind(&doc.document_number)
    .bind(DocumentStatus::Pending.as_str())
    .fetch_one(pool)
    .await
}

pub async fn type_exists(pool: &PgPool, consultant_id: i64, document_type: DocumentType) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM consultant_documents WHERE consultant_id = $1 AND document_type = $2)",
    )
    .bind(consultant_id)
    .bind(document_type.as_str())
    .fetch_one(pool)
    .await
}

/// Unscoped so callers can tell a missing document from someone else's.
pub async fn find_by_id(pool: &PgPool, document_id: i64) -> Result<Option<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>("SELECT * FROM consultant_documents WHERE id = $1")
        .bind(document_id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool, consultant_id: i64) -> Result<Vec<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        "SELECT * FROM consultant_documents WHERE consultant_id = $1 ORDER BY created_at DESC",
    )
    .bind(consultant_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_type(
    pool: &PgPool,
    consultant_id: i64,
    document_type: DocumentType,
) -> Result<Vec<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT * FROM consultant_documents
        WHERE consultant_id = $1 AND document_type = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(consultant_id)
    .bind(document_type.as_str())
    .fetch_all(pool)
    .await
}

pub async fn list_by_status(
    pool: &PgPool,
    consultant_id: i64,
    status: DocumentStatus,
) -> Result<Vec<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT * FROM consultant_documents
        WHERE consultant_id = $1 AND status = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(consultant_id)
    .bind(status.as_str())
    .fetch_all(pool)
    .await
}

pub async fn save<'e, E>(db: E, row: &DocumentRow) -> Result<DocumentRow, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, DocumentRow>(
        r#"
        UPDATE consultant_documents SET
            status = $2, rejection_reason = $3, verified_at = $4, verified_by = $5,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.status)
    .bind(&row.rejection_reason)
    .bind(row.verified_at)
    .bind(&row.verified_by)
    .fetch_one(db)
    .await
}

pub async fn delete(pool: &PgPool, document_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM consultant_documents WHERE id = $1")
        .bind(document_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Number of distinct document types the consultant has had verified.
pub async fn verified_type_count<'e, E>(db: E, consultant_id: i64) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT document_type) FROM consultant_documents
        WHERE consultant_id = $1 AND status = $2
        "#,
    )
    .bind(consultant_id)
    .bind(DocumentStatus::Verified.as_str())
    .fetch_one(db)
    .await
}
