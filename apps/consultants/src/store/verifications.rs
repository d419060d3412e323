use sqlx::{PgExecutor, PgPool};

use crate::models::verification::{VerificationRow, VerificationStats};
use crate::models::VerificationStatus;

const SELECT_VERIFICATION: &str = r#"
    SELECT v.*, c.name AS candidate_name
    FROM candidate_verifications v
    JOIN candidates c ON c.id = v.candidate_id
    JOIN pools p ON p.id = c.pool_id
"#;

pub async fn exists_for(pool: &PgPool, candidate_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidate_verifications WHERE candidate_id = $1)")
        .bind(candidate_id)
        .fetch_one(pool)
        .await
}

pub async fn insert(pool: &PgPool, candidate_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO candidate_verifications (candidate_id, status) VALUES ($1, $2) RETURNING id",
    )
    .bind(candidate_id)
    .bind(VerificationStatus::New.as_str())
    .fetch_one(pool)
    .await
}

pub async fn find_by_candidate<'e, E>(
    db: E,
    consultant_id: i64,
    candidate_id: i64,
) -> Result<Option<VerificationRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, VerificationRow>(&format!(
        "{SELECT_VERIFICATION} WHERE v.candidate_id = $1 AND p.consultant_id = $2"
    ))
    .bind(candidate_id)
    .bind(consultant_id)
    .fetch_optional(db)
    .await
}

pub async fn save<'e, E>(db: E, row: &VerificationRow) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE candidate_verifications SET
            status = $2,
            police_verification_done = $3, police_verification_date = $4,
            police_verification_document_url = $5, police_verification_remarks = $6,
            health_check_done = $7, health_check_date = $8, health_check_document_url = $9,
            health_check_remarks = $10,
            background_verification_done = $11, background_verification_date = $12,
            background_verification_remarks = $13,
            reference_check_done = $14, reference_name = $15, reference_phone = $16,
            reference_remarks = $17,
            verified_at = $18, verified_by = $19, verification_notes = $20,
            rejection_reason = $21, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(row.id)
    .bind(&row.status)
    .bind(row.police_verification_done)
    .bind(row.police_verification_date)
    .bind(&row.police_verification_document_url)
    .bind(&row.police_verification_remarks)
    .bind(row.health_check_done)
    .bind(row.health_check_date)
    .bind(&row.health_check_document_url)
    .bind(&row.health_check_remarks)
    .bind(row.background_verification_done)
    .bind(row.background_verification_date)
    .bind(&row.background_verification_remarks)
    .bind(row.reference_check_done)
    .bind(&row.reference_name)
    .bind(&row.reference_phone)
    .bind(&row.reference_remarks)
    .bind(row.verified_at)
    .bind(&row.verified_by)
    .bind(&row.verification_notes)
    .bind(&row.rejection_reason)
    .execute(db)
    .await?;
    Ok(())
}

/// Verifications in any of the given statuses, oldest first.
pub async fn list_by_statuses(
    pool: &PgPool,
    consultant_id: i64,
    statuses: &[VerificationStatus],
) -> Result<Vec<VerificationRow>, sqlx::Error> {
    let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
    sqlx::query_as::<_, VerificationRow>(&format!(
        "{SELECT_VERIFICATION} WHERE p.consultant_id = $1 AND v.status = ANY($2) ORDER BY v.created_at ASC"
    ))
    .bind(consultant_id)
    .bind(statuses)
    .fetch_all(pool)
    .await
}

/// Open records still missing the police check.
pub async fn police_required(pool: &PgPool, consultant_id: i64) -> Result<Vec<VerificationRow>, sqlx::Error> {
    sqlx::query_as::<_, VerificationRow>(&format!(
        r#"
        {SELECT_VERIFICATION}
        WHERE p.consultant_id = $1 AND NOT v.police_verification_done AND v.status <> $2
        ORDER BY v.created_at ASC
        "#
    ))
    .bind(consultant_id)
    .bind(VerificationStatus::Rejected.as_str())
    .fetch_all(pool)
    .await
}

pub async fn health_check_required(pool: &PgPool, consultant_id: i64) -> Result<Vec<VerificationRow>, sqlx::Error> {
    sqlx::query_as::<_, VerificationRow>(&format!(
        r#"
        {SELECT_VERIFICATION}
        WHERE p.consultant_id = $1 AND NOT v.health_check_done AND v.status <> $2
        ORDER BY v.created_at ASC
        "#
    ))
    .bind(consultant_id)
    .bind(VerificationStatus::Rejected.as_str())
    .fetch_all(pool)
    .await
}

pub async fn statistics(pool: &PgPool, consultant_id: i64) -> Result<VerificationStats, sqlx::Error> {
    sqlx::query_as::<_, VerificationStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE v.status = $2) AS pending,
            COUNT(*) FILTER (WHERE v.status = $3) AS under_verification,
            COUNT(*) FILTER (WHERE v.status = $4) AS verified,
            COUNT(*) FILTER (WHERE v.status = $5) AS rejected
        FROM candidate_verifications v
        JOIN candidates c ON c.id = v.candidate_id
        JOIN pools p ON p.id = c.pool_id
        WHERE p.consultant_id = $1
        "#,
    )
    .bind(consultant_id)
    .bind(VerificationStatus::New.as_str())
    .bind(VerificationStatus::UnderVerification.as_str())
    .bind(VerificationStatus::Verified.as_str())
    .bind(VerificationStatus::Rejected.as_str())
    .fetch_one(pool)
    .await
}
