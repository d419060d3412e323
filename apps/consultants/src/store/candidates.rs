use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::models::candidate::{CandidateChoices, CandidateRequest, CandidateRow};
use crate::models::dashboard::{OnboardedRow, WorkforceStats};
use crate::models::{CandidateAvailability, Gender};

const SELECT_CANDIDATE: &str =
    "SELECT c.*, p.name AS pool_name FROM candidates c JOIN pools p ON p.id = c.pool_id";

/// Inserts a candidate and returns its id.
pub async fn insert<'e, E>(
    db: E,
    pool_id: i64,
    req: &CandidateRequest,
    choices: CandidateChoices,
    now: DateTime<Utc>,
) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let availability = choices.availability.unwrap_or(CandidateAvailability::New);
    let deployed_at = (availability == CandidateAvailability::Deployed).then_some(now);
    sqlx::query_scalar(
        r#"
        INSERT INTO candidates
            (pool_id, name, date_of_birth, gender, phone_number, email, current_address,
             permanent_address, city, state, pincode, position, work_experience, skills,
             pay_range_min, pay_range_max, availability, resume_url, photo_url, id_proof_url,
             deployed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21)
        RETURNING id
        "#,
    )
    .bind(pool_id)
    .bind(req.name.as_deref().map(str::trim))
    .bind(req.date_of_birth)
    .bind(choices.gender.map(Gender::as_str))
    .bind(&req.phone_number)
    .bind(&req.email)
    .bind(&req.current_address)
    .bind(&req.permanent_address)
    .bind(&req.city)
    .bind(&req.state)
    .bind(&req.pincode)
    .bind(&req.position)
    .bind(&req.work_experience)
    .bind(&req.skills)
    .bind(&req.pay_range_min)
    .bind(&req.pay_range_max)
    .bind(availability.as_str())
    .bind(&req.resume_url)
    .bind(&req.photo_url)
    .bind(&req.id_proof_url)
    .bind(deployed_at)
    .fetch_one(db)
    .await
}

/// A candidate in any of the consultant's pools.
pub async fn find<'e, E>(
    db: E,
    consultant_id: i64,
    candidate_id: i64,
) -> Result<Option<CandidateRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, CandidateRow>(&format!(
        "{SELECT_CANDIDATE} WHERE c.id = $1 AND p.consultant_id = $2"
    ))
    .bind(candidate_id)
    .bind(consultant_id)
    .fetch_optional(db)
    .await
}

pub async fn list_by_pool(pool: &PgPool, pool_id: i64) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(&format!(
        "{SELECT_CANDIDATE} WHERE c.pool_id = $1 ORDER BY c.created_at DESC"
    ))
    .bind(pool_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_pool_and_availability(
    pool: &PgPool,
    pool_id: i64,
    availability: CandidateAvailability,
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(&format!(
        "{SELECT_CANDIDATE} WHERE c.pool_id = $1 AND c.availability = $2 ORDER BY c.created_at DESC"
    ))
    .bind(pool_id)
    .bind(availability.as_str())
    .fetch_all(pool)
    .await
}

/// Case-insensitive match on name, position or skills.
pub async fn search_in_pool(pool: &PgPool, pool_id: i64, term: &str) -> Result<Vec<CandidateRow>, sqlx::Error> {
    let pattern = format!("%{}%", term.trim().to_lowercase());
    sqlx::query_as::<_, CandidateRow>(&format!(
        r#"
        {SELECT_CANDIDATE}
        WHERE c.pool_id = $1
          AND (LOWER(c.name) LIKE $2
               OR LOWER(COALESCE(c.position, '')) LIKE $2
               OR LOWER(COALESCE(c.skills, '')) LIKE $2)
        ORDER BY c.name ASC
        "#
    ))
    .bind(pool_id)
    .bind(pattern)
    .fetch_all(pool)
    .await
}

pub async fn list(pool: &PgPool, consultant_id: i64) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(&format!(
        "{SELECT_CANDIDATE} WHERE p.consultant_id = $1 ORDER BY c.created_at DESC"
    ))
    .bind(consultant_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_availability(
    pool: &PgPool,
    consultant_id: i64,
    availability: CandidateAvailability,
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(&format!(
        "{SELECT_CANDIDATE} WHERE p.consultant_id = $1 AND c.availability = $2 ORDER BY c.created_at DESC"
    ))
    .bind(consultant_id)
    .bind(availability.as_str())
    .fetch_all(pool)
    .await
}

/// Newest candidates created at or after `since`.
pub async fn recent(
    pool: &PgPool,
    consultant_id: i64,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(&format!(
        r#"
        {SELECT_CANDIDATE}
        WHERE p.consultant_id = $1 AND c.created_at >= $2
        ORDER BY c.created_at DESC
        LIMIT $3
        "#
    ))
    .bind(consultant_id)
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn phone_taken(pool: &PgPool, phone: &str, except: Option<i64>) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM candidates WHERE phone_number = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(phone)
    .bind(except)
    .fetch_one(pool)
    .await
}

pub async fn email_taken(pool: &PgPool, email: &str, except: Option<i64>) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM candidates WHERE LOWER(email) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(email)
    .bind(except)
    .fetch_one(pool)
    .await
}

pub async fn save<'e, E>(db: E, row: &CandidateRow) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE candidates SET
            name = $2, date_of_birth = $3, gender = $4, phone_number = $5, email = $6,
            current_address = $7, permanent_address = $8, city = $9, state = $10, pincode = $11,
            position = $12, work_experience = $13, skills = $14, pay_range_min = $15,
            pay_range_max = $16, availability = $17, is_verified = $18, resume_url = $19,
            photo_url = $20, id_proof_url = $21, current_job_id = $22, current_employer_id = $23,
            deployed_at = $24, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(row.date_of_birth)
    .bind(&row.gender)
    .bind(&row.phone_number)
    .bind(&row.email)
    .bind(&row.current_address)
    .bind(&row.permanent_address)
    .bind(&row.city)
    .bind(&row.state)
    .bind(&row.pincode)
    .bind(&row.position)
    .bind(&row.work_experience)
    .bind(&row.skills)
    .bind(&row.pay_range_min)
    .bind(&row.pay_range_max)
    .bind(&row.availability)
    .bind(row.is_verified)
    .bind(&row.resume_url)
    .bind(&row.photo_url)
    .bind(&row.id_proof_url)
    .bind(row.current_job_id)
    .bind(row.current_employer_id)
    .bind(row.deployed_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn set_verified<'e, E>(db: E, candidate_id: i64, verified: bool) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE candidates SET is_verified = $2, updated_at = NOW() WHERE id = $1")
        .bind(candidate_id)
        .bind(verified)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete<'e, E>(db: E, candidate_id: i64) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(candidate_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn workforce_stats(pool: &PgPool, consultant_id: i64) -> Result<WorkforceStats, sqlx::Error> {
    sqlx::query_as::<_, WorkforceStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE c.availability = $2) AS active,
            COUNT(*) FILTER (WHERE c.availability = $3) AS inactive,
            COUNT(*) FILTER (WHERE c.availability = $4) AS deployed,
            COUNT(*) FILTER (WHERE c.is_verified) AS verified,
            COUNT(*) FILTER (WHERE c.gender = $5) AS male,
            COUNT(*) FILTER (WHERE c.gender = $6) AS female
        FROM candidates c JOIN pools p ON p.id = c.pool_id
        WHERE p.consultant_id = $1
        "#,
    )
    .bind(consultant_id)
    .bind(CandidateAvailability::Active.as_str())
    .bind(CandidateAvailability::Inactive.as_str())
    .bind(CandidateAvailability::Deployed.as_str())
    .bind(Gender::Male.as_str())
    .bind(Gender::Female.as_str())
    .fetch_one(pool)
    .await
}

/// Newest candidates with their verification status for the home screen.
pub async fn recently_onboarded(pool: &PgPool, consultant_id: i64, limit: i64) -> Result<Vec<OnboardedRow>, sqlx::Error> {
    sqlx::query_as::<_, OnboardedRow>(
        r#"
        SELECT c.id AS candidate_id, c.name, c.position, v.status AS verification_status
        FROM candidates c
        JOIN pools p ON p.id = c.pool_id
        LEFT JOIN candidate_verifications v ON v.candidate_id = c.id
        WHERE p.consultant_id = $1
        ORDER BY c.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(consultant_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
