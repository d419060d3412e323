use portal_common::pagination::PageRequest;
use sqlx::PgPool;

use crate::filter::JobFilter;
use crate::models::{JobRow, JobStatus, NewJob};

pub async fn insert(pool: &PgPool, employer_id: i64, job: &NewJob) -> Result<JobRow, sqlx::Error> {
    let req = &job.request;
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (title, company, company_logo_url, location, city, state, country, category,
             salary, min_salary, max_salary, currency, experience, languages, industry,
             functional_area, experience_level, employment_type, joining_period, company_docs,
             description, requirements, benefits, job_type, featured, status, employer_id,
             expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)
        RETURNING *
        "#,
    )
    .bind(&job.title)
    .bind(&job.company)
    .bind(&req.company_logo_url)
    .bind(&job.location)
    .bind(&req.city)
    .bind(&req.state)
    .bind(&req.country)
    .bind(&req.category)
    .bind(&req.salary)
    .bind(req.min_salary)
    .bind(req.max_salary)
    .bind(&req.currency)
    .bind(&req.experience)
    .bind(&req.languages)
    .bind(&req.industry)
    .bind(&req.functional_area)
    .bind(&req.experience_level)
    .bind(&req.employment_type)
    .bind(&req.joining_period)
    .bind(&req.company_docs)
    .bind(&req.description)
    .bind(&req.requirements)
    .bind(&req.benefits)
    .bind(job.job_type.as_str())
    .bind(job.featured)
    .bind(JobStatus::Active.as_str())
    .bind(employer_id)
    .bind(job.expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, job_id: i64) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

/// One page of filtered jobs plus the total match count.
pub async fn find_page(
    pool: &PgPool,
    filter: &JobFilter,
    page: PageRequest,
) -> Result<(Vec<JobRow>, i64), sqlx::Error> {
    let total: i64 = filter
        .count_query()
        .build_query_scalar()
        .fetch_one(pool)
        .await?;
    if total == 0 {
        return Ok((Vec::new(), 0));
    }

    let rows = filter
        .select_query(page)
        .build_query_as::<JobRow>()
        .fetch_all(pool)
        .await?;
    Ok((rows, total))
}

pub async fn increment_view_count(pool: &PgPool, job_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE jobs SET views = views + 1 WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns false when no such job exists.
pub async fn increment_applications(pool: &PgPool, job_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE jobs SET applications_count = applications_count + 1, updated_at = NOW() WHERE id = $1",
    )
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn status_of(pool: &PgPool, job_id: i64) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT status FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}
