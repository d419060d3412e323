//! Persistence for `job_applications`, behind a trait so the submit flow can run without Postgres.

use std::collections::BTreeSet;

use async_trait::async_trait;
use portal_common::pagination::PageRequest;
use sqlx::PgPool;

use crate::models::{ApplicationRow, ApplicationStatus};

pub struct NewApplication<'a> {
    pub job_id: i64,
    pub applicant_id: i64,
    pub cover_letter: Option<&'a str>,
    pub resume_url: Option<&'a str>,
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn exists(&self, job_id: i64, applicant_id: i64) -> Result<bool, sqlx::Error>;

    /// Fails with a unique violation when the user already applied to the job.
    async fn insert(&self, app: NewApplication<'_>) -> Result<ApplicationRow, sqlx::Error>;

    /// Newest first, with the total count.
    async fn page_for_applicant(
        &self,
        applicant_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<ApplicationRow>, i64), sqlx::Error>;

    async fn page_for_job(
        &self,
        job_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<ApplicationRow>, i64), sqlx::Error>;

    /// Stamps `reviewed_at` for review outcomes. The rejection reason is only kept for REJECTED.
    async fn update_status(
        &self,
        id: i64,
        status: ApplicationStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ApplicationRow>, sqlx::Error>;

    /// Subset of `job_ids` the user has applied to.
    async fn applied_job_ids(
        &self,
        applicant_id: i64,
        job_ids: &[i64],
    ) -> Result<BTreeSet<i64>, sqlx::Error>;

    async fn count_for_job(&self, job_id: i64) -> Result<i64, sqlx::Error>;
}

/// The rejection reason survives only a REJECTED status.
pub fn kept_reason(status: ApplicationStatus, rejection_reason: Option<&str>) -> Option<&str> {
    match status {
        ApplicationStatus::Rejected => rejection_reason,
        _ => None,
    }
}

pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn exists(&self, job_id: i64, applicant_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM job_applications WHERE job_id = $1 AND applicant_id = $2)",
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert(&self, app: NewApplication<'_>) -> Result<ApplicationRow, sqlx::Error> {
        sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO job_applications (job_id, applicant_id, cover_letter, resume_url, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(app.job_id)
        .bind(app.applicant_id)
        .bind(app.cover_letter)
        .bind(app.resume_url)
        .bind(ApplicationStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
    }

    async fn page_for_applicant(
        &self,
        applicant_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<ApplicationRow>, i64), sqlx::Error> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM job_applications WHERE applicant_id = $1")
                .bind(applicant_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM job_applications
            WHERE applicant_id = $1
            ORDER BY applied_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(applicant_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((rows, total))
    }

    async fn page_for_job(
        &self,
        job_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<ApplicationRow>, i64), sqlx::Error> {
        let total = self.count_for_job(job_id).await?;

        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM job_applications
            WHERE job_id = $1
            ORDER BY applied_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(job_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((rows, total))
    }

    async fn update_status(
        &self,
        id: i64,
        status: ApplicationStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ApplicationRow>, sqlx::Error> {
        let reason = kept_reason(status, rejection_reason);
        sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE job_applications
            SET status = $2,
                rejection_reason = $3,
                reviewed_at = CASE WHEN $4 THEN NOW() ELSE reviewed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(reason)
        .bind(status.is_review_outcome())
        .fetch_optional(&self.pool)
        .await
    }

    async fn applied_job_ids(
        &self,
        applicant_id: i64,
        job_ids: &[i64],
    ) -> Result<BTreeSet<i64>, sqlx::Error> {
        if job_ids.is_empty() {
            return Ok(BTreeSet::new());
        }
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT job_id FROM job_applications WHERE applicant_id = $1 AND job_id = ANY($2)",
        )
        .bind(applicant_id)
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn count_for_job(&self, job_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM job_applications WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await
    }
}
