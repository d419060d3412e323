use std::collections::BTreeSet;

use sqlx::PgPool;
use tracing::{info, warn};

/// Returns the subset of `job_ids` the user has saved.
pub async fn batch_check(
    pool: &PgPool,
    user_id: i64,
    job_ids: &[i64],
) -> Result<BTreeSet<i64>, sqlx::Error> {
    if job_ids.is_empty() {
        return Ok(BTreeSet::new());
    }

    let saved: Vec<i64> = sqlx::query_scalar(
        "SELECT job_id FROM saved_jobs WHERE user_id = $1 AND job_id = ANY($2)",
    )
    .bind(user_id)
    .bind(job_ids)
    .fetch_all(pool)
    .await?;

    Ok(saved.into_iter().collect())
}

pub async fn is_saved(pool: &PgPool, user_id: i64, job_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM saved_jobs WHERE user_id = $1 AND job_id = $2)")
        .bind(user_id)
        .bind(job_id)
        .fetch_one(pool)
        .await
}

/// Idempotent: saving twice leaves a single row.
pub async fn save(pool: &PgPool, user_id: i64, job_id: i64) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO saved_jobs (user_id, job_id) VALUES ($1, $2) ON CONFLICT (user_id, job_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(job_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        warn!(user_id, job_id, "Job already saved");
    } else {
        info!(user_id, job_id, "Job saved");
    }
    Ok(())
}

pub async fn unsave(pool: &PgPool, user_id: i64, job_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM saved_jobs WHERE user_id = $1 AND job_id = $2")
        .bind(user_id)
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn all_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT job_id FROM saved_jobs WHERE user_id = $1 ORDER BY saved_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}
