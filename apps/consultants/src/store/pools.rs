use sqlx::{PgExecutor, PgPool};

use crate::models::dashboard::PoolOverviewStats;
use crate::models::pool::{NewPool, PoolRow};
use crate::models::{CandidateAvailability, PoolStatus};

pub async fn insert(pool: &PgPool, consultant_id: i64, new_pool: &NewPool) -> Result<PoolRow, sqlx::Error> {
    sqlx::query_as::<_, PoolRow>(
        r#"
        INSERT INTO pools (consultant_id, name, skill_category, description, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(consultant_id)
    .bind(&new_pool.name)
    .bind(&new_pool.skill_category)
    .bind(&new_pool.description)
    .bind(PoolStatus::New.as_str())
    .fetch_one(pool)
    .await
}

/// Case-insensitive name check within one consultant. `except` skips the pool being renamed.
pub async fn name_taken(
    pool: &PgPool,
    consultant_id: i64,
    name: &str,
    except: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM pools
            WHERE consultant_id = $1 AND LOWER(name) = LOWER($2)
              AND ($3::BIGINT IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(consultant_id)
    .bind(name)
    .bind(except)
    .fetch_one(pool)
    .await
}

pub async fn find(pool: &PgPool, consultant_id: i64, pool_id: i64) -> Result<Option<PoolRow>, sqlx::Error> {
    sqlx::query_as::<_, PoolRow>("SELECT * FROM pools WHERE id = $1 AND consultant_id = $2")
        .bind(pool_id)
        .bind(consultant_id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool, consultant_id: i64) -> Result<Vec<PoolRow>, sqlx::Error> {
    sqlx::query_as::<_, PoolRow>(
        "SELECT * FROM pools WHERE consultant_id = $1 ORDER BY created_at DESC",
    )
    .bind(consultant_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_status(
    pool: &PgPool,
    consultant_id: i64,
    status: PoolStatus,
) -> Result<Vec<PoolRow>, sqlx::Error> {
    sqlx::query_as::<_, PoolRow>(
        "SELECT * FROM pools WHERE consultant_id = $1 AND status = $2 ORDER BY created_at DESC",
    )
    .bind(consultant_id)
    .bind(status.as_str())
    .fetch_all(pool)
    .await
}

/// Largest pools first.
pub async fn top_by_candidates(pool: &PgPool, consultant_id: i64, limit: i64) -> Result<Vec<PoolRow>, sqlx::Error> {
    sqlx::query_as::<_, PoolRow>(
        r#"
        SELECT * FROM pools WHERE consultant_id = $1
        ORDER BY total_candidates DESC, id ASC
        LIMIT $2
        "#,
    )
    .bind(consultant_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn top_by_commission(pool: &PgPool, consultant_id: i64, limit: i64) -> Result<Vec<PoolRow>, sqlx::Error> {
    sqlx::query_as::<_, PoolRow>(
        r#"
        SELECT * FROM pools WHERE consultant_id = $1
        ORDER BY commission_earned DESC, id ASC
        LIMIT $2
        "#,
    )
    .bind(consultant_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn recent(pool: &PgPool, consultant_id: i64, limit: i64) -> Result<Vec<PoolRow>, sqlx::Error> {
    sqlx::query_as::<_, PoolRow>(
        "SELECT * FROM pools WHERE consultant_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(consultant_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn save(pool: &PgPool, row: &PoolRow) -> Result<PoolRow, sqlx::Error> {
    sqlx::query_as::<_, PoolRow>(
        r#"
        UPDATE pools SET
            name = $2, skill_category = $3, description = $4, status = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.skill_category)
    .bind(&row.description)
    .bind(&row.status)
    .fetch_one(pool)
    .await
}

/// Row lock held until commit. Candidate inserts into the pool wait on it.
pub async fn lock<'e, E>(db: E, pool_id: i64) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("SELECT id FROM pools WHERE id = $1 FOR UPDATE")
        .bind(pool_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Counts live rows; the cached `total_candidates` may lag behind.
pub async fn has_candidates<'e, E>(db: E, pool_id: i64) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE pool_id = $1)")
        .bind(pool_id)
        .fetch_one(db)
        .await
}

pub async fn delete<'e, E>(db: E, pool_id: i64) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("DELETE FROM pools WHERE id = $1")
        .bind(pool_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Recounts the pool's candidates by availability.
pub async fn refresh_metrics<'e, E>(db: E, pool_id: i64) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE pools p SET
            total_candidates = counts.total,
            active_candidates = counts.active,
            inactive_candidates = counts.inactive,
            deployed_candidates = counts.deployed,
            updated_at = NOW()
        FROM (
            SELECT
                COUNT(*)::INT AS total,
                COUNT(*) FILTER (WHERE availability = $2)::INT AS active,
                COUNT(*) FILTER (WHERE availability = $3)::INT AS inactive,
                COUNT(*) FILTER (WHERE availability = $4)::INT AS deployed
            FROM candidates WHERE pool_id = $1
        ) counts
        WHERE p.id = $1
        "#,
    )
    .bind(pool_id)
    .bind(CandidateAvailability::Active.as_str())
    .bind(CandidateAvailability::Inactive.as_str())
    .bind(CandidateAvailability::Deployed.as_str())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn overview_stats(pool: &PgPool, consultant_id: i64) -> Result<PoolOverviewStats, sqlx::Error> {
    sqlx::query_as::<_, PoolOverviewStats>(
        r#"
        SELECT
            COUNT(*) AS total_pools,
            COUNT(*) FILTER (WHERE status = $2) AS active_pools,
            COUNT(*) FILTER (WHERE status = $3) AS inactive_pools,
            COALESCE(SUM(total_candidates), 0)::BIGINT AS total_candidates_in_pools,
            COALESCE(SUM(commission_earned), 0)::BIGINT AS total_commission,
            COALESCE(SUM(active_jobs), 0)::BIGINT AS active_jobs
        FROM pools WHERE consultant_id = $1
        "#,
    )
    .bind(consultant_id)
    .bind(PoolStatus::Active.as_str())
    .bind(PoolStatus::Inactive.as_str())
    .fetch_one(pool)
    .await
}
