//! The `job_documents` index: one denormalised row per posted job.

use chrono::{DateTime, Utc};
use portal_common::events::JobPostedEvent;
use portal_common::pagination::PageRequest;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

#[derive(Debug, Clone, FromRow)]
pub struct JobDocument {
    pub job_id: i64,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub category: Option<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub featured: bool,
    pub views: i32,
    pub applications_count: i32,
    pub created_at: DateTime<Utc>,
}

impl JobDocument {
    /// Fresh document for a just-posted job.
    pub fn from_event(event: JobPostedEvent, now: DateTime<Utc>) -> Self {
        JobDocument {
            job_id: event.job_id,
            title: event.title,
            company: event.company,
            location: Some(event.location),
            category: event.category,
            salary: None,
            experience: None,
            description: None,
            job_type: None,
            featured: false,
            views: 0,
            applications_count: 0,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchResponse {
    pub job_id: i64,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub category: Option<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub featured: bool,
    pub views: i32,
    pub applications_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<JobDocument> for JobSearchResponse {
    fn from(doc: JobDocument) -> Self {
        JobSearchResponse {
            job_id: doc.job_id,
            title: doc.title,
            company: doc.company,
            location: doc.location,
            category: doc.category,
            salary: doc.salary,
            experience: doc.experience,
            description: doc.description,
            job_type: doc.job_type,
            featured: doc.featured,
            views: doc.views,
            applications_count: doc.applications_count,
            created_at: doc.created_at,
        }
    }
}

/// Exactly one criterion applies per search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    Category(String),
    Location(String),
    Keyword(String),
    All,
    Featured,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl SearchCriteria {
    /// Category wins over location, location over keyword.
    pub fn resolve(keyword: Option<&str>, category: Option<&str>, location: Option<&str>) -> Self {
        if let Some(category) = non_blank(category) {
            SearchCriteria::Category(category)
        } else if let Some(location) = non_blank(location) {
            SearchCriteria::Location(location)
        } else if let Some(keyword) = non_blank(keyword) {
            SearchCriteria::Keyword(keyword)
        } else {
            SearchCriteria::All
        }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        match self {
            SearchCriteria::Category(category) => {
                qb.push(" WHERE category = ").push_bind(category.clone());
            }
            SearchCriteria::Location(location) => {
                qb.push(" WHERE LOWER(location) = ")
                    .push_bind(location.to_lowercase());
            }
            SearchCriteria::Keyword(keyword) => {
                let pattern = format!("%{}%", keyword.to_lowercase());
                qb.push(" WHERE (LOWER(title) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(description) LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            SearchCriteria::Featured => {
                qb.push(" WHERE featured");
            }
            SearchCriteria::All => {}
        }
    }

    pub fn select_query(&self, page: PageRequest) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT * FROM job_documents");
        self.push_where(&mut qb);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());
        qb
    }

    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM job_documents");
        self.push_where(&mut qb);
        qb
    }
}

pub async fn search(
    pool: &PgPool,
    criteria: &SearchCriteria,
    page: PageRequest,
) -> Result<(Vec<JobDocument>, i64), sqlx::Error> {
    let total: i64 = criteria
        .count_query()
        .build_query_scalar()
        .fetch_one(pool)
        .await?;
    let docs = criteria
        .select_query(page)
        .build_query_as::<JobDocument>()
        .fetch_all(pool)
        .await?;
    Ok((docs, total))
}

/// Insert or replace the document for `doc.job_id`.
pub async fn upsert(pool: &PgPool, doc: &JobDocument) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO job_documents
            (job_id, title, company, location, category, salary, experience, description,
             job_type, featured, views, applications_count, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (job_id) DO UPDATE SET
            title = EXCLUDED.title,
            company = EXCLUDED.company,
            location = EXCLUDED.location,
            category = EXCLUDED.category,
            salary = EXCLUDED.salary,
            experience = EXCLUDED.experience,
            description = EXCLUDED.description,
            job_type = EXCLUDED.job_type,
            featured = EXCLUDED.featured,
            views = EXCLUDED.views,
            applications_count = EXCLUDED.applications_count,
            created_at = EXCLUDED.created_at
        "#,
    )
    .bind(doc.job_id)
    .bind(&doc.title)
    .bind(&doc.company)
    .bind(&doc.location)
    .bind(&doc.category)
    .bind(&doc.salary)
    .bind(&doc.experience)
    .bind(&doc.description)
    .bind(&doc.job_type)
    .bind(doc.featured)
    .bind(doc.views)
    .bind(doc.applications_count)
    .bind(doc.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, job_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM job_documents WHERE job_id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
