use async_trait::async_trait;
use chrono::Utc;
use portal_common::events::{Binding, Delivery, EventHandler, JobPostedEvent, JOB_EXCHANGE, JOB_POSTED_KEY};
use sqlx::PgPool;
use tracing::info;

use crate::documents::{self, JobDocument};

pub const JOB_SEARCH_QUEUE: &str = "job-search-queue";

pub fn bindings() -> Vec<Binding> {
    vec![Binding::new(JOB_SEARCH_QUEUE, JOB_EXCHANGE, JOB_POSTED_KEY)]
}

/// Indexes every posted job.
pub struct JobIndexer {
    db: PgPool,
}

impl JobIndexer {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventHandler for JobIndexer {
    async fn handle(&self, _queue: &str, delivery: &Delivery) -> anyhow::Result<()> {
        let event: JobPostedEvent = delivery.decode()?;
        let doc = JobDocument::from_event(event, Utc::now());
        documents::upsert(&self.db, &doc).await?;
        info!(job_id = doc.job_id, "Job indexed");
        Ok(())
    }
}
