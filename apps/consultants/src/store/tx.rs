//! Transaction scope for consultant writes that span more than one statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::{candidates, consultants, documents, pools, verifications};
use crate::models::candidate::{CandidateChoices, CandidateRequest, CandidateRow};
use crate::models::document::DocumentRow;
use crate::models::verification::VerificationRow;

/// Writes issued through one open transaction. Nothing is visible to other
/// connections until [`ConsultantTx::commit`]; dropping the value rolls back.
#[async_trait]
pub trait ConsultantTx: Send {
    async fn commit(self) -> Result<(), sqlx::Error>;

    async fn insert_candidate(
        &mut self,
        pool_id: i64,
        req: &CandidateRequest,
        choices: CandidateChoices,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error>;

    async fn find_candidate(
        &mut self,
        consultant_id: i64,
        candidate_id: i64,
    ) -> Result<Option<CandidateRow>, sqlx::Error>;

    async fn save_candidate(&mut self, row: &CandidateRow) -> Result<(), sqlx::Error>;

    async fn delete_candidate(&mut self, candidate_id: i64) -> Result<(), sqlx::Error>;

    async fn set_candidate_verified(&mut self, candidate_id: i64, verified: bool) -> Result<(), sqlx::Error>;

    async fn refresh_pool_metrics(&mut self, pool_id: i64) -> Result<(), sqlx::Error>;

    /// Locks the pool row, then checks for live candidates.
    async fn pool_has_candidates(&mut self, pool_id: i64) -> Result<bool, sqlx::Error>;

    async fn delete_pool(&mut self, pool_id: i64) -> Result<(), sqlx::Error>;

    async fn save_verification(&mut self, row: &VerificationRow) -> Result<(), sqlx::Error>;

    async fn save_document(&mut self, row: &DocumentRow) -> Result<DocumentRow, sqlx::Error>;

    async fn verified_document_types(&mut self, consultant_id: i64) -> Result<i64, sqlx::Error>;

    async fn mark_consultant_verified(&mut self, consultant_id: i64) -> Result<(), sqlx::Error>;
}

pub struct PgConsultantTx {
    tx: Transaction<'static, Postgres>,
}

impl PgConsultantTx {
    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }
}

#[async_trait]
impl ConsultantTx for PgConsultantTx {
    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    async fn insert_candidate(
        &mut self,
        pool_id: i64,
        req: &CandidateRequest,
        choices: CandidateChoices,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        candidates::insert(&mut *self.tx, pool_id, req, choices, now).await
    }

    async fn find_candidate(
        &mut self,
        consultant_id: i64,
        candidate_id: i64,
    ) -> Result<Option<CandidateRow>, sqlx::Error> {
        candidates::find(&mut *self.tx, consultant_id, candidate_id).await
    }

    async fn save_candidate(&mut self, row: &CandidateRow) -> Result<(), sqlx::Error> {
        candidates::save(&mut *self.tx, row).await
    }

    async fn delete_candidate(&mut self, candidate_id: i64) -> Result<(), sqlx::Error> {
        candidates::delete(&mut *self.tx, candidate_id).await
    }

    async fn set_candidate_verified(&mut self, candidate_id: i64, verified: bool) -> Result<(), sqlx::Error> {
        candidates::set_verified(&mut *self.tx, candidate_id, verified).await
    }

    async fn refresh_pool_metrics(&mut self, pool_id: i64) -> Result<(), sqlx::Error> {
        pools::refresh_metrics(&mut *self.tx, pool_id).await
    }

    async fn pool_has_candidates(&mut self, pool_id: i64) -> Result<bool, sqlx::Error> {
        pools::lock(&mut *self.tx, pool_id).await?;
        pools::has_candidates(&mut *self.tx, pool_id).await
    }

    async fn delete_pool(&mut self, pool_id: i64) -> Result<(), sqlx::Error> {
        pools::delete(&mut *self.tx, pool_id).await
    }

    async fn save_verification(&mut self, row: &VerificationRow) -> Result<(), sqlx::Error> {
        verifications::save(&mut *self.tx, row).await
    }

    async fn save_document(&mut self, row: &DocumentRow) -> Result<DocumentRow, sqlx::Error> {
        documents::save(&mut *self.tx, row).await
    }

    async fn verified_document_types(&mut self, consultant_id: i64) -> Result<i64, sqlx::Error> {
        documents::verified_type_count(&mut *self.tx, consultant_id).await
    }

    async fn mark_consultant_verified(&mut self, consultant_id: i64) -> Result<(), sqlx::Error> {
        consultants::mark_verified(&mut *self.tx, consultant_id).await
    }
}
