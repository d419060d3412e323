//! Consultant writes that change more than one row.
//!
//! Each takes ownership of an open [`ConsultantTx`] and commits only after every
//! step succeeded. An early return drops the transaction, which rolls it back.

use chrono::{DateTime, Utc};
use portal_common::{AppError, ErrorCode};
use tracing::info;

use crate::models::candidate::{CandidateChoices, CandidateRequest, CandidateRow};
use crate::models::consultant::ConsultantRow;
use crate::models::document::DocumentRow;
use crate::models::pool::PoolRow;
use crate::models::verification::{VerificationRow, VerificationUpdate};
use crate::models::{DocumentStatus, DocumentType, VerificationStatus};
use crate::store::tx::ConsultantTx;

async fn reload_candidate<T: ConsultantTx>(
    tx: &mut T,
    consultant_id: i64,
    candidate_id: i64,
) -> Result<CandidateRow, AppError> {
    tx.find_candidate(consultant_id, candidate_id)
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!("candidate {candidate_id} missing inside its own transaction").into()
        })
}

// ──────────────────────────────────────────────
// Candidates and pool counters
// ──────────────────────────────────────────────

pub async fn add_candidate<T: ConsultantTx>(
    mut tx: T,
    consultant_id: i64,
    pool_id: i64,
    req: &CandidateRequest,
    choices: CandidateChoices,
    now: DateTime<Utc>,
) -> Result<CandidateRow, AppError> {
    let candidate_id = tx.insert_candidate(pool_id, req, choices, now).await?;
    tx.refresh_pool_metrics(pool_id).await?;
    let candidate = reload_candidate(&mut tx, consultant_id, candidate_id).await?;
    tx.commit().await?;
    Ok(candidate)
}

/// Writes an edited candidate and recounts its pool.
pub async fn save_candidate<T: ConsultantTx>(
    mut tx: T,
    consultant_id: i64,
    candidate: &CandidateRow,
) -> Result<CandidateRow, AppError> {
    tx.save_candidate(candidate).await?;
    tx.refresh_pool_metrics(candidate.pool_id).await?;
    let saved = reload_candidate(&mut tx, consultant_id, candidate.id).await?;
    tx.commit().await?;
    Ok(saved)
}

pub async fn remove_candidate<T: ConsultantTx>(mut tx: T, candidate: &CandidateRow) -> Result<(), AppError> {
    candidate.ensure_deletable()?;
    tx.delete_candidate(candidate.id).await?;
    tx.refresh_pool_metrics(candidate.pool_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Refuses while any candidate row references the pool, whatever the cached counters say.
pub async fn remove_pool<T: ConsultantTx>(mut tx: T, pool: &PoolRow) -> Result<(), AppError> {
    if tx.pool_has_candidates(pool.id).await? {
        return Err(AppError::bad_request(
            ErrorCode::OperationNotAllowed,
            "Cannot delete pool with existing candidates. Please remove all candidates first.",
        ));
    }
    tx.delete_pool(pool.id).await?;
    tx.commit().await?;
    Ok(())
}

// ──────────────────────────────────────────────
// Verification
// ──────────────────────────────────────────────

/// Applies the edit, settles the status and flags the candidate once all four checks pass.
pub async fn update_verification<T: ConsultantTx>(
    mut tx: T,
    mut verification: VerificationRow,
    update: VerificationUpdate,
    status: Option<VerificationStatus>,
    verifier: &str,
    now: DateTime<Utc>,
) -> Result<VerificationRow, AppError> {
    update.apply_to(&mut verification, status);
    let fully_verified = verification.settle(verifier, now);

    tx.save_verification(&verification).await?;
    if fully_verified {
        tx.set_candidate_verified(verification.candidate_id, true).await?;
    }
    tx.commit().await?;
    Ok(verification)
}

pub async fn reject_verification<T: ConsultantTx>(
    mut tx: T,
    mut verification: VerificationRow,
    reason: &str,
    rejected_by: &str,
) -> Result<VerificationRow, AppError> {
    verification.reject(reason, rejected_by);
    tx.save_verification(&verification).await?;
    tx.set_candidate_verified(verification.candidate_id, false).await?;
    tx.commit().await?;
    Ok(verification)
}

// ──────────────────────────────────────────────
// Documents
// ──────────────────────────────────────────────

/// Reviews one document. The consultant turns verified with the last of the seven types.
pub async fn review_document<T: ConsultantTx>(
    mut tx: T,
    consultant: &ConsultantRow,
    mut document: DocumentRow,
    status: DocumentStatus,
    rejection_reason: Option<String>,
    verified_by: Option<String>,
    now: DateTime<Utc>,
) -> Result<DocumentRow, AppError> {
    document.apply_status(status, rejection_reason, verified_by, now);
    let saved = tx.save_document(&document).await?;

    if status == DocumentStatus::Verified && !consultant.is_verified {
        let verified_types = tx.verified_document_types(consultant.id).await?;
        if verified_types == DocumentType::ALL.len() as i64 {
            tx.mark_consultant_verified(consultant.id).await?;
            info!(consultant_id = consultant.id, "All documents verified, consultant marked verified");
        }
    }
    tx.commit().await?;
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::models::candidate::tests::candidate_row;
    use crate::models::consultant::tests::consultant_row;
    use crate::models::document::tests::document_row;
    use crate::models::pool::tests::pool_row;
    use crate::models::verification::tests::verification_row;
    use crate::models::CandidateAvailability;

    /// Committed state of the fake database.
    #[derive(Debug, Clone, Default)]
    struct Tables {
        candidates: BTreeMap<i64, CandidateRow>,
        pools: BTreeSet<i64>,
        refreshed_pools: Vec<i64>,
        verifications: BTreeMap<i64, VerificationRow>,
        documents: BTreeMap<i64, DocumentRow>,
        verified_document_types: i64,
        consultant_verified: bool,
    }

    /// Stages writes on a copy of [`Tables`] and publishes them on commit.
    struct FakeTx {
        committed: Arc<Mutex<Tables>>,
        staged: Tables,
        fail_on: Option<&'static str>,
    }

    impl FakeTx {
        fn begin(db: &Arc<Mutex<Tables>>) -> Self {
            Self {
                committed: Arc::clone(db),
                staged: db.lock().unwrap().clone(),
                fail_on: None,
            }
        }

        fn failing_on(db: &Arc<Mutex<Tables>>, step: &'static str) -> Self {
            Self {
                fail_on: Some(step),
                ..Self::begin(db)
            }
        }

        fn step(&self, name: &str) -> Result<(), sqlx::Error> {
            if self.fail_on == Some(name) {
                return Err(sqlx::Error::PoolTimedOut);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ConsultantTx for FakeTx {
        async fn commit(self) -> Result<(), sqlx::Error> {
            self.step("commit")?;
            *self.committed.lock().unwrap() = self.staged;
            Ok(())
        }

        async fn insert_candidate(
            &mut self,
            pool_id: i64,
            req: &CandidateRequest,
            _choices: CandidateChoices,
            _now: DateTime<Utc>,
        ) -> Result<i64, sqlx::Error> {
            self.step("insert_candidate")?;
            let id = self.staged.candidates.keys().max().copied().unwrap_or(0) + 1;
            let mut row = candidate_row(id);
            row.pool_id = pool_id;
            if let Some(name) = &req.name {
                row.name = name.clone();
            }
            self.staged.candidates.insert(id, row);
            Ok(id)
        }

        async fn find_candidate(
            &mut self,
            _consultant_id: i64,
            candidate_id: i64,
        ) -> Result<Option<CandidateRow>, sqlx::Error> {
            Ok(self.staged.candidates.get(&candidate_id).cloned())
        }

        async fn save_candidate(&mut self, row: &CandidateRow) -> Result<(), sqlx::Error> {
            self.step("save_candidate")?;
            self.staged.candidates.insert(row.id, row.clone());
            Ok(())
        }

        async fn delete_candidate(&mut self, candidate_id: i64) -> Result<(), sqlx::Error> {
            self.staged.candidates.remove(&candidate_id);
            Ok(())
        }

        async fn set_candidate_verified(&mut self, candidate_id: i64, verified: bool) -> Result<(), sqlx::Error> {
            self.step("set_candidate_verified")?;
            if let Some(row) = self.staged.candidates.get_mut(&candidate_id) {
                row.is_verified = verified;
            }
            Ok(())
        }

        async fn refresh_pool_metrics(&mut self, pool_id: i64) -> Result<(), sqlx::Error> {
            self.step("refresh_pool_metrics")?;
            self.staged.refreshed_pools.push(pool_id);
            Ok(())
        }

        async fn pool_has_candidates(&mut self, pool_id: i64) -> Result<bool, sqlx::Error> {
            Ok(self.staged.candidates.values().any(|c| c.pool_id == pool_id))
        }

        async fn delete_pool(&mut self, pool_id: i64) -> Result<(), sqlx::Error> {
            self.staged.pools.remove(&pool_id);
            Ok(())
        }

        async fn save_verification(&mut self, row: &VerificationRow) -> Result<(), sqlx::Error> {
            self.step("save_verification")?;
            self.staged.verifications.insert(row.id, row.clone());
            Ok(())
        }

        async fn save_document(&mut self, row: &DocumentRow) -> Result<DocumentRow, sqlx::Error> {
            self.step("save_document")?;
            self.staged.documents.insert(row.id, row.clone());
            if row.status == DocumentStatus::Verified.as_str() {
                self.staged.verified_document_types += 1;
            }
            Ok(row.clone())
        }

        async fn verified_document_types(&mut self, _consultant_id: i64) -> Result<i64, sqlx::Error> {
            Ok(self.staged.verified_document_types)
        }

        async fn mark_consultant_verified(&mut self, _consultant_id: i64) -> Result<(), sqlx::Error> {
            self.step("mark_consultant_verified")?;
            self.staged.consultant_verified = true;
            Ok(())
        }
    }

    fn db_with_candidate(candidate: CandidateRow) -> Arc<Mutex<Tables>> {
        let mut tables = Tables::default();
        tables.pools.insert(candidate.pool_id);
        tables.candidates.insert(candidate.id, candidate);
        Arc::new(Mutex::new(tables))
    }

    fn all_checks_done() -> VerificationUpdate {
        VerificationUpdate {
            police_verification_done: Some(true),
            health_check_done: Some(true),
            background_verification_done: Some(true),
            reference_check_done: Some(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_verification_flags_candidate() {
        let db = db_with_candidate(candidate_row(5));
        let saved = update_verification(
            FakeTx::begin(&db),
            verification_row(),
            all_checks_done(),
            None,
            "Officer Rao",
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(saved.status, "VERIFIED");
        assert_eq!(saved.verified_by.as_deref(), Some("Officer Rao"));
        let tables = db.lock().unwrap();
        assert!(tables.candidates[&5].is_verified);
        assert_eq!(tables.verifications[&1].status, "VERIFIED");
    }

    #[tokio::test]
    async fn test_partial_verification_leaves_candidate_unverified() {
        let db = db_with_candidate(candidate_row(5));
        let update = VerificationUpdate {
            police_verification_done: Some(true),
            ..Default::default()
        };
        let saved = update_verification(FakeTx::begin(&db), verification_row(), update, None, "System", Utc::now())
            .await
            .unwrap();

        assert_eq!(saved.status, "UNDER_VERIFICATION");
        assert!(!db.lock().unwrap().candidates[&5].is_verified);
    }

    #[tokio::test]
    async fn test_verification_rolls_back_when_candidate_flag_fails() {
        let db = db_with_candidate(candidate_row(5));
        let result = update_verification(
            FakeTx::failing_on(&db, "set_candidate_verified"),
            verification_row(),
            all_checks_done(),
            None,
            "System",
            Utc::now(),
        )
        .await;

        assert!(result.is_err());
        let tables = db.lock().unwrap();
        assert!(tables.verifications.is_empty());
        assert!(!tables.candidates[&5].is_verified);
    }

    #[tokio::test]
    async fn test_reject_clears_candidate_flag() {
        let mut candidate = candidate_row(5);
        candidate.is_verified = true;
        let db = db_with_candidate(candidate);

        let rejected = reject_verification(FakeTx::begin(&db), verification_row(), "Fake address", "Officer Rao")
            .await
            .unwrap();

        assert_eq!(rejected.status, "REJECTED");
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Fake address"));
        assert!(!db.lock().unwrap().candidates[&5].is_verified);
    }

    #[tokio::test]
    async fn test_last_verified_document_verifies_consultant() {
        let db = Arc::new(Mutex::new(Tables {
            verified_document_types: 6,
            ..Default::default()
        }));
        let saved = review_document(
            FakeTx::begin(&db),
            &consultant_row(),
            document_row(),
            DocumentStatus::Verified,
            None,
            Some("Reviewer".into()),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(saved.status, "VERIFIED");
        assert!(db.lock().unwrap().consultant_verified);
    }

    #[tokio::test]
    async fn test_partial_documents_leave_consultant_unverified() {
        let db = Arc::new(Mutex::new(Tables {
            verified_document_types: 2,
            ..Default::default()
        }));
        review_document(
            FakeTx::begin(&db),
            &consultant_row(),
            document_row(),
            DocumentStatus::Verified,
            None,
            None,
            Utc::now(),
        )
        .await
        .unwrap();

        let tables = db.lock().unwrap();
        assert!(!tables.consultant_verified);
        assert_eq!(tables.documents[&9].status, "VERIFIED");
    }

    #[tokio::test]
    async fn test_document_review_rolls_back_when_consultant_flag_fails() {
        let db = Arc::new(Mutex::new(Tables {
            verified_document_types: 6,
            ..Default::default()
        }));
        let result = review_document(
            FakeTx::failing_on(&db, "mark_consultant_verified"),
            &consultant_row(),
            document_row(),
            DocumentStatus::Verified,
            None,
            None,
            Utc::now(),
        )
        .await;

        assert!(result.is_err());
        let tables = db.lock().unwrap();
        assert!(tables.documents.is_empty());
        assert_eq!(tables.verified_document_types, 6);
    }

    #[tokio::test]
    async fn test_pool_with_candidates_is_not_deleted_even_with_stale_counter() {
        let db = db_with_candidate(candidate_row(5));
        let mut pool = pool_row(2, "Security Guards");
        pool.total_candidates = 0;

        let err = remove_pool(FakeTx::begin(&db), &pool).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::OperationNotAllowed);
        let tables = db.lock().unwrap();
        assert!(tables.pools.contains(&2));
        assert!(tables.candidates.contains_key(&5));
    }

    #[tokio::test]
    async fn test_empty_pool_is_deleted() {
        let db = Arc::new(Mutex::new(Tables {
            pools: BTreeSet::from([2]),
            ..Default::default()
        }));

        remove_pool(FakeTx::begin(&db), &pool_row(2, "Drivers")).await.unwrap();

        assert!(db.lock().unwrap().pools.is_empty());
    }

    #[tokio::test]
    async fn test_failed_recount_undoes_candidate_insert() {
        let db = Arc::new(Mutex::new(Tables {
            pools: BTreeSet::from([2]),
            ..Default::default()
        }));
        let req = CandidateRequest {
            name: Some("Asha".into()),
            ..Default::default()
        };

        let result = add_candidate(
            FakeTx::failing_on(&db, "refresh_pool_metrics"),
            1,
            2,
            &req,
            CandidateChoices::default(),
            Utc::now(),
        )
        .await;

        assert!(result.is_err());
        assert!(db.lock().unwrap().candidates.is_empty());
    }

    #[tokio::test]
    async fn test_added_candidate_recounts_pool() {
        let db = Arc::new(Mutex::new(Tables {
            pools: BTreeSet::from([2]),
            ..Default::default()
        }));
        let req = CandidateRequest {
            name: Some("Asha".into()),
            ..Default::default()
        };

        let added = add_candidate(FakeTx::begin(&db), 1, 2, &req, CandidateChoices::default(), Utc::now())
            .await
            .unwrap();

        assert_eq!(added.name, "Asha");
        assert_eq!(added.pool_id, 2);
        assert_eq!(db.lock().unwrap().refreshed_pools, vec![2]);
    }

    #[tokio::test]
    async fn test_deployed_candidate_is_not_removed() {
        let mut candidate = candidate_row(5);
        candidate.set_availability(CandidateAvailability::Deployed, Utc::now());
        let db = db_with_candidate(candidate.clone());

        let err = remove_candidate(FakeTx::begin(&db), &candidate).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::OperationNotAllowed);
        let tables = db.lock().unwrap();
        assert!(tables.candidates.contains_key(&5));
        assert!(tables.refreshed_pools.is_empty());
    }
}
