use chrono::{DateTime, NaiveDateTime, Utc};
use portal_common::validation::ValidationErrors;
use portal_common::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{patch, patch_opt, VerificationStatus};

pub const DEFAULT_VERIFIER: &str = "System";

const CHECKS: i32 = 4;

/// Verification joined with the candidate's name.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationRow {
    pub id: i64,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub status: String,
    pub police_verification_done: bool,
    pub police_verification_date: Option<NaiveDateTime>,
    pub police_verification_document_url: Option<String>,
    pub police_verification_remarks: Option<String>,
    pub health_check_done: bool,
    pub health_check_date: Option<NaiveDateTime>,
    pub health_check_document_url: Option<String>,
    pub health_check_remarks: Option<String>,
    pub background_verification_done: bool,
    pub background_verification_date: Option<NaiveDateTime>,
    pub background_verification_remarks: Option<String>,
    pub reference_check_done: bool,
    pub reference_name: Option<String>,
    pub reference_phone: Option<String>,
    pub reference_remarks: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub verification_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VerificationRow {
    fn checks(&self) -> [bool; CHECKS as usize] {
        [
            self.police_verification_done,
            self.health_check_done,
            self.background_verification_done,
            self.reference_check_done,
        ]
    }

    pub fn completed_checks(&self) -> i32 {
        self.checks().iter().filter(|done| **done).count() as i32
    }

    /// Share of the four checks completed, 0..=100.
    pub fn progress(&self) -> i32 {
        self.completed_checks() * 100 / CHECKS
    }

    pub fn is_fully_verified(&self) -> bool {
        self.completed_checks() == CHECKS
    }

    /// Derives the status from the check flags after an edit.
    ///
    /// Returns true when the candidate is fully verified. The verification stamp is
    /// only written on the transition into VERIFIED.
    pub fn settle(&mut self, verified_by: &str, now: DateTime<Utc>) -> bool {
        if self.is_fully_verified() {
            if self.status != VerificationStatus::Verified.as_str() || self.verified_at.is_none() {
                self.status = VerificationStatus::Verified.as_str().to_string();
                self.verified_at = Some(now);
                self.verified_by = Some(verified_by.to_string());
            }
            true
        } else {
            if self.completed_checks() > 0 {
                self.status = VerificationStatus::UnderVerification.as_str().to_string();
            }
            false
        }
    }

    pub fn reject(&mut self, reason: &str, rejected_by: &str) {
        self.status = VerificationStatus::Rejected.as_str().to_string();
        self.rejection_reason = Some(reason.to_string());
        self.verified_by = Some(rejected_by.to_string());
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationUpdate {
    pub status: Option<String>,
    pub police_verification_done: Option<bool>,
    pub police_verification_date: Option<NaiveDateTime>,
    pub police_verification_document_url: Option<String>,
    pub police_verification_remarks: Option<String>,
    pub health_check_done: Option<bool>,
    pub health_check_date: Option<NaiveDateTime>,
    pub health_check_document_url: Option<String>,
    pub health_check_remarks: Option<String>,
    pub background_verification_done: Option<bool>,
    pub background_verification_date: Option<NaiveDateTime>,
    pub background_verification_remarks: Option<String>,
    pub reference_check_done: Option<bool>,
    pub reference_name: Option<String>,
    pub reference_phone: Option<String>,
    pub reference_remarks: Option<String>,
    pub verification_notes: Option<String>,
    pub rejection_reason: Option<String>,
}

impl VerificationUpdate {
    pub fn validate(&self) -> Result<Option<VerificationStatus>, AppError> {
        let mut v = ValidationErrors::new();
        for (field, value, max) in [
            ("policeVerificationDocumentUrl", &self.police_verification_document_url, 500),
            ("policeVerificationRemarks", &self.police_verification_remarks, 500),
            ("healthCheckDocumentUrl", &self.health_check_document_url, 500),
            ("healthCheckRemarks", &self.health_check_remarks, 500),
            ("backgroundVerificationRemarks", &self.background_verification_remarks, 500),
            ("referenceName", &self.reference_name, 200),
            ("referencePhone", &self.reference_phone, 15),
            ("referenceRemarks", &self.reference_remarks, 500),
            ("verificationNotes", &self.verification_notes, 1000),
            ("rejectionReason", &self.rejection_reason, 500),
        ] {
            v.length(
                field,
                value.as_deref(),
                0,
                max,
                &format!("{field} must not exceed {max} characters"),
            );
        }
        let status = self.status.as_deref().and_then(|raw| {
            let parsed = VerificationStatus::parse(raw);
            if parsed.is_none() {
                v.add("status", "Unknown verification status", Some(raw));
            }
            parsed
        });
        v.into_result()?;
        Ok(status)
    }

    pub fn apply_to(self, row: &mut VerificationRow, status: Option<VerificationStatus>) {
        patch(&mut row.status, status.map(|s| s.as_str().to_string()));
        patch(&mut row.police_verification_done, self.police_verification_done);
        patch_opt(&mut row.police_verification_date, self.police_verification_date);
        patch_opt(
            &mut row.police_verification_document_url,
            self.police_verification_document_url,
        );
        patch_opt(&mut row.police_verification_remarks, self.police_verification_remarks);
        patch(&mut row.health_check_done, self.health_check_done);
        patch_opt(&mut row.health_check_date, self.health_check_date);
        patch_opt(&mut row.health_check_document_url, self.health_check_document_url);
        patch_opt(&mut row.health_check_remarks, self.health_check_remarks);
        patch(&mut row.background_verification_done, self.background_verification_done);
        patch_opt(&mut row.background_verification_date, self.background_verification_date);
        patch_opt(
            &mut row.background_verification_remarks,
            self.background_verification_remarks,
        );
        patch(&mut row.reference_check_done, self.reference_check_done);
        patch_opt(&mut row.reference_name, self.reference_name);
        patch_opt(&mut row.reference_phone, self.reference_phone);
        patch_opt(&mut row.reference_remarks, self.reference_remarks);
        patch_opt(&mut row.verification_notes, self.verification_notes);
        patch_opt(&mut row.rejection_reason, self.rejection_reason);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierParams {
    pub verified_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectParams {
    pub rejection_reason: String,
    #[serde(alias = "verifiedBy")]
    pub rejected_by: Option<String>,
}

/// Non-blank verifier name, or the system default.
pub fn verifier_or_default(name: Option<&str>) -> &str {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_VERIFIER)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStats {
    pub total: i64,
    pub pending: i64,
    pub under_verification: i64,
    pub verified: i64,
    pub rejected: i64,
}

impl VerificationStats {
    /// NEW and UNDER_VERIFICATION together.
    pub fn open(&self) -> i64 {
        self.pending + self.under_verification
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub id: i64,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub status: String,
    pub police_verification_done: bool,
    pub police_verification_date: Option<NaiveDateTime>,
    pub police_verification_document_url: Option<String>,
    pub police_verification_remarks: Option<String>,
    pub health_check_done: bool,
    pub health_check_date: Option<NaiveDateTime>,
    pub health_check_document_url: Option<String>,
    pub health_check_remarks: Option<String>,
    pub background_verification_done: bool,
    pub background_verification_date: Option<NaiveDateTime>,
    pub background_verification_remarks: Option<String>,
    pub reference_check_done: bool,
    pub reference_name: Option<String>,
    pub reference_phone: Option<String>,
    pub reference_remarks: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub verification_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub verification_progress: i32,
    pub is_fully_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VerificationRow> for VerificationResponse {
    fn from(row: VerificationRow) -> Self {
        let verification_progress = row.progress();
        let is_fully_verified = row.is_fully_verified();
        VerificationResponse {
            id: row.id,
            candidate_id: row.candidate_id,
            candidate_name: row.candidate_name,
            status: row.status,
            police_verification_done: row.police_verification_done,
            police_verification_date: row.police_verification_date,
            police_verification_document_url: row.police_verification_document_url,
            police_verification_remarks: row.police_verification_remarks,
            health_check_done: row.health_check_done,
            health_check_date: row.health_check_date,
            health_check_document_url: row.health_check_document_url,
            health_check_remarks: row.health_check_remarks,
            background_verification_done: row.background_verification_done,
            background_verification_date: row.background_verification_date,
            background_verification_remarks: row.background_verification_remarks,
            reference_check_done: row.reference_check_done,
            reference_name: row.reference_name,
            reference_phone: row.reference_phone,
            reference_remarks: row.reference_remarks,
            verified_at: row.verified_at,
            verified_by: row.verified_by,
            verification_notes: row.verification_notes,
            rejection_reason: row.rejection_reason,
            verification_progress,
            is_fully_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn verification_row() -> VerificationRow {
        let now = Utc::now();
        VerificationRow {
            id: 1,
            candidate_id: 5,
            candidate_name: "Ravi Kumar".into(),
            status: VerificationStatus::New.as_str().into(),
            police_verification_done: false,
            police_verification_date: None,
            police_verification_document_url: None,
            police_verification_remarks: None,
            health_check_done: false,
            health_check_date: None,
            health_check_document_url: None,
            health_check_remarks: None,
            background_verification_done: false,
            background_verification_date: None,
            background_verification_remarks: None,
            reference_check_done: false,
            reference_name: None,
            reference_phone: None,
            reference_remarks: None,
            verified_at: None,
            verified_by: None,
            verification_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn flags(police: bool, health: bool, background: bool, reference: bool) -> VerificationUpdate {
        VerificationUpdate {
            police_verification_done: Some(police),
            health_check_done: Some(health),
            background_verification_done: Some(background),
            reference_check_done: Some(reference),
            ..Default::default()
        }
    }

    #[test]
    fn test_progress_counts_quarters() {
        let mut row = verification_row();
        assert_eq!(row.progress(), 0);
        flags(true, false, false, false).apply_to(&mut row, None);
        assert_eq!(row.progress(), 25);
        flags(true, true, true, false).apply_to(&mut row, None);
        assert_eq!(row.progress(), 75);
        assert!(!row.is_fully_verified());
    }

    #[test]
    fn test_untouched_record_stays_new() {
        let mut row = verification_row();
        assert!(!row.settle(DEFAULT_VERIFIER, Utc::now()));
        assert_eq!(row.status, "NEW");
    }

    #[test]
    fn test_any_check_moves_to_under_verification() {
        let mut row = verification_row();
        flags(false, true, false, false).apply_to(&mut row, None);
        assert!(!row.settle(DEFAULT_VERIFIER, Utc::now()));
        assert_eq!(row.status, "UNDER_VERIFICATION");
        assert!(row.verified_at.is_none());
    }

    #[test]
    fn test_all_checks_verify_and_stamp() {
        let now = Utc::now();
        let mut row = verification_row();
        flags(true, true, true, true).apply_to(&mut row, None);
        assert!(row.settle("Ops Lead", now));
        assert_eq!(row.status, "VERIFIED");
        assert_eq!(row.verified_at, Some(now));
        assert_eq!(row.verified_by.as_deref(), Some("Ops Lead"));
        assert_eq!(row.progress(), 100);
    }

    #[test]
    fn test_repeat_settle_keeps_original_stamp() {
        let first = Utc::now();
        let mut row = verification_row();
        flags(true, true, true, true).apply_to(&mut row, None);
        row.settle("Ops Lead", first);
        assert!(row.settle("Someone Else", first + chrono::Duration::hours(1)));
        assert_eq!(row.verified_at, Some(first));
        assert_eq!(row.verified_by.as_deref(), Some("Ops Lead"));
    }

    #[test]
    fn test_reject_records_reason() {
        let mut row = verification_row();
        row.reject("Documents forged", "Auditor");
        assert_eq!(row.status, "REJECTED");
        assert_eq!(row.rejection_reason.as_deref(), Some("Documents forged"));
        assert_eq!(row.verified_by.as_deref(), Some("Auditor"));
    }

    #[test]
    fn test_update_keeps_absent_fields() {
        let mut row = verification_row();
        row.reference_name = Some("Suresh".into());
        VerificationUpdate {
            health_check_remarks: Some("Fit".into()),
            ..Default::default()
        }
        .apply_to(&mut row, None);
        assert_eq!(row.reference_name.as_deref(), Some("Suresh"));
        assert_eq!(row.health_check_remarks.as_deref(), Some("Fit"));
    }

    #[test]
    fn test_update_validation() {
        let update = VerificationUpdate {
            status: Some("DONE".into()),
            reference_phone: Some("1".repeat(16)),
            ..Default::default()
        };
        match update.validate().unwrap_err() {
            AppError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["referencePhone", "status"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_verifier_default() {
        assert_eq!(verifier_or_default(None), "System");
        assert_eq!(verifier_or_default(Some("  ")), "System");
        assert_eq!(verifier_or_default(Some("Priya")), "Priya");
    }

    #[test]
    fn test_open_verifications() {
        let stats = VerificationStats {
            total: 10,
            pending: 3,
            under_verification: 2,
            verified: 4,
            rejected: 1,
        };
        assert_eq!(stats.open(), 5);
    }
}
