use chrono::{DateTime, Utc};
use portal_common::validation::ValidationErrors;
use portal_common::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{DocumentStatus, DocumentType};

#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub consultant_id: i64,
    pub document_type: String,
    pub document_name: String,
    pub document_url: String,
    pub document_number: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRow {
    /// VERIFIED stamps the reviewer and drops any old rejection; REJECTED keeps only the reason.
    pub fn apply_status(
        &mut self,
        status: DocumentStatus,
        rejection_reason: Option<String>,
        verified_by: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = status.as_str().to_string();
        match status {
            DocumentStatus::Verified => {
                self.verified_at = Some(now);
                self.verified_by = verified_by;
                self.rejection_reason = None;
            }
            DocumentStatus::Rejected => {
                self.rejection_reason = rejection_reason;
                self.verified_at = None;
                self.verified_by = None;
            }
            DocumentStatus::Pending => {
                self.rejection_reason = None;
                self.verified_at = None;
                self.verified_by = None;
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploadRequest {
    pub document_type: Option<String>,
    pub document_name: Option<String>,
    pub document_url: Option<String>,
    pub document_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub document_type: DocumentType,
    pub document_name: String,
    pub document_url: String,
    pub document_number: Option<String>,
}

impl DocumentUploadRequest {
    pub fn validate(self) -> Result<NewDocument, AppError> {
        let mut v = ValidationErrors::new();
        v.required("documentType", self.document_type.as_deref(), "Document type is required");
        v.required("documentName", self.document_name.as_deref(), "Document name is required");
        v.required("documentUrl", self.document_url.as_deref(), "Document URL is required");
        v.length(
            "documentName",
            self.document_name.as_deref(),
            0,
            200,
            "Document name must not exceed 200 characters",
        );
        v.length(
            "documentUrl",
            self.document_url.as_deref(),
            0,
            500,
            "Document URL must not exceed 500 characters",
        );
        v.length(
            "documentNumber",
            self.document_number.as_deref(),
            0,
            100,
            "Document number must not exceed 100 characters",
        );
        let document_type = match self.document_type.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                let parsed = DocumentType::parse(raw);
                if parsed.is_none() {
                    v.add("documentType", "Unknown document type", Some(raw));
                }
                parsed
            }
            _ => None,
        };
        v.into_result()?;

        // Required checks above guarantee these are present.
        match (document_type, self.document_name, self.document_url) {
            (Some(document_type), Some(document_name), Some(document_url)) => Ok(NewDocument {
                document_type,
                document_name: document_name.trim().to_string(),
                document_url: document_url.trim().to_string(),
                document_number: self.document_number,
            }),
            _ => Err(AppError::Internal(anyhow::anyhow!(
                "document upload passed validation without required fields"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatusParams {
    pub status: String,
    pub rejection_reason: Option<String>,
    #[serde(alias = "reviewedBy")]
    pub verified_by: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: i64,
    pub document_type: String,
    pub document_name: String,
    pub document_url: String,
    pub document_number: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for DocumentResponse {
    fn from(row: DocumentRow) -> Self {
        DocumentResponse {
            id: row.id,
            document_type: row.document_type,
            document_name: row.document_name,
            document_url: row.document_url,
            document_number: row.document_number,
            status: row.status,
            rejection_reason: row.rejection_reason,
            verified_at: row.verified_at,
            verified_by: row.verified_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn document_row() -> DocumentRow {
        let now = Utc::now();
        DocumentRow {
            id: 9,
            consultant_id: 1,
            document_type: DocumentType::Pan.as_str().into(),
            document_name: "PAN card".into(),
            document_url: "https://files.example.com/pan.pdf".into(),
            document_number: Some("ABCDE1234F".into()),
            status: DocumentStatus::Pending.as_str().into(),
            rejection_reason: None,
            verified_at: None,
            verified_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_upload_validation_reports_missing_fields() {
        match DocumentUploadRequest::default().validate().unwrap_err() {
            AppError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["documentType", "documentName", "documentUrl"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upload_rejects_unknown_type() {
        let req = DocumentUploadRequest {
            document_type: Some("PASSPORT".into()),
            document_name: Some("Passport".into()),
            document_url: Some("https://x".into()),
            document_number: None,
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_upload_parses_type() {
        let doc = DocumentUploadRequest {
            document_type: Some("gst_certificate".into()),
            document_name: Some(" GST ".into()),
            document_url: Some("https://files.example.com/gst.pdf".into()),
            document_number: None,
        }
        .validate()
        .unwrap();
        assert_eq!(doc.document_type, DocumentType::GstCertificate);
        assert_eq!(doc.document_name, "GST");
    }

    #[test]
    fn test_verify_stamps_and_clears_reason() {
        let now = Utc::now();
        let mut row = document_row();
        row.rejection_reason = Some("Blurry".into());
        row.apply_status(
            DocumentStatus::Verified,
            Some("ignored".into()),
            Some("Admin".into()),
            now,
        );
        assert_eq!(row.status, "VERIFIED");
        assert_eq!(row.verified_at, Some(now));
        assert_eq!(row.verified_by.as_deref(), Some("Admin"));
        assert_eq!(row.rejection_reason, None);
    }

    #[test]
    fn test_reject_keeps_reason_only() {
        let mut row = document_row();
        row.apply_status(DocumentStatus::Verified, None, Some("Admin".into()), Utc::now());
        row.apply_status(
            DocumentStatus::Rejected,
            Some("Expired".into()),
            Some("Admin".into()),
            Utc::now(),
        );
        assert_eq!(row.status, "REJECTED");
        assert_eq!(row.rejection_reason.as_deref(), Some("Expired"));
        assert_eq!(row.verified_at, None);
        assert_eq!(row.verified_by, None);
    }
}
