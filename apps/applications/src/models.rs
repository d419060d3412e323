use chrono::{DateTime, Utc};
use portal_common::{AppError, ErrorCode, FieldError};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Shortlisted,
    InterviewScheduled,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Reviewing => "REVIEWING",
            ApplicationStatus::Shortlisted => "SHORTLISTED",
            ApplicationStatus::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Withdrawn => "WITHDRAWN",
        }
    }

    /// Case-insensitive; unknown values are a 400.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ApplicationStatus::Pending),
            "REVIEWING" => Ok(ApplicationStatus::Reviewing),
            "SHORTLISTED" => Ok(ApplicationStatus::Shortlisted),
            "INTERVIEW_SCHEDULED" => Ok(ApplicationStatus::InterviewScheduled),
            "ACCEPTED" => Ok(ApplicationStatus::Accepted),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            "WITHDRAWN" => Ok(ApplicationStatus::Withdrawn),
            _ => Err(AppError::bad_request(
                ErrorCode::BadRequest,
                format!("Invalid application status: {raw}"),
            )),
        }
    }

    /// Statuses an employer sets after looking at the application.
    pub fn is_review_outcome(self) -> bool {
        !matches!(self, ApplicationStatus::Pending | ApplicationStatus::Withdrawn)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: i64,
    pub job_id: i64,
    pub applicant_id: i64,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub job_id: Option<i64>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

impl ApplicationRequest {
    pub fn job_id(&self) -> Result<i64, AppError> {
        self.job_id.ok_or_else(|| {
            AppError::Validation(vec![FieldError::new("jobId", "Job ID is required")])
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateParams {
    pub status: String,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: i64,
    pub job_id: i64,
    pub applicant_id: i64,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<ApplicationRow> for ApplicationResponse {
    fn from(row: ApplicationRow) -> Self {
        ApplicationResponse {
            id: row.id,
            job_id: row.job_id,
            applicant_id: row.applicant_id,
            cover_letter: row.cover_letter,
            resume_url: row.resume_url,
            status: row.status,
            rejection_reason: row.rejection_reason,
            applied_at: row.applied_at,
            reviewed_at: row.reviewed_at,
        }
    }
}
