use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use portal_common::validation::ValidationErrors;
use portal_common::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::FullTime => "FULL_TIME",
            JobType::PartTime => "PART_TIME",
            JobType::Contract => "CONTRACT",
            JobType::Internship => "INTERNSHIP",
            JobType::Freelance => "FREELANCE",
        }
    }

    /// Unknown or missing values fall back to full time.
    pub fn parse_or_default(raw: Option<&str>) -> JobType {
        match raw.map(|r| r.trim().to_ascii_uppercase()).as_deref() {
            Some("PART_TIME") => JobType::PartTime,
            Some("CONTRACT") => JobType::Contract,
            Some("INTERNSHIP") => JobType::Internship,
            Some("FREELANCE") => JobType::Freelance,
            _ => JobType::FullTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Active,
    Closed,
    Expired,
    Draft,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Active => "ACTIVE",
            JobStatus::Closed => "CLOSED",
            JobStatus::Expired => "EXPIRED",
            JobStatus::Draft => "DRAFT",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub company_logo_url: Option<String>,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub salary: Option<String>,
    pub min_salary: Option<i32>,
    pub max_salary: Option<i32>,
    pub currency: Option<String>,
    pub experience: Option<String>,
    pub languages: Option<String>,
    pub industry: Option<String>,
    pub functional_area: Option<String>,
    pub experience_level: Option<String>,
    pub employment_type: Option<String>,
    pub joining_period: Option<String>,
    pub company_docs: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub job_type: String,
    pub featured: bool,
    pub status: String,
    pub employer_id: i64,
    pub views: i32,
    pub applications_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub company_logo_url: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub salary: Option<String>,
    pub min_salary: Option<i32>,
    pub max_salary: Option<i32>,
    pub currency: Option<String>,
    pub experience: Option<String>,
    pub languages: Option<String>,
    pub industry: Option<String>,
    pub functional_area: Option<String>,
    pub experience_level: Option<String>,
    pub employment_type: Option<String>,
    pub joining_period: Option<String>,
    pub company_docs: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub job_type: Option<String>,
    pub featured: Option<bool>,
    pub expires_at: Option<String>,
}

/// A validated posting ready for insertion.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub request: JobRequest,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub featured: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl JobRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = ValidationErrors::new();
        v.required("title", self.title.as_deref(), "Title is required");
        v.required("company", self.company.as_deref(), "Company is required");
        v.required("location", self.location.as_deref(), "Location is required");
        v.into_result()
    }

    pub fn into_new_job(self) -> Result<NewJob, AppError> {
        self.validate()?;

        let expires_at = self.expires_at.as_deref().and_then(parse_local_date_time);
        Ok(NewJob {
            title: self.title.clone().unwrap_or_default().trim().to_string(),
            company: self.company.clone().unwrap_or_default().trim().to_string(),
            location: self.location.clone().unwrap_or_default().trim().to_string(),
            job_type: JobType::parse_or_default(self.job_type.as_deref()),
            featured: self.featured.unwrap_or(false),
            expires_at,
            request: self,
        })
    }
}

/// ISO local date-time (`2025-03-31T18:00:00`), read as UTC. Invalid input is logged and dropped.
pub fn parse_local_date_time(raw: &str) -> Option<DateTime<Utc>> {
    match raw.trim().parse::<NaiveDateTime>() {
        Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
        Err(e) => {
            warn!(value = raw, error = %e, "Invalid expiry date format");
            None
        }
    }
}

/// Query parameters of `GET /api/jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub experience: Option<String>,
    pub min_salary: Option<i32>,
    pub max_salary: Option<i32>,
    pub sort: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCardResponse {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub category: Option<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub featured: bool,
    pub is_saved: bool,
    pub is_applied: bool,
    pub applications_count: i32,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&JobRow> for JobCardResponse {
    fn from(job: &JobRow) -> Self {
        JobCardResponse {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            category: job.category.clone(),
            salary: job.salary.clone(),
            experience: job.experience.clone(),
            featured: job.featured,
            is_saved: false,
            is_applied: false,
            applications_count: job.applications_count,
            views: job.views,
            created_at: job.created_at,
            expires_at: job.expires_at,
        }
    }
}

/// Lightweight listing row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub category: Option<String>,
    pub experience: Option<String>,
    pub languages: Option<String>,
    pub salary_display_text: Option<String>,
    pub min_salary: Option<i32>,
    pub max_salary: Option<i32>,
    pub job_type: String,
    pub featured: bool,
    pub is_saved: bool,
    pub is_applied: bool,
    pub applications_count: i32,
    pub posted_date: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl JobListResponse {
    pub fn new(job: JobRow, saved: &BTreeSet<i64>, applied: &BTreeSet<i64>) -> Self {
        JobListResponse {
            is_saved: saved.contains(&job.id),
            is_applied: applied.contains(&job.id),
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            city: job.city,
            state: job.state,
            category: job.category,
            experience: job.experience,
            languages: job.languages,
            salary_display_text: job.salary,
            min_salary: job.min_salary,
            max_salary: job.max_salary,
            job_type: job.job_type,
            featured: job.featured,
            applications_count: job.applications_count,
            posted_date: job.created_at,
            expires_at: job.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub display_text: String,
}

impl LocationDto {
    pub fn from_job(job: &JobRow) -> Self {
        let city = non_blank(&job.city).map(str::to_string);
        let state = non_blank(&job.state).map(str::to_string);
        let display_text = match (&city, &state) {
            (Some(c), Some(s)) => format!("{c}, {s}"),
            (Some(c), None) => c.clone(),
            _ => job.location.clone(),
        };
        LocationDto {
            city: city.or_else(|| Some(job.location.clone())),
            state,
            country: non_blank(&job.country).unwrap_or("India").to_string(),
            display_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryDto {
    pub display_text: Option<String>,
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub currency: String,
}

impl SalaryDto {
    pub fn from_job(job: &JobRow) -> Self {
        let currency = non_blank(&job.currency).unwrap_or("INR").to_ascii_uppercase();
        let display_text = non_blank(&job.salary)
            .map(str::to_string)
            .or_else(|| salary_range_text(&currency, job.min_salary, job.max_salary));
        SalaryDto {
            display_text,
            min: job.min_salary,
            max: job.max_salary,
            currency,
        }
    }
}

fn salary_range_text(currency: &str, min: Option<i32>, max: Option<i32>) -> Option<String> {
    let symbol = match currency {
        "INR" => "₹".to_string(),
        other => format!("{other} "),
    };
    match (min, max) {
        (Some(min), Some(max)) => Some(format!("{symbol}{min} - {symbol}{max}")),
        (Some(min), None) => Some(format!("{symbol}{min}+")),
        (None, Some(max)) => Some(format!("Up to {symbol}{max}")),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetailResponse {
    pub id: i64,
    pub title: String,
    pub company_name: String,
    pub company_logo_url: Option<String>,
    pub location: String,
    pub location_dto: LocationDto,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub functional_area: Option<String>,
    pub salary: Option<String>,
    pub salary_dto: SalaryDto,
    pub experience: Option<String>,
    pub experience_level: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub job_type: String,
    pub employment_type: Option<String>,
    pub joining_period: Option<String>,
    pub company_docs: Option<String>,
    pub languages: Option<String>,
    pub featured: bool,
    pub views: i32,
    pub applications_count: i32,
    pub vacancies: i32,
    pub is_saved: bool,
    pub is_applied: bool,
    pub status: String,
    pub posted_date: DateTime<Utc>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl JobDetailResponse {
    pub fn new(job: JobRow, is_saved: bool, is_applied: bool) -> Self {
        JobDetailResponse {
            location_dto: LocationDto::from_job(&job),
            salary_dto: SalaryDto::from_job(&job),
            id: job.id,
            title: job.title,
            company_name: job.company,
            company_logo_url: job.company_logo_url,
            location: job.location,
            category: job.category,
            industry: job.industry,
            functional_area: job.functional_area,
            salary: job.salary,
            experience: job.experience,
            experience_level: job.experience_level,
            description: job.description,
            requirements: job.requirements,
            benefits: job.benefits,
            job_type: job.job_type,
            employment_type: job.employment_type,
            joining_period: job.joining_period,
            company_docs: job.company_docs,
            languages: job.languages,
            featured: job.featured,
            views: job.views,
            applications_count: job.applications_count,
            vacancies: 1,
            is_saved,
            is_applied,
            status: job.status,
            posted_date: job.created_at,
            application_deadline: job.expires_at,
            expires_at: job.expires_at,
        }
    }
}

/// Internal summary consumed by the application service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobBasicInfo {
    pub job_id: i64,
    pub status: String,
    pub application_deadline: Option<DateTime<Utc>>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn job_row(id: i64) -> JobRow {
        let created = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        JobRow {
            id,
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            company_logo_url: None,
            location: "Bangalore".into(),
            city: None,
            state: None,
            country: None,
            category: Some("IT".into()),
            salary: None,
            min_salary: Some(600000),
            max_salary: Some(1200000),
            currency: None,
            experience: Some("2-4 years".into()),
            languages: None,
            industry: None,
            functional_area: None,
            experience_level: None,
            employment_type: None,
            joining_period: None,
            company_docs: None,
            description: None,
            requirements: None,
            benefits: None,
            job_type: "FULL_TIME".into(),
            featured: false,
            status: "ACTIVE".into(),
            employer_id: 7,
            views: 3,
            applications_count: 1,
            created_at: created,
            updated_at: created,
            expires_at: None,
        }
    }

    #[test]
    fn test_job_type_parse_falls_back_to_full_time() {
        assert_eq!(JobType::parse_or_default(Some("contract")), JobType::Contract);
        assert_eq!(JobType::parse_or_default(Some("Freelance")), JobType::Freelance);
        assert_eq!(JobType::parse_or_default(Some("gig")), JobType::FullTime);
        assert_eq!(JobType::parse_or_default(None), JobType::FullTime);
    }

    #[test]
    fn test_new_job_requires_title_company_location() {
        let err = JobRequest {
            title: Some("  ".into()),
            ..Default::default()
        }
        .into_new_job()
        .unwrap_err();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["title", "company", "location"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_job_ignores_bad_expiry() {
        let job = JobRequest {
            title: Some("Designer".into()),
            company: Some("Acme".into()),
            location: Some("Pune".into()),
            job_type: Some("internship".into()),
            expires_at: Some("31/03/2025".into()),
            ..Default::default()
        }
        .into_new_job()
        .unwrap();
        assert_eq!(job.job_type, JobType::Internship);
        assert!(job.expires_at.is_none());
        assert!(!job.featured);
    }

    #[test]
    fn test_parse_local_date_time() {
        assert_eq!(
            parse_local_date_time("2025-03-31T18:00:00"),
            Some(Utc.with_ymd_and_hms(2025, 3, 31, 18, 0, 0).unwrap())
        );
        assert_eq!(parse_local_date_time("2025-03-31"), None);
    }

    #[test]
    fn test_salary_text_built_from_range_when_missing() {
        let dto = SalaryDto::from_job(&job_row(1));
        assert_eq!(dto.display_text.as_deref(), Some("₹600000 - ₹1200000"));
        assert_eq!(dto.currency, "INR");
    }

    #[test]
    fn test_salary_text_prefers_stored_display() {
        let mut job = job_row(1);
        job.salary = Some("6-12 LPA".into());
        assert_eq!(SalaryDto::from_job(&job).display_text.as_deref(), Some("6-12 LPA"));
    }

    #[test]
    fn test_salary_text_for_open_ranges() {
        assert_eq!(salary_range_text("INR", Some(500), None).as_deref(), Some("₹500+"));
        assert_eq!(salary_range_text("USD", None, Some(900)).as_deref(), Some("Up to USD 900"));
        assert_eq!(salary_range_text("INR", None, None), None);
    }

    #[test]
    fn test_location_dto_defaults() {
        let dto = LocationDto::from_job(&job_row(1));
        assert_eq!(dto.city.as_deref(), Some("Bangalore"));
        assert_eq!(dto.country, "India");
        assert_eq!(dto.display_text, "Bangalore");

        let mut job = job_row(1);
        job.city = Some("Mysuru".into());
        job.state = Some("Karnataka".into());
        assert_eq!(LocationDto::from_job(&job).display_text, "Mysuru, Karnataka");
    }

    #[test]
    fn test_list_response_flags() {
        let saved = BTreeSet::from([1]);
        let applied = BTreeSet::from([2]);
        let first = JobListResponse::new(job_row(1), &saved, &applied);
        let second = JobListResponse::new(job_row(2), &saved, &applied);
        assert!(first.is_saved && !first.is_applied);
        assert!(!second.is_saved && second.is_applied);
    }

    #[test]
    fn test_detail_response_deadline_mirrors_expiry() {
        let mut job = job_row(4);
        job.expires_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        let detail = JobDetailResponse::new(job, true, false);
        assert_eq!(detail.vacancies, 1);
        assert_eq!(detail.application_deadline, detail.expires_at);
        assert!(detail.is_saved);
    }
}
