use chrono::{DateTime, NaiveDate, Utc};
use portal_common::validation::ValidationErrors;
use portal_common::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{patch, patch_opt, CandidateAvailability, Gender};

/// Candidate joined with the name of its pool.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub pool_id: i64,
    pub pool_name: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub position: Option<String>,
    pub work_experience: Option<String>,
    pub skills: Option<String>,
    pub pay_range_min: Option<String>,
    pub pay_range_max: Option<String>,
    pub availability: String,
    pub is_verified: bool,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub id_proof_url: Option<String>,
    pub current_job_id: Option<i64>,
    pub current_employer_id: Option<i64>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CandidateRow {
    pub fn is_deployed(&self) -> bool {
        self.availability == CandidateAvailability::Deployed.as_str()
    }

    /// DEPLOYED stamps `deployed_at`; ACTIVE and INACTIVE release the current placement.
    pub fn set_availability(&mut self, availability: CandidateAvailability, now: DateTime<Utc>) {
        self.availability = availability.as_str().to_string();
        match availability {
            CandidateAvailability::Deployed => self.deployed_at = Some(now),
            CandidateAvailability::Active | CandidateAvailability::Inactive => {
                self.current_job_id = None;
                self.current_employer_id = None;
                self.deployed_at = None;
            }
            CandidateAvailability::New => {}
        }
    }

    pub fn deploy(&mut self, job_id: i64, employer_id: i64, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.is_verified {
            return Err(AppError::bad_request(
                ErrorCode::OperationNotAllowed,
                "Cannot deploy unverified candidate",
            ));
        }
        self.set_availability(CandidateAvailability::Deployed, now);
        self.current_job_id = Some(job_id);
        self.current_employer_id = Some(employer_id);
        Ok(())
    }

    pub fn ensure_deletable(&self) -> Result<(), AppError> {
        if self.is_deployed() {
            return Err(AppError::bad_request(
                ErrorCode::OperationNotAllowed,
                "Cannot delete a deployed candidate. Please mark as inactive first.",
            ));
        }
        Ok(())
    }
}

/// Body for both adding and editing a candidate. Only `name` is required, and only on add.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRequest {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub position: Option<String>,
    pub work_experience: Option<String>,
    pub skills: Option<String>,
    pub pay_range_min: Option<String>,
    pub pay_range_max: Option<String>,
    pub availability: Option<String>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub id_proof_url: Option<String>,
}

/// Enum fields of a [`CandidateRequest`] after parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateChoices {
    pub gender: Option<Gender>,
    pub availability: Option<CandidateAvailability>,
}

impl CandidateRequest {
    pub fn validate(&self, creating: bool) -> Result<CandidateChoices, AppError> {
        let mut v = ValidationErrors::new();
        if creating {
            v.required("name", self.name.as_deref(), "Name is required");
        }
        v.length("name", self.name.as_deref(), 0, 100, "Name must not exceed 100 characters");
        v.digits(
            "phoneNumber",
            self.phone_number.as_deref(),
            10,
            15,
            "Phone number must be 10-15 digits",
        );
        v.email("email", self.email.as_deref());
        v.digits("pincode", self.pincode.as_deref(), 6, 10, "Pincode must be 6-10 digits");
        v.length(
            "position",
            self.position.as_deref(),
            0,
            100,
            "Position must not exceed 100 characters",
        );
        v.length(
            "workExperience",
            self.work_experience.as_deref(),
            0,
            50,
            "Work experience must not exceed 50 characters",
        );
        v.length("skills", self.skills.as_deref(), 0, 100, "Skills must not exceed 100 characters");

        let gender = self.gender.as_deref().and_then(|raw| {
            let parsed = Gender::parse(raw);
            if parsed.is_none() {
                v.add("gender", "Gender must be MALE, FEMALE or OTHER", Some(raw));
            }
            parsed
        });
        let availability = self.availability.as_deref().and_then(|raw| {
            let parsed = CandidateAvailability::parse(raw);
            if parsed.is_none() {
                v.add(
                    "availability",
                    "Availability must be ACTIVE, INACTIVE, NEW or DEPLOYED",
                    Some(raw),
                );
            }
            parsed
        });
        v.into_result()?;

        Ok(CandidateChoices {
            gender,
            availability,
        })
    }

    /// Fields written on edit. Availability goes through [`CandidateRow::set_availability`].
    pub fn apply_to(self, row: &mut CandidateRow, choices: CandidateChoices, now: DateTime<Utc>) {
        patch(&mut row.name, self.name);
        patch_opt(&mut row.date_of_birth, self.date_of_birth);
        patch_opt(&mut row.gender, choices.gender.map(|g| g.as_str().to_string()));
        patch_opt(&mut row.phone_number, self.phone_number);
        patch_opt(&mut row.email, self.email);
        patch_opt(&mut row.current_address, self.current_address);
        patch_opt(&mut row.permanent_address, self.permanent_address);
        patch_opt(&mut row.city, self.city);
        patch_opt(&mut row.state, self.state);
        patch_opt(&mut row.pincode, self.pincode);
        patch_opt(&mut row.position, self.position);
        patch_opt(&mut row.work_experience, self.work_experience);
        patch_opt(&mut row.skills, self.skills);
        patch_opt(&mut row.pay_range_min, self.pay_range_min);
        patch_opt(&mut row.pay_range_max, self.pay_range_max);
        patch_opt(&mut row.resume_url, self.resume_url);
        patch_opt(&mut row.photo_url, self.photo_url);
        patch_opt(&mut row.id_proof_url, self.id_proof_url);
        if let Some(availability) = choices.availability {
            row.set_availability(availability, now);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityParams {
    pub availability: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployParams {
    pub job_id: i64,
    pub employer_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub search_term: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub id: i64,
    pub pool_id: i64,
    pub pool_name: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub position: Option<String>,
    pub work_experience: Option<String>,
    pub skills: Option<String>,
    pub pay_range_min: Option<String>,
    pub pay_range_max: Option<String>,
    pub availability: String,
    pub is_verified: bool,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub id_proof_url: Option<String>,
    pub current_job_id: Option<i64>,
    pub current_employer_id: Option<i64>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CandidateRow> for CandidateResponse {
    fn from(row: CandidateRow) -> Self {
        CandidateResponse {
            id: row.id,
            pool_id: row.pool_id,
            pool_name: row.pool_name,
            name: row.name,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            phone_number: row.phone_number,
            email: row.email,
            current_address: row.current_address,
            permanent_address: row.permanent_address,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            position: row.position,
            work_experience: row.work_experience,
            skills: row.skills,
            pay_range_min: row.pay_range_min,
            pay_range_max: row.pay_range_max,
            availability: row.availability,
            is_verified: row.is_verified,
            resume_url: row.resume_url,
            photo_url: row.photo_url,
            id_proof_url: row.id_proof_url,
            current_job_id: row.current_job_id,
            current_employer_id: row.current_employer_id,
            deployed_at: row.deployed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
