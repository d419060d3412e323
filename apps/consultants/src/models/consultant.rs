use chrono::{DateTime, Utc};
use portal_common::validation::{is_blank, ValidationErrors};
use portal_common::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{patch, patch_opt, HiringLevel};

pub const PLACEHOLDER_COMPANY: &str = "Unnamed Company";
pub const PLACEHOLDER_CONTACT: &str = "Contact Person";

#[derive(Debug, Clone, FromRow)]
pub struct ConsultantRow {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub contact_person_name: String,
    pub phone_number: String,
    pub alternate_phone_number: Option<String>,
    pub email: String,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub profile_image_url: Option<String>,
    pub industries_served: Vec<String>,
    pub functional_areas: Vec<String>,
    pub hiring_levels: Vec<String>,
    pub geographical_coverage: Vec<String>,
    pub rating: f64,
    pub total_placements: i32,
    pub success_rate: f64,
    pub total_incentives_earned: i64,
    pub total_commission_earned: i64,
    pub pending_commission: i64,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_profile_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConsultantRow {
    /// Contact details, location and all four specialisation lists are filled in.
    pub fn has_complete_profile(&self) -> bool {
        let present = |value: Option<&str>| !is_blank(value);
        present(Some(&self.company_name))
            && present(Some(&self.contact_person_name))
            && present(Some(&self.phone_number))
            && present(Some(&self.email))
            && present(self.city.as_deref())
            && present(self.state.as_deref())
            && !self.industries_served.is_empty()
            && !self.functional_areas.is_empty()
            && !self.hiring_levels.is_empty()
            && !self.geographical_coverage.is_empty()
    }

    pub fn refresh_completeness(&mut self) {
        self.is_profile_complete = self.has_complete_profile();
    }

    pub fn completeness_percentage(&self) -> i32 {
        completeness_percentage(self.is_profile_complete)
    }
}

pub fn completeness_percentage(is_complete: bool) -> i32 {
    if is_complete {
        100
    } else {
        50
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsultantParams {
    pub user_id: i64,
    pub email: String,
    pub phone_number: String,
}

impl CreateConsultantParams {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = ValidationErrors::new();
        v.email("email", Some(&self.email));
        v.digits(
            "phoneNumber",
            Some(&self.phone_number),
            10,
            15,
            "Phone number must be 10-15 digits",
        );
        v.into_result()
    }
}

/// Partial profile update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub company_name: Option<String>,
    pub contact_person_name: Option<String>,
    pub phone_number: Option<String>,
    pub alternate_phone_number: Option<String>,
    pub email: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub profile_image_url: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = ValidationErrors::new();
        v.length(
            "companyName",
            self.company_name.as_deref(),
            1,
            200,
            "Company name must be between 1 and 200 characters",
        );
        v.length(
            "contactPersonName",
            self.contact_person_name.as_deref(),
            1,
            100,
            "Contact person name must be between 1 and 100 characters",
        );
        v.digits(
            "phoneNumber",
            self.phone_number.as_deref(),
            10,
            15,
            "Phone number must be 10-15 digits",
        );
        v.digits(
            "alternatePhoneNumber",
            self.alternate_phone_number.as_deref(),
            10,
            15,
            "Alternate phone number must be 10-15 digits",
        );
        v.email("email", self.email.as_deref());
        v.length(
            "currentAddress",
            self.current_address.as_deref(),
            0,
            200,
            "Current address must not exceed 200 characters",
        );
        v.length(
            "permanentAddress",
            self.permanent_address.as_deref(),
            0,
            200,
            "Permanent address must not exceed 200 characters",
        );
        v.length("city", self.city.as_deref(), 0, 100, "City must not exceed 100 characters");
        v.length("state", self.state.as_deref(), 0, 50, "State must not exceed 50 characters");
        v.length(
            "country",
            self.country.as_deref(),
            0,
            100,
            "Country must not exceed 100 characters",
        );
        v.digits("pincode", self.pincode.as_deref(), 6, 10, "Pincode must be 6-10 digits");
        v.length(
            "profileImageUrl",
            self.profile_image_url.as_deref(),
            0,
            500,
            "Profile image URL must not exceed 500 characters",
        );
        v.into_result()
    }

    pub fn apply_to(self, row: &mut ConsultantRow) {
        patch(&mut row.company_name, self.company_name);
        patch(&mut row.contact_person_name, self.contact_person_name);
        patch(&mut row.phone_number, self.phone_number);
        patch_opt(&mut row.alternate_phone_number, self.alternate_phone_number);
        patch(&mut row.email, self.email);
        patch_opt(&mut row.current_address, self.current_address);
        patch_opt(&mut row.permanent_address, self.permanent_address);
        patch_opt(&mut row.city, self.city);
        patch_opt(&mut row.state, self.state);
        patch_opt(&mut row.country, self.country);
        patch_opt(&mut row.pincode, self.pincode);
        patch_opt(&mut row.profile_image_url, self.profile_image_url);
        row.refresh_completeness();
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecializationsUpdate {
    pub industries_served: Option<Vec<String>>,
    pub functional_areas: Option<Vec<String>>,
    pub hiring_levels: Option<Vec<String>>,
    #[serde(alias = "geographicalCoverage")]
    pub geographic_coverage: Option<Vec<String>>,
}

fn non_empty(v: &mut ValidationErrors, field: &str, list: &Option<Vec<String>>, message: &str) {
    if list.as_ref().map_or(true, Vec::is_empty) {
        v.add(field, message, None);
    }
}

impl SpecializationsUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = ValidationErrors::new();
        non_empty(
            &mut v,
            "industriesServed",
            &self.industries_served,
            "At least one industry must be specified",
        );
        non_empty(
            &mut v,
            "functionalAreas",
            &self.functional_areas,
            "At least one functional area must be specified",
        );
        non_empty(
            &mut v,
            "hiringLevels",
            &self.hiring_levels,
            "At least one hiring level must be specified",
        );
        non_empty(
            &mut v,
            "geographicCoverage",
            &self.geographic_coverage,
            "At least one location must be specified",
        );
        v.into_result()
    }

    pub fn apply_to(self, row: &mut ConsultantRow) {
        patch(&mut row.industries_served, self.industries_served);
        patch(&mut row.functional_areas, self.functional_areas);
        patch(
            &mut row.hiring_levels,
            self.hiring_levels.map(|levels| {
                levels
                    .iter()
                    .map(|label| HiringLevel::from_label(label).as_str().to_string())
                    .collect()
            }),
        );
        patch(&mut row.geographical_coverage, self.geographic_coverage);
        row.refresh_completeness();
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantProfileResponse {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub contact_person_name: String,
    pub phone_number: String,
    pub alternate_phone_number: Option<String>,
    pub email: String,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub profile_image_url: Option<String>,
    pub industries_served: Vec<String>,
    pub functional_areas: Vec<String>,
    pub hiring_levels: Vec<String>,
    pub geographical_coverage: Vec<String>,
    pub rating: f64,
    pub total_placements: i32,
    pub success_rate: f64,
    pub total_incentives_earned: i64,
    pub total_commission_earned: i64,
    pub pending_commission: i64,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_profile_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConsultantRow> for ConsultantProfileResponse {
    fn from(row: ConsultantRow) -> Self {
        ConsultantProfileResponse {
            id: row.id,
            user_id: row.user_id,
            company_name: row.company_name,
            contact_person_name: row.contact_person_name,
            phone_number: row.phone_number,
            alternate_phone_number: row.alternate_phone_number,
            email: row.email,
            current_address: row.current_address,
            permanent_address: row.permanent_address,
            city: row.city,
            state: row.state,
            country: row.country,
            pincode: row.pincode,
            profile_image_url: row.profile_image_url,
            industries_served: row.industries_served,
            functional_areas: row.functional_areas,
            hiring_levels: row.hiring_levels,
            geographical_coverage: row.geographical_coverage,
            rating: row.rating,
            total_placements: row.total_placements,
            success_rate: row.success_rate,
            total_incentives_earned: row.total_incentives_earned,
            total_commission_earned: row.total_commission_earned,
            pending_commission: row.pending_commission,
            is_active: row.is_active,
            is_verified: row.is_verified,
            is_profile_complete: row.is_profile_complete,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
