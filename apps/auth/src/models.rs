use chrono::{DateTime, Utc};
use portal_common::validation::ValidationErrors;
use portal_common::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    JobSeeker,
    Employer,
    Consultant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::JobSeeker => "JOB_SEEKER",
            Role::Employer => "EMPLOYER",
            Role::Consultant => "CONSULTANT",
        }
    }

    /// Lenient parse: unknown or missing roles register as job seekers.
    pub fn parse_or_default(raw: Option<&str>) -> Role {
        match raw.map(|r| r.trim().to_ascii_uppercase()).as_deref() {
            Some("EMPLOYER") => Role::Employer,
            Some("CONSULTANT") => Role::Consultant,
            _ => Role::JobSeeker,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AuthUserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: String,
    pub enabled: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub otp_code: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = ValidationErrors::new();
        v.required("fullName", self.full_name.as_deref(), "Full name is required");
        v.length(
            "fullName",
            self.full_name.as_deref().filter(|n| !n.trim().is_empty()),
            2,
            255,
            "Full name must be between 2 and 255 characters",
        );
        v.required("email", self.email.as_deref(), "Email is required");
        v.email("email", self.email.as_deref().filter(|e| !e.trim().is_empty()));
        v.required("password", self.password.as_deref(), "Password is required");
        v.length(
            "password",
            self.password.as_deref().filter(|p| !p.is_empty()),
            6,
            usize::MAX,
            "Password must be at least 6 characters",
        );
        v.digits(
            "phone",
            self.phone.as_deref().filter(|p| !p.is_empty()),
            10,
            10,
            "Phone number must be 10 digits",
        );
        v.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = ValidationErrors::new();
        v.required("email", self.email.as_deref(), "Email is required");
        v.email("email", self.email.as_deref().filter(|e| !e.trim().is_empty()));
        v.required("password", self.password.as_deref(), "Password is required");
        v.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub otp: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
}

impl From<&AuthUserRow> for UserSummary {
    fn from(user: &AuthUserRow) -> Self {
        UserSummary {
            id: user.id,
            // No display name is stored here; the profile service owns it.
            full_name: user.email.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            phone: user.phone.clone(),
            email_verified: user.email_verified,
            phone_verified: user.phone_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpSentResponse {
    pub message: &'static str,
    pub phone: String,
    pub otp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(full_name: &str, email: &str, password: &str, phone: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            full_name: Some(full_name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            phone: phone.map(str::to_string),
            role: None,
        }
    }

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_role_parse_defaults_to_job_seeker() {
        assert_eq!(Role::parse_or_default(None), Role::JobSeeker);
        assert_eq!(Role::parse_or_default(Some("recruiter")), Role::JobSeeker);
        assert_eq!(Role::parse_or_default(Some("employer")), Role::Employer);
        assert_eq!(Role::parse_or_default(Some(" CONSULTANT ")), Role::Consultant);
    }

    #[test]
    fn test_valid_registration() {
        assert!(register("Asha Rao", "asha@example.com", "secret1", Some("9876543210"))
            .validate()
            .is_ok());
        assert!(register("Asha Rao", "asha@example.com", "secret1", None)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_registration_field_rules() {
        let err = register("A", "not-an-email", "123", Some("12345"))
            .validate()
            .unwrap_err();
        assert_eq!(fields(err), vec!["fullName", "email", "password", "phone"]);
    }

    #[test]
    fn test_registration_missing_fields() {
        let req = RegisterRequest {
            full_name: None,
            email: None,
            password: None,
            phone: None,
            role: None,
        };
        assert_eq!(fields(req.validate().unwrap_err()), vec!["fullName", "email", "password"]);
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req = LoginRequest {
            email: Some("a@b.com".into()),
            password: None,
        };
        assert_eq!(fields(req.validate().unwrap_err()), vec!["password"]);
    }
}
