pub mod candidate;
pub mod consultant;
pub mod dashboard;
pub mod document;
pub mod pool;
pub mod verification;

use portal_common::{AppError, ErrorCode};

/// Upper-case string enums stored as VARCHAR and sent as their names.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Case-insensitive.
            pub fn parse(raw: &str) -> Option<Self> {
                let upper = raw.trim().to_ascii_uppercase();
                Self::ALL.iter().copied().find(|v| v.as_str() == upper)
            }
        }
    };
}

string_enum!(HiringLevel {
    Fresher => "FRESHER",
    Entry => "ENTRY",
    Mid => "MID",
    Senior => "SENIOR",
    Executive => "EXECUTIVE",
});

impl HiringLevel {
    /// Accepts the labels the mobile app sends. Anything unrecognised becomes MID.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "JUNIOR" => HiringLevel::Entry,
            "MID_LEVEL" => HiringLevel::Mid,
            "LEAD" => HiringLevel::Executive,
            other => HiringLevel::parse(other).unwrap_or(HiringLevel::Mid),
        }
    }
}

string_enum!(PoolStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    New => "NEW",
});

string_enum!(Gender {
    Male => "MALE",
    Female => "FEMALE",
    Other => "OTHER",
});

string_enum!(CandidateAvailability {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    New => "NEW",
    Deployed => "DEPLOYED",
});

string_enum!(VerificationStatus {
    New => "NEW",
    UnderVerification => "UNDER_VERIFICATION",
    PoliceVerified => "POLICE_VERIFIED",
    HealthCheckRequired => "HEALTH_CHECK_REQUIRED",
    Verified => "VERIFIED",
    Rejected => "REJECTED",
});

string_enum!(DocumentType {
    GstCertificate => "GST_CERTIFICATE",
    CertificateOfIncorporation => "CERTIFICATE_OF_INCORPORATION",
    Pan => "PAN",
    EpfoRegistrationCertificate => "EPFO_REGISTRATION_CERTIFICATE",
    EsicRegistration => "ESIC_REGISTRATION",
    LabourLicense => "LABOUR_LICENSE",
    StateSpecificLabourWelfareRegistration => "STATE_SPECIFIC_LABOUR_WELFARE_REGISTRATION",
});

string_enum!(DocumentStatus {
    Pending => "PENDING",
    Verified => "VERIFIED",
    Rejected => "REJECTED",
});

/// Parses an enum taken from a path or query parameter. Unknown values are a 400.
pub fn parse_param<T>(raw: &str, label: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, AppError> {
    parse(raw).ok_or_else(|| {
        AppError::bad_request(ErrorCode::BadRequest, format!("Invalid {label}: {raw}"))
    })
}

/// Overwrites `slot` only when a new value was supplied.
pub(crate) fn patch<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

pub(crate) fn patch_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// `part / whole * 100`, or 0 when there is nothing to measure.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hiring_level_labels() {
        assert_eq!(HiringLevel::from_label("junior"), HiringLevel::Entry);
        assert_eq!(HiringLevel::from_label("MID_LEVEL"), HiringLevel::Mid);
        assert_eq!(HiringLevel::from_label("Lead"), HiringLevel::Executive);
        assert_eq!(HiringLevel::from_label("senior"), HiringLevel::Senior);
        assert_eq!(HiringLevel::from_label("FRESHER"), HiringLevel::Fresher);
        assert_eq!(HiringLevel::from_label("intern"), HiringLevel::Mid);
    }

    #[test]
    fn test_enum_names_round_trip_through_serde() {
        let json = serde_json::to_string(&VerificationStatus::UnderVerification).unwrap();
        assert_eq!(json, "\"UNDER_VERIFICATION\"");
        let parsed: DocumentType = serde_json::from_str("\"PAN\"").unwrap();
        assert_eq!(parsed, DocumentType::Pan);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(CandidateAvailability::parse(" deployed "), Some(CandidateAvailability::Deployed));
        assert_eq!(PoolStatus::parse("archived"), None);
        assert_eq!(DocumentType::ALL.len(), 7);
    }

    #[test]
    fn test_parse_param_rejects_unknown() {
        let err = parse_param("BUSY", "availability", CandidateAvailability::parse).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid availability: BUSY");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 4), 75.0);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_patch_only_overwrites_supplied_values() {
        let mut name = "Old".to_string();
        patch(&mut name, None);
        assert_eq!(name, "Old");
        patch(&mut name, Some("New".to_string()));
        assert_eq!(name, "New");

        let mut city = Some("Pune".to_string());
        patch_opt(&mut city, None);
        assert_eq!(city.as_deref(), Some("Pune"));
    }
}
