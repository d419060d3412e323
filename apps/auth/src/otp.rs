use chrono::{DateTime, Duration, Utc};
use portal_common::{AppError, ErrorCode};

/// Development OTP. No SMS provider is wired in, so every code is the same.
pub const DEV_OTP: &str = "123456";

#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    pub validity: Duration,
}

impl OtpPolicy {
    pub fn new(validity_minutes: i64) -> Self {
        Self {
            validity: Duration::minutes(validity_minutes),
        }
    }

    /// Returns the code and its expiry.
    pub fn generate(&self, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
        (DEV_OTP.to_string(), now + self.validity)
    }

    pub fn check(
        &self,
        stored: Option<&str>,
        expiry: Option<DateTime<Utc>>,
        provided: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let (Some(stored), Some(expiry)) = (stored, expiry) else {
            return Err(AppError::bad_request(
                ErrorCode::OtpInvalid,
                "No OTP generated for this user",
            ));
        };
        if now > expiry {
            return Err(AppError::bad_request(
                ErrorCode::OtpExpired,
                ErrorCode::OtpExpired.default_message(),
            ));
        }
        if stored != provided.trim() {
            return Err(AppError::bad_request(
                ErrorCode::OtpInvalid,
                ErrorCode::OtpInvalid.default_message(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sets_expiry() {
        let policy = OtpPolicy::new(10);
        let now = Utc::now();
        let (code, expiry) = policy.generate(now);
        assert_eq!(code, DEV_OTP);
        assert_eq!(expiry, now + Duration::minutes(10));
    }

    #[test]
    fn test_check_accepts_matching_code() {
        let policy = OtpPolicy::new(10);
        let now = Utc::now();
        let (code, expiry) = policy.generate(now);
        assert!(policy.check(Some(&code), Some(expiry), "123456", now).is_ok());
    }

    #[test]
    fn test_check_without_otp() {
        let err = OtpPolicy::new(10)
            .check(None, None, "123456", Utc::now())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OtpInvalid);
        assert_eq!(err.to_string(), "No OTP generated for this user");
    }

    #[test]
    fn test_check_expired() {
        let policy = OtpPolicy::new(10);
        let issued = Utc::now() - Duration::minutes(11);
        let (code, expiry) = policy.generate(issued);
        let err = policy
            .check(Some(&code), Some(expiry), &code, Utc::now())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OtpExpired);
    }

    #[test]
    fn test_check_mismatch() {
        let policy = OtpPolicy::new(10);
        let now = Utc::now();
        let (code, expiry) = policy.generate(now);
        let err = policy.check(Some(&code), Some(expiry), "000000", now).unwrap_err();
        assert_eq!(err.code(), ErrorCode::OtpInvalid);
    }
}
