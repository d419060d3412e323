//! Request field checks. Handlers collect failures in [`ValidationErrors`] and
//! return them all at once as a 400 with `fieldErrors`.

use crate::errors::{AppError, FieldError};

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// True when `value` is all ASCII digits with length in `min..=max`.
pub fn is_digits(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str, rejected: Option<&str>) {
        let mut error = FieldError::new(field, message);
        if let Some(value) = rejected {
            error = error.rejected(value);
        }
        self.errors.push(error);
    }

    pub fn required(&mut self, field: &str, value: Option<&str>, message: &str) {
        if is_blank(value) {
            self.add(field, message, None);
        }
    }

    pub fn length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize, message: &str) {
        if let Some(v) = value {
            let len = v.chars().count();
            if len < min || len > max {
                self.add(field, message, Some(v));
            }
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            if !is_valid_email(v) {
                self.add(field, "Email should be valid", Some(v));
            }
        }
    }

    pub fn digits(&mut self, field: &str, value: Option<&str>, min: usize, max: usize, message: &str) {
        if let Some(v) = value {
            if !is_digits(v, min, max) {
                self.add(field, message, Some(v));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@mail.co.in"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user@example."));
    }

    #[test]
    fn test_digits() {
        assert!(is_digits("9876543210", 10, 10));
        assert!(!is_digits("98765", 10, 10));
        assert!(!is_digits("98765abcde", 10, 10));
        assert!(is_digits("560001", 6, 10));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut v = ValidationErrors::new();
        v.required("title", Some("  "), "Title is required");
        v.email("email", Some("bad"));
        v.length("fullName", Some("A"), 2, 255, "Full name must be between 2 and 255 characters");
        v.digits("phone", None, 10, 10, "Phone must be 10 digits");
        let err = v.into_result().unwrap_err();
        match err {
            AppError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["title", "email", "fullName"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
