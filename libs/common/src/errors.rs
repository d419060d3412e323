use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Platform-wide error catalogue. Every error body carries one of these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InternalServerError,
    ValidationError,
    ResourceNotFound,
    BadRequest,

    InvalidCredentials,
    TokenExpired,
    TokenInvalid,
    Unauthorized,
    AccountDisabled,
    EmailAlreadyExists,
    OtpInvalid,
    OtpExpired,

    UserNotFound,
    UserAlreadyExists,
    ProfileUpdateFailed,

    JobNotFound,
    JobExpired,
    JobClosed,
    UnauthorizedJobAccess,

    ApplicationNotFound,
    AlreadyApplied,
    ApplicationWithdrawn,
    CannotApply,

    SearchFailed,
    InvalidSearchCriteria,

    NotificationSendFailed,
    InvalidNotificationType,

    ConsultantNotFound,
    ConsultantAlreadyExists,
    DuplicateResource,
    OperationNotAllowed,
}

impl ErrorCode {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCode::InternalServerError => "ERR-1000",
            ErrorCode::ValidationError => "ERR-1001",
            ErrorCode::ResourceNotFound => "ERR-1002",
            ErrorCode::BadRequest => "ERR-1003",
            ErrorCode::InvalidCredentials => "ERR-1100",
            ErrorCode::TokenExpired => "ERR-1101",
            ErrorCode::TokenInvalid => "ERR-1102",
            ErrorCode::Unauthorized => "ERR-1103",
            ErrorCode::AccountDisabled => "ERR-1104",
            ErrorCode::EmailAlreadyExists => "ERR-1105",
            ErrorCode::OtpInvalid => "ERR-1106",
            ErrorCode::OtpExpired => "ERR-1107",
            ErrorCode::UserNotFound => "ERR-1200",
            ErrorCode::UserAlreadyExists => "ERR-1201",
            ErrorCode::ProfileUpdateFailed => "ERR-1202",
            ErrorCode::JobNotFound => "ERR-1300",
            ErrorCode::JobExpired => "ERR-1301",
            ErrorCode::JobClosed => "ERR-1302",
            ErrorCode::UnauthorizedJobAccess => "ERR-1303",
            ErrorCode::ApplicationNotFound => "ERR-1400",
            ErrorCode::AlreadyApplied => "ERR-1401",
            ErrorCode::ApplicationWithdrawn => "ERR-1402",
            ErrorCode::CannotApply => "ERR-1403",
            ErrorCode::SearchFailed => "ERR-1500",
            ErrorCode::InvalidSearchCriteria => "ERR-1501",
            ErrorCode::NotificationSendFailed => "ERR-1600",
            ErrorCode::InvalidNotificationType => "ERR-1601",
            ErrorCode::ConsultantNotFound => "ERR-1700",
            ErrorCode::ConsultantAlreadyExists => "ERR-1701",
            ErrorCode::DuplicateResource => "ERR-1702",
            ErrorCode::OperationNotAllowed => "ERR-1703",
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::InternalServerError => "Internal server error",
            ErrorCode::ValidationError => "Validation failed",
            ErrorCode::ResourceNotFound => "Resource not found",
            ErrorCode::BadRequest => "Bad request",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::Unauthorized => "Unauthorized access",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::EmailAlreadyExists => "Email already registered",
            ErrorCode::OtpInvalid => "Invalid OTP",
            ErrorCode::OtpExpired => "OTP has expired",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UserAlreadyExists => "User already exists",
            ErrorCode::ProfileUpdateFailed => "Failed to update profile",
            ErrorCode::JobNotFound => "Job not found",
            ErrorCode::JobExpired => "Job posting has expired",
            ErrorCode::JobClosed => "Job posting is closed",
            ErrorCode::UnauthorizedJobAccess => "Unauthorized to access this job",
            ErrorCode::ApplicationNotFound => "Application not found",
            ErrorCode::AlreadyApplied => "Already applied to this job",
            ErrorCode::ApplicationWithdrawn => "Application has been withdrawn",
            ErrorCode::CannotApply => "Cannot apply to this job",
            ErrorCode::SearchFailed => "Search operation failed",
            ErrorCode::InvalidSearchCriteria => "Invalid search criteria",
            ErrorCode::NotificationSendFailed => "Failed to send notification",
            ErrorCode::InvalidNotificationType => "Invalid notification type",
            ErrorCode::ConsultantNotFound => "Consultant not found",
            ErrorCode::ConsultantAlreadyExists => "Consultant already exists",
            ErrorCode::DuplicateResource => "Resource already exists",
            ErrorCode::OperationNotAllowed => "Operation not allowed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_value: Option<Value>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rejected_value: None,
        }
    }

    pub fn rejected(mut self, value: impl Into<Value>) -> Self {
        self.rejected_value = Some(value.into());
        self
    }
}

/// Wire shape of every error response across the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,
}

impl ApiErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error_code: code.code().to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
            path: None,
            field_errors: None,
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("{message}")]
    BadRequest { code: ErrorCode, message: String },

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{message}")]
    Conflict { code: ErrorCode, message: String },

    #[error("{message}")]
    Unauthorized { code: ErrorCode, message: String },

    #[error("{message}")]
    Forbidden { code: ErrorCode, message: String },

    #[error("{message}")]
    ServerError { code: ErrorCode, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            code,
            message: message.into(),
        }
    }

    pub fn forbidden(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Forbidden {
            code,
            message: message.into(),
        }
    }

    pub fn server_error(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::ServerError {
            code,
            message: message.into(),
        }
    }

    /// The catalogue code this error renders with.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::ServerError { code, .. } => *code,
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::Database(_) | AppError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::ServerError { .. } | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            AppError::Validation(errors) => {
                let mut body = ApiErrorResponse::new(code, "Validation failed");
                body.field_errors = Some(errors);
                body
            }
            AppError::ServerError { message, .. } => {
                tracing::error!(code = code.code(), "Server error: {message}");
                ApiErrorResponse::new(code, message)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                ApiErrorResponse::new(code, "A database error occurred")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ApiErrorResponse::new(code, "An internal server error occurred")
            }
            AppError::NotFound { message, .. }
            | AppError::BadRequest { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Forbidden { message, .. } => ApiErrorResponse::new(code, message),
        };

        (status, Json(body)).into_response()
    }
}
