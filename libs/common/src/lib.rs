pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod headers;
pub mod health;
pub mod pagination;
pub mod telemetry;
pub mod validation;

pub use errors::{AppError, ErrorCode, FieldError};
