//! Identity headers propagated by the gateway after JWT verification.
//!
//! Services sit behind the gateway and trust these headers instead of
//! re-validating the bearer token.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::errors::{AppError, ErrorCode};

pub const USER_ID: &str = "x-user-id";
pub const USER_EMAIL: &str = "x-user-email";
pub const USER_ROLE: &str = "x-user-role";
pub const REQUEST_ID: &str = "x-request-id";
pub const CORRELATION_ID: &str = "x-correlation-id";
pub const GATEWAY: &str = "x-gateway";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Parses `X-User-Id` into a numeric user id.
pub fn user_id_from(headers: &HeaderMap) -> Option<i64> {
    header_str(headers, USER_ID).and_then(|v| v.parse::<i64>().ok())
}

/// Caller identity for endpoints that require authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = user_id_from(&parts.headers).ok_or_else(|| {
            AppError::unauthorized(
                ErrorCode::Unauthorized,
                "Missing or invalid X-User-Id header",
            )
        })?;

        Ok(AuthenticatedUser {
            id,
            email: header_str(&parts.headers, USER_EMAIL).map(str::to_string),
            role: header_str(&parts.headers, USER_ROLE).map(str::to_string),
        })
    }
}

/// Caller identity for endpoints that personalise output when a user is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaybeUser(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_id_from(&parts.headers)))
    }
}
