use std::sync::Arc;

use sqlx::PgPool;

use crate::jwt::TokenIssuer;
use crate::otp::OtpPolicy;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<TokenIssuer>,
    pub otp: OtpPolicy,
}
