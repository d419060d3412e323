//! Credential storage for `auth_users`.

use anyhow::Context;
use chrono::{DateTime, Utc};
use portal_common::AppError;
use sqlx::PgPool;

use crate::models::{AuthUserRow, Role};

pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
    pub role: Role,
    pub otp: Option<(String, DateTime<Utc>)>,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<AuthUserRow>, AppError> {
    let user = sqlx::query_as::<_, AuthUserRow>("SELECT * FROM auth_users WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<AuthUserRow>, AppError> {
    let user = sqlx::query_as::<_, AuthUserRow>("SELECT * FROM auth_users WHERE phone = $1")
        .bind(phone)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM auth_users WHERE LOWER(email) = LOWER($1))",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn phone_exists(pool: &PgPool, phone: &str) -> Result<bool, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM auth_users WHERE phone = $1)")
            .bind(phone)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn insert(pool: &PgPool, account: NewAccount<'_>) -> Result<AuthUserRow, sqlx::Error> {
    let (otp_code, otp_expiry) = match account.otp {
        Some((code, expiry)) => (Some(code), Some(expiry)),
        None => (None, None),
    };

    sqlx::query_as::<_, AuthUserRow>(
        r#"
        INSERT INTO auth_users (email, password, phone, role, otp_code, otp_expiry)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(account.email)
    .bind(account.password_hash)
    .bind(account.phone)
    .bind(account.role.as_str())
    .bind(otp_code)
    .bind(otp_expiry)
    .fetch_one(pool)
    .await
}

/// Stores a fresh OTP and stamps `last_login`.
pub async fn record_login(
    pool: &PgPool,
    user_id: i64,
    otp_code: &str,
    otp_expiry: DateTime<Utc>,
) -> Result<AuthUserRow, AppError> {
    let user = sqlx::query_as::<_, AuthUserRow>(
        r#"
        UPDATE auth_users
        SET otp_code = $2, otp_expiry = $3, last_login = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(otp_code)
    .bind(otp_expiry)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn store_otp(
    pool: &PgPool,
    user_id: i64,
    otp_code: &str,
    otp_expiry: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query("UPDATE auth_users SET otp_code = $2, otp_expiry = $3 WHERE id = $1")
        .bind(user_id)
        .bind(otp_code)
        .bind(otp_expiry)
        .execute(pool)
        .await?;
    Ok(())
}

/// Consumes the OTP, marks the phone verified when one is on file, stamps `last_login`.
pub async fn complete_otp_verification(pool: &PgPool, user_id: i64) -> Result<AuthUserRow, AppError> {
    let user = sqlx::query_as::<_, AuthUserRow>(
        r#"
        UPDATE auth_users
        SET phone_verified = (phone_verified OR phone IS NOT NULL),
            otp_code = NULL,
            otp_expiry = NULL,
            last_login = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .context("Password hashing task panicked")?
        .context("Failed to hash password")?;
    Ok(hashed)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task panicked")?
        // A malformed stored hash counts as a mismatch.
        .unwrap_or(false);
    Ok(matches)
}
