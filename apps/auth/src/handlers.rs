use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use portal_common::db::is_unique_violation;
use portal_common::validation::is_blank;
use portal_common::{AppError, ErrorCode};
use tracing::{info, warn};

use crate::accounts::{self, NewAccount};
use crate::models::{
    AuthResponse, AuthUserRow, LoginRequest, OtpRequest, OtpSentResponse, RegisterRequest, Role,
    UserSummary, VerifyOtpRequest,
};
use crate::state::AppState;

fn auth_response(state: &AppState, user: &AuthUserRow) -> Result<AuthResponse, AppError> {
    let issued = state.tokens.issue(user.id, &user.email, &user.role)?;
    Ok(AuthResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_at: issued.expires_at,
        user: UserSummary::from(user),
    })
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized(
        ErrorCode::InvalidCredentials,
        ErrorCode::InvalidCredentials.default_message(),
    )
}

/// POST /auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate()?;

    let email = req.email.as_deref().unwrap_or_default().trim().to_string();
    let password = req.password.clone().unwrap_or_default();
    let phone = req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

    if accounts::email_exists(&state.db, &email).await? {
        return Err(AppError::conflict(
            ErrorCode::EmailAlreadyExists,
            ErrorCode::EmailAlreadyExists.default_message(),
        ));
    }
    if let Some(phone) = phone {
        if accounts::phone_exists(&state.db, phone).await? {
            return Err(AppError::conflict(
                ErrorCode::UserAlreadyExists,
                "Phone number already registered",
            ));
        }
    }

    let password_hash = accounts::hash_password(password).await?;
    let role = Role::parse_or_default(req.role.as_deref());
    let otp = phone.map(|_| state.otp.generate(Utc::now()));

    let user = accounts::insert(
        &state.db,
        NewAccount {
            email: &email,
            password_hash: &password_hash,
            phone,
            role,
            otp,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict(ErrorCode::UserAlreadyExists, "Email or phone already registered")
        } else {
            AppError::Database(e)
        }
    })?;

    info!(user_id = user.id, role = role.as_str(), "User registered");
    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;
    let email = req.email.as_deref().unwrap_or_default().trim();
    let password = req.password.clone().unwrap_or_default();

    let user = accounts::find_by_email(&state.db, email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !accounts::verify_password(password, user.password.clone()).await? {
        warn!(user_id = user.id, "Login failed: bad password");
        return Err(invalid_credentials());
    }
    if !user.enabled {
        return Err(AppError::forbidden(
            ErrorCode::AccountDisabled,
            ErrorCode::AccountDisabled.default_message(),
        ));
    }

    let (otp, expiry) = state.otp.generate(Utc::now());
    let user = accounts::record_login(&state.db, user.id, &otp, expiry).await?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(auth_response(&state, &user)?))
}

/// POST /auth/request-otp
pub async fn handle_request_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> Result<Json<OtpSentResponse>, AppError> {
    let phone = req
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::bad_request(ErrorCode::ValidationError, "Phone number is required"))?;

    let user = accounts::find_by_phone(&state.db, phone)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                ErrorCode::UserNotFound,
                format!("User not found with phone: {phone}"),
            )
        })?;

    let (otp, expiry) = state.otp.generate(Utc::now());
    accounts::store_otp(&state.db, user.id, &otp, expiry).await?;

    info!(user_id = user.id, "OTP issued");
    Ok(Json(OtpSentResponse {
        message: "OTP sent successfully",
        phone: phone.to_string(),
        otp,
    }))
}

/// POST /auth/verify-otp
pub async fn handle_verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let otp = req
        .otp
        .as_deref()
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| AppError::bad_request(ErrorCode::ValidationError, "OTP is required"))?;

    let user = if !is_blank(req.email.as_deref()) {
        accounts::find_by_email(&state.db, req.email.as_deref().unwrap_or_default().trim()).await?
    } else if !is_blank(req.phone.as_deref()) {
        accounts::find_by_phone(&state.db, req.phone.as_deref().unwrap_or_default().trim()).await?
    } else {
        return Err(AppError::bad_request(
            ErrorCode::BadRequest,
            "Either email or phone is required for OTP verification",
        ));
    };
    let user = user.ok_or_else(|| {
        AppError::not_found(ErrorCode::UserNotFound, ErrorCode::UserNotFound.default_message())
    })?;

    state
        .otp
        .check(user.otp_code.as_deref(), user.otp_expiry, otp, Utc::now())?;

    let user = accounts::complete_otp_verification(&state.db, user.id).await?;
    info!(user_id = user.id, "OTP verified");
    Ok(Json(auth_response(&state, &user)?))
}
