use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use portal_common::errors::{AppError, ErrorCode};
use portal_common::headers::{REQUEST_ID, USER_EMAIL, USER_ID, USER_ROLE};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::is_public_endpoint;
use crate::state::GatewayState;

/// Tags each request with `X-Request-Id` and logs method, path, status and latency.
pub async fn request_logging(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let header_value = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = header_value.clone() {
        request
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID), value);
    }

    info!("Gateway Request [{request_id}] {method} {path}");

    let mut response = next.run(request).await;

    info!(
        "Gateway Response [{request_id}] {} completed in {} ms",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );

    if let Some(value) = header_value {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID), value);
    }
    response
}

/// Identity headers only ever come from a verified token.
fn strip_identity(request: &mut Request) {
    let headers = request.headers_mut();
    for name in [USER_ID, USER_EMAIL, USER_ROLE] {
        headers.remove(name);
    }
}

fn set_header(request: &mut Request, name: &'static str, value: Option<&str>) {
    if let Some(v) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
        request
            .headers_mut()
            .insert(HeaderName::from_static(name), v);
    }
}

/// Validates the bearer token on non-public paths and propagates identity headers.
pub async fn jwt_filter(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    strip_identity(&mut request);

    if is_public_endpoint(&path) {
        return next.run(request).await;
    }

    let Some(auth_header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        debug!(path = %path, "Missing Authorization header");
        return AppError::unauthorized(ErrorCode::Unauthorized, "Missing Authorization header")
            .into_response();
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        warn!(path = %path, "Invalid Authorization header format");
        return AppError::unauthorized(
            ErrorCode::TokenInvalid,
            "Authorization header must be 'Bearer <token>'",
        )
        .into_response();
    };

    let claims = match state.verifier.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(path = %path, error = %e, "JWT verification failed");
            return AppError::unauthorized(ErrorCode::TokenInvalid, "Invalid or expired token")
                .into_response();
        }
    };

    set_header(&mut request, USER_ID, Some(&claims.sub));
    set_header(&mut request, USER_EMAIL, claims.email.as_deref());
    set_header(&mut request, USER_ROLE, claims.role.as_deref());

    debug!(user_id = %claims.sub, path = %path, "JWT verified, identity headers added");
    next.run(request).await
}
