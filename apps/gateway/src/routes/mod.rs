pub mod health;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use portal_common::errors::{ApiErrorResponse, AppError, ErrorCode};
use tracing::error;

use crate::middleware::{jwt_filter, request_logging};
use crate::proxy::resolve_service;
use crate::state::GatewayState;

/// Fallback: forwards every non-local path to the owning service.
async fn proxy_handler(State(state): State<GatewayState>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();

    let Some(service) = resolve_service(&path) else {
        return AppError::not_found(
            ErrorCode::ResourceNotFound,
            format!("No route found for path: {path}"),
        )
        .into_response();
    };

    let base_url = service.base_url(&state.upstreams).to_string();
    match state.client.forward(&base_url, request).await {
        Ok(response) => response,
        Err(e) => {
            error!(
                service = service.name(),
                base_url = %base_url,
                error = %e,
                "Failed to forward request to service"
            );
            let mut body = ApiErrorResponse::new(
                ErrorCode::InternalServerError,
                format!("{} is unavailable", service.name()),
            );
            body.path = Some(path);
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .fallback(proxy_handler)
        .layer(middleware::from_fn_with_state(state.clone(), jwt_filter))
        .layer(middleware::from_fn(request_logging))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{http::HeaderMap, routing::any};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::{tests::token_for, JwtVerifier};
    use crate::config::Upstreams;
    use crate::proxy::ServiceClient;

    const SECRET: &str = "test-secret";

    /// Upstream that echoes the path and identity headers it received.
    async fn spawn_echo_upstream() -> String {
        async fn echo(headers: HeaderMap, request: Request<Body>) -> Json<Value> {
            let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
            Json(json!({
                "path": request.uri().path(),
                "query": request.uri().query(),
                "userId": get("x-user-id"),
                "email": get("x-user-email"),
                "role": get("x-user-role"),
                "requestId": get("x-request-id"),
            }))
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(any(echo));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn state_with(base: &str) -> GatewayState {
        GatewayState {
            verifier: Arc::new(JwtVerifier::new(SECRET)),
            upstreams: Arc::new(Upstreams {
                auth: base.to_string(),
                user: base.to_string(),
                job: base.to_string(),
                application: base.to_string(),
                notification: base.to_string(),
                search: base.to_string(),
                consultant: base.to_string(),
            }),
            client: ServiceClient::new(5).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = build_router(state_with("http://127.0.0.1:1"));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = build_router(state_with("http://127.0.0.1:1"));
        let response = app
            .oneshot(Request::get("/api/jobs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["errorCode"], "ERR-1103");
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let app = build_router(state_with("http://127.0.0.1:1"));
        let response = app
            .oneshot(
                Request::get("/api/jobs")
                    .header("Authorization", "Basic abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_signature_is_unauthorized() {
        let app = build_router(state_with("http://127.0.0.1:1"));
        let token = token_for("wrong-secret", "1", 60);
        let response = app
            .oneshot(
                Request::get("/api/jobs")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["errorCode"], "ERR-1102");
    }

    #[tokio::test]
    async fn test_valid_token_forwards_identity_headers() {
        let base = spawn_echo_upstream().await;
        let app = build_router(state_with(&base));
        let token = token_for(SECRET, "42", 60);

        let response = app
            .oneshot(
                Request::get("/api/jobs?page=1&size=5")
                    .header("Authorization", format!("Bearer {token}"))
                    .header("X-User-Id", "999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-gateway").unwrap(),
            "Elowen-API-Gateway"
        );
        let body = json_body(response).await;
        assert_eq!(body["path"], "/api/jobs");
        assert_eq!(body["query"], "page=1&size=5");
        assert_eq!(body["userId"], "42");
        assert_eq!(body["role"], "JOB_SEEKER");
        assert!(body["requestId"].is_string());
    }

    #[tokio::test]
    async fn test_public_auth_route_is_forwarded_without_token() {
        let base = spawn_echo_upstream().await;
        let app = build_router(state_with(&base));

        let response = app
            .oneshot(
                Request::post("/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"email":"a@b.com","password":"secret1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["path"], "/auth/login");
        assert!(body["userId"].is_null());
    }

    #[tokio::test]
    async fn test_public_route_drops_client_identity_headers() {
        let base = spawn_echo_upstream().await;
        let app = build_router(state_with(&base));

        let response = app
            .oneshot(
                Request::post("/auth/register")
                    .header("content-type", "application/json")
                    .header("X-User-Id", "1")
                    .header("X-User-Email", "admin@elowen.io")
                    .header("X-User-Role", "ADMIN")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["path"], "/auth/register");
        assert!(body["userId"].is_null());
        assert!(body["email"].is_null());
        assert!(body["role"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_prefix_is_not_found() {
        let app = build_router(state_with("http://127.0.0.1:1"));
        let token = token_for(SECRET, "42", 60);
        let response = app
            .oneshot(
                Request::get("/internal/jobs/1/is-active")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        // Port 1 is never listening.
        let app = build_router(state_with("http://127.0.0.1:1"));
        let token = token_for(SECRET, "42", 60);
        let response = app
            .oneshot(
                Request::get("/search/jobs")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
