pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/notifications", get(handlers::handle_list))
        .route(
            "/notifications/:notification_id/read",
            patch(handlers::handle_mark_read),
        )
        // Service-to-service
        .route(
            "/internal/notifications/email",
            post(handlers::handle_send_email),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    use crate::notifier::tests::notifier;
    use crate::store::tests::MemoryStore;

    async fn seeded() -> (Arc<MemoryStore>, Router) {
        let store = Arc::new(MemoryStore::default());
        let notifier = notifier(store.clone());
        notifier.send_in_app(5, "First", "one", None).await.unwrap();
        notifier.send_in_app(6, "Other", "not yours", None).await.unwrap();
        notifier.send_in_app(5, "Second", "two", None).await.unwrap();
        let router = build_router(AppState {
            notifier,
            max_page_size: 50,
        });
        (store, router)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_only_returns_own_notifications() {
        let (_, router) = seeded().await;
        let response = router
            .oneshot(
                Request::get("/notifications?size=10")
                    .header("x-user-id", "5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalElements"], 2);
        let titles: Vec<_> = body["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"First".to_string()));
        assert!(titles.contains(&"Second".to_string()));
    }

    #[tokio::test]
    async fn test_mark_read_sets_read_at() {
        let (store, router) = seeded().await;
        let response = router
            .oneshot(
                Request::patch("/notifications/1/read")
                    .header("x-user-id", "5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["read"], true);
        assert!(store.snapshot()[0].read_at.is_some());
    }

    #[tokio::test]
    async fn test_cannot_mark_someone_elses_notification() {
        let (_, router) = seeded().await;
        let response = router
            .oneshot(
                Request::patch("/notifications/2/read")
                    .header("x-user-id", "5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_email_send() {
        let (store, router) = seeded().await;
        let response = router
            .oneshot(
                Request::post("/internal/notifications/email")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"userId":5,"email":"asha@example.com","title":"Shortlisted","message":"Good news"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_json(response).await["status"], "SENT");
        assert_eq!(store.snapshot().last().unwrap().kind, "EMAIL");
    }

    #[tokio::test]
    async fn test_internal_email_validation() {
        let (_, router) = seeded().await;
        let response = router
            .oneshot(
                Request::post("/internal/notifications/email")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"email":"asha@example.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["fieldErrors"].as_array().unwrap().len(), 3);
    }
}
