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
        .route("/applications", post(handlers::handle_submit))
        .route(
            "/applications/my-applications",
            get(handlers::handle_my_applications),
        )
        .route(
            "/applications/job/:job_id",
            get(handlers::handle_job_applications),
        )
        .route(
            "/applications/:application_id/status",
            patch(handlers::handle_update_status),
        )
        // Service-to-service
        .route(
            "/internal/applications/batch-check",
            post(handlers::handle_batch_check),
        )
        .route("/internal/applications/check", get(handlers::handle_check))
        .route(
            "/internal/applications/job/:job_id/count",
            get(handlers::handle_count),
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
    use portal_common::events::{
        ApplicationSubmittedEvent, InMemoryEventBus, APPLICATION_EXCHANGE,
        APPLICATION_SUBMITTED_KEY,
    };
    use tower::ServiceExt;

    use crate::applications::tests::{application_row, FakeApplications};
    use crate::job_client::tests::FakeJobs;

    struct Harness {
        state: AppState,
        store: Arc<FakeApplications>,
        jobs: Arc<FakeJobs>,
        bus: Arc<InMemoryEventBus>,
    }

    fn harness(jobs: FakeJobs, store: FakeApplications) -> Harness {
        let store = Arc::new(store);
        let jobs = Arc::new(jobs);
        let bus = Arc::new(InMemoryEventBus::new(16));
        Harness {
            state: AppState {
                store: store.clone(),
                events: bus.clone(),
                jobs: jobs.clone(),
                max_page_size: 50,
            },
            store,
            jobs,
            bus,
        }
    }

    fn test_state(jobs: FakeJobs) -> AppState {
        harness(jobs, FakeApplications::default()).state
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn submit(body: &'static str) -> Request<Body> {
        Request::post("/applications")
            .header("content-type", "application/json")
            .header("x-user-id", "21")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_creates_application_and_publishes() {
        let h = harness(FakeJobs::with_active(&[7]), FakeApplications::default());
        let mut rx = h.bus.subscribe();

        let response = build_router(h.state)
            .oneshot(submit(r#"{"jobId":7,"coverLetter":"Keen to join"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["jobId"], 7);
        assert_eq!(body["applicantId"], 21);
        assert_eq!(body["status"], "PENDING");
        assert_eq!(body["coverLetter"], "Keen to join");

        assert_eq!(*h.jobs.incremented.lock().unwrap(), vec![7]);
        assert_eq!(h.store.rows.lock().unwrap().len(), 1);

        let delivery = rx.try_recv().unwrap();
        assert_eq!(delivery.exchange, APPLICATION_EXCHANGE);
        assert_eq!(delivery.routing_key, APPLICATION_SUBMITTED_KEY);
        let event: ApplicationSubmittedEvent = delivery.decode().unwrap();
        assert_eq!(
            event,
            ApplicationSubmittedEvent {
                application_id: 1,
                job_id: 7,
                applicant_id: 21,
            }
        );
    }

    #[tokio::test]
    async fn test_second_submit_conflicts() {
        let h = harness(
            FakeJobs::with_active(&[7]),
            FakeApplications::with(vec![application_row(1, 7, 21)]),
        );
        let mut rx = h.bus.subscribe();

        let response = build_router(h.state)
            .oneshot(submit(r#"{"jobId":7}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["errorCode"], "ERR-1401");
        assert!(h.jobs.incremented.lock().unwrap().is_empty());
        assert_eq!(h.store.rows.lock().unwrap().len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_counter_failure_does_not_fail_submit() {
        let h = harness(FakeJobs::without_counter(&[7]), FakeApplications::default());
        let mut rx = h.bus.subscribe();

        let response = build_router(h.state)
            .oneshot(submit(r#"{"jobId":7}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(h.jobs.incremented.lock().unwrap().is_empty());
        assert_eq!(rx.try_recv().unwrap().routing_key, APPLICATION_SUBMITTED_KEY);
    }

    #[tokio::test]
    async fn test_submit_to_closed_job() {
        let response = build_router(test_state(FakeJobs::with_active(&[1])))
            .oneshot(submit(r#"{"jobId":2}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errorCode"], "ERR-1403");
        assert_eq!(body["message"], "Job is not available for applications");
    }

    #[tokio::test]
    async fn test_submit_without_job_id() {
        let response = build_router(test_state(FakeJobs::with_active(&[1])))
            .oneshot(submit(r#"{"coverLetter":"hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["fieldErrors"][0]["field"], "jobId");
    }

    #[tokio::test]
    async fn test_my_applications_newest_first() {
        let h = harness(
            FakeJobs::default(),
            FakeApplications::with(vec![
                application_row(1, 7, 21),
                application_row(2, 8, 21),
                application_row(3, 9, 30),
            ]),
        );

        let response = build_router(h.state)
            .oneshot(
                Request::get("/applications/my-applications?size=10")
                    .header("x-user-id", "21")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalElements"], 2);
        // application_row backdates by id, so the lower id is newer
        assert_eq!(body["content"][0]["id"], 1);
        assert_eq!(body["content"][1]["id"], 2);
    }

    #[tokio::test]
    async fn test_rejection_keeps_reason() {
        let h = harness(
            FakeJobs::default(),
            FakeApplications::with(vec![application_row(3, 7, 21)]),
        );

        let response = build_router(h.state)
            .oneshot(
                Request::patch("/applications/3/status?status=REJECTED&rejectionReason=Role%20filled")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "REJECTED");
        assert_eq!(body["rejectionReason"], "Role filled");
        assert!(h.store.rows.lock().unwrap()[0].reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_status_update_for_missing_application() {
        let response = build_router(test_state(FakeJobs::default()))
            .oneshot(
                Request::patch("/applications/99/status?status=SHORTLISTED")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["errorCode"], "ERR-1400");
    }

    #[tokio::test]
    async fn test_unknown_status_rejected_before_lookup() {
        let response = build_router(test_state(FakeJobs::default()))
            .oneshot(
                Request::patch("/applications/3/status?status=HIRED")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_check_returns_applied_subset() {
        let h = harness(
            FakeJobs::default(),
            FakeApplications::with(vec![application_row(1, 7, 5), application_row(2, 8, 6)]),
        );
        let response = build_router(h.state)
            .oneshot(
                Request::post("/internal/applications/batch-check?userId=5")
                    .header("content-type", "application/json")
                    .body(Body::from("[7,8,9]"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([7]));
    }

    #[tokio::test]
    async fn test_batch_check_empty_input() {
        let response = build_router(test_state(FakeJobs::default()))
            .oneshot(
                Request::post("/internal/applications/batch-check?userId=5")
                    .header("content-type", "application/json")
                    .body(Body::from("[]"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }
}
