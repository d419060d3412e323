use async_trait::async_trait;
use portal_common::events::{
    ApplicationSubmittedEvent, Binding, Delivery, EventHandler, JobPostedEvent,
    APPLICATION_EXCHANGE, APPLICATION_SUBMITTED_KEY, JOB_EXCHANGE, JOB_POSTED_KEY,
};
use tracing::{info, warn};

use crate::notifier::Notifier;

pub const NOTIFICATION_QUEUE: &str = "notification-queue";
pub const JOB_NOTIFICATION_QUEUE: &str = "job-notification-queue";

pub const APPLICATION_SUBMITTED_TITLE: &str = "Application Submitted Successfully";

pub fn bindings() -> Vec<Binding> {
    vec![
        Binding::new(NOTIFICATION_QUEUE, APPLICATION_EXCHANGE, APPLICATION_SUBMITTED_KEY),
        Binding::new(JOB_NOTIFICATION_QUEUE, JOB_EXCHANGE, JOB_POSTED_KEY),
    ]
}

pub fn application_submitted_message(job_id: i64) -> String {
    format!(
        "Your application for job #{job_id} has been submitted successfully. \
         You will be notified once the employer reviews your application."
    )
}

pub struct NotificationListener {
    notifier: Notifier,
}

impl NotificationListener {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }

    async fn on_application_submitted(&self, event: ApplicationSubmittedEvent) -> anyhow::Result<()> {
        info!(
            application_id = event.application_id,
            job_id = event.job_id,
            "Received application submitted event"
        );
        self.notifier
            .send_in_app(
                event.applicant_id,
                APPLICATION_SUBMITTED_TITLE,
                &application_submitted_message(event.job_id),
                Some(event.application_id.to_string()),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for NotificationListener {
    async fn handle(&self, queue: &str, delivery: &Delivery) -> anyhow::Result<()> {
        match queue {
            NOTIFICATION_QUEUE => {
                self.on_application_submitted(delivery.decode()?).await
            }
            JOB_NOTIFICATION_QUEUE => {
                let event: JobPostedEvent = delivery.decode()?;
                info!(
                    job_id = event.job_id,
                    title = %event.title,
                    company = %event.company,
                    "Job posted"
                );
                Ok(())
            }
            other => {
                warn!(queue = other, "No handler for queue");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use portal_common::events::dispatch;

    use crate::notifier::tests::notifier;
    use crate::store::tests::MemoryStore;

    fn delivery(exchange: &str, key: &str, payload: serde_json::Value) -> Delivery {
        Delivery {
            exchange: exchange.into(),
            routing_key: key.into(),
            payload: serde_json::to_vec(&payload).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_application_submitted_creates_in_app_notification() {
        let store = Arc::new(MemoryStore::default());
        let listener = NotificationListener::new(notifier(store.clone()));

        let delivered = dispatch(
            &bindings(),
            &listener,
            &delivery(
                APPLICATION_EXCHANGE,
                APPLICATION_SUBMITTED_KEY,
                serde_json::json!({"applicationId": 31, "jobId": 8, "applicantId": 5}),
            ),
        )
        .await;
        assert_eq!(delivered, 1);

        let rows = store.snapshot();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.user_id, 5);
        assert_eq!(row.kind, "IN_APP");
        assert_eq!(row.status, "SENT");
        assert_eq!(row.title, "Application Submitted Successfully");
        assert_eq!(
            row.message,
            "Your application for job #8 has been submitted successfully. \
             You will be notified once the employer reviews your application."
        );
        assert_eq!(row.related_entity_id.as_deref(), Some("31"));
    }

    #[tokio::test]
    async fn test_job_posted_only_logs() {
        let store = Arc::new(MemoryStore::default());
        let listener = NotificationListener::new(notifier(store.clone()));

        let delivered = dispatch(
            &bindings(),
            &listener,
            &delivery(
                JOB_EXCHANGE,
                JOB_POSTED_KEY,
                serde_json::json!({"jobId": 1, "title": "Dev", "company": "Acme", "location": "Pune", "category": null}),
            ),
        )
        .await;
        assert_eq!(delivered, 1);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_an_error() {
        let store = Arc::new(MemoryStore::default());
        let listener = NotificationListener::new(notifier(store.clone()));
        let result = listener
            .handle(
                NOTIFICATION_QUEUE,
                &delivery(APPLICATION_EXCHANGE, APPLICATION_SUBMITTED_KEY, serde_json::json!({"jobId": "x"})),
            )
            .await;
        assert!(result.is_err());
        assert!(store.snapshot().is_empty());
    }
}
