use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::mailer::{EmailMessage, Mailer};
use crate::models::{NewNotification, NotificationRow, NotificationStatus, NotificationType};
use crate::store::NotificationStore;

/// Records notifications and drives email delivery.
#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn NotificationStore>,
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl Notifier {
    pub fn new(store: Arc<dyn NotificationStore>, mailer: Arc<dyn Mailer>, from: impl Into<String>) -> Self {
        Self {
            store,
            mailer,
            from: from.into(),
        }
    }

    pub fn store(&self) -> &dyn NotificationStore {
        self.store.as_ref()
    }

    /// In-app notifications are delivered by being stored.
    pub async fn send_in_app(
        &self,
        user_id: i64,
        title: &str,
        message: &str,
        related_entity_id: Option<String>,
    ) -> Result<NotificationRow, sqlx::Error> {
        let row = self
            .store
            .insert(NewNotification {
                user_id,
                kind: NotificationType::InApp,
                title: title.to_string(),
                message: message.to_string(),
                related_entity_id,
                status: NotificationStatus::Sent,
                email: None,
                sent_at: Some(Utc::now()),
            })
            .await?;
        info!(user_id, notification_id = row.id, "In-app notification created");
        Ok(row)
    }

    /// Stores PENDING, then SENT or FAILED depending on the mailer.
    pub async fn send_email(
        &self,
        user_id: i64,
        email: &str,
        title: &str,
        message: &str,
        related_entity_id: Option<String>,
    ) -> Result<NotificationStatus, sqlx::Error> {
        let row = self
            .store
            .insert(NewNotification {
                user_id,
                kind: NotificationType::Email,
                title: title.to_string(),
                message: message.to_string(),
                related_entity_id,
                status: NotificationStatus::Pending,
                email: Some(email.to_string()),
                sent_at: None,
            })
            .await?;
        info!(notification_id = row.id, "Email notification created");

        let outgoing = EmailMessage {
            from: self.from.clone(),
            to: email.to_string(),
            subject: title.to_string(),
            body: message.to_string(),
        };
        match self.mailer.send(&outgoing).await {
            Ok(()) => {
                self.store.mark_sent(row.id, Utc::now()).await?;
                info!(notification_id = row.id, "Email sent");
                Ok(NotificationStatus::Sent)
            }
            Err(e) => {
                error!(notification_id = row.id, error = %e, "Failed to send email");
                self.store.mark_failed(row.id, &e.to_string()).await?;
                Ok(NotificationStatus::Failed)
            }
        }
    }
}
