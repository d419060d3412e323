//! Persistence for `notifications`, behind a trait so delivery logic can run without Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_common::pagination::PageRequest;
use sqlx::PgPool;

use crate::models::{NewNotification, NotificationRow, NotificationStatus};

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> Result<NotificationRow, sqlx::Error>;

    async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> Result<(), sqlx::Error>;

    /// Records the failure and bumps `retry_count`.
    async fn mark_failed(&self, id: i64, error_message: &str) -> Result<(), sqlx::Error>;

    /// Newest first.
    async fn page_for_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<NotificationRow>, i64), sqlx::Error>;

    /// `None` when the notification does not exist or belongs to someone else.
    async fn mark_read(&self, id: i64, user_id: i64) -> Result<Option<NotificationRow>, sqlx::Error>;
}

pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, n: NewNotification) -> Result<NotificationRow, sqlx::Error> {
        sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications
                (user_id, type, title, message, related_entity_id, status, email, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(n.user_id)
        .bind(n.kind.as_str())
        .bind(&n.title)
        .bind(&n.message)
        .bind(&n.related_entity_id)
        .bind(n.status.as_str())
        .bind(&n.email)
        .bind(n.sent_at)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE notifications SET status = $2, sent_at = $3, error_message = NULL WHERE id = $1")
            .bind(id)
            .bind(NotificationStatus::Sent.as_str())
            .bind(sent_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_failed(&self, id: i64, error_message: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notifications SET status = $2, error_message = $3, retry_count = retry_count + 1 WHERE id = $1",
        )
        .bind(id)
        .bind(NotificationStatus::Failed.as_str())
        .bind(error_message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn page_for_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<NotificationRow>, i64), sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((rows, total))
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<Option<NotificationRow>, sqlx::Error> {
        sqlx::query_as::<_, NotificationRow>(
            r#"
            UPDATE notifications
            SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub rows: Mutex<Vec<NotificationRow>>,
    }

    impl MemoryStore {
        pub(crate) fn snapshot(&self) -> Vec<NotificationRow> {
            self.rows.lock().unwrap().clone()
        }

        fn update(&self, id: i64, f: impl FnOnce(&mut NotificationRow)) {
            if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|r| r.id == id) {
                f(row);
            }
        }
    }

    #[async_trait]
    impl NotificationStore for MemoryStore {
        async fn insert(&self, n: NewNotification) -> Result<NotificationRow, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let row = NotificationRow {
                id: rows.len() as i64 + 1,
                user_id: n.user_id,
                kind: n.kind.as_str().to_string(),
                title: n.title,
                message: n.message,
                related_entity_id: n.related_entity_id,
                status: n.status.as_str().to_string(),
                email: n.email,
                phone: None,
                retry_count: 0,
                error_message: None,
                sent_at: n.sent_at,
                read_at: None,
                created_at: Utc::now(),
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> Result<(), sqlx::Error> {
            self.update(id, |row| {
                row.status = NotificationStatus::Sent.as_str().to_string();
                row.sent_at = Some(sent_at);
            });
            Ok(())
        }

        async fn mark_failed(&self, id: i64, error_message: &str) -> Result<(), sqlx::Error> {
            self.update(id, |row| {
                row.status = NotificationStatus::Failed.as_str().to_string();
                row.error_message = Some(error_message.to_string());
                row.retry_count += 1;
            });
            Ok(())
        }

        async fn page_for_user(
            &self,
            user_id: i64,
            page: PageRequest,
        ) -> Result<(Vec<NotificationRow>, i64), sqlx::Error> {
            let mut mine: Vec<_> = self
                .snapshot()
                .into_iter()
                .filter(|r| r.user_id == user_id)
                .collect();
            mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            let total = mine.len() as i64;
            let rows = mine
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.size as usize)
                .collect();
            Ok((rows, total))
        }

        async fn mark_read(&self, id: i64, user_id: i64) -> Result<Option<NotificationRow>, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows
                .iter_mut()
                .find(|r| r.id == id && r.user_id == user_id)
                .map(|row| {
                    row.read_at.get_or_insert_with(Utc::now);
                    row.clone()
                }))
        }
    }
}
