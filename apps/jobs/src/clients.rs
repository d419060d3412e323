//! Batch lookups against the user and application services.
//!
//! Listings must keep working when either dependency is down, so callers go
//! through [`saved_ids_or_empty`] / [`applied_ids_or_empty`], which degrade to
//! an empty set.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait SavedJobsClient: Send + Sync {
    async fn saved_job_ids(&self, user_id: i64, job_ids: &[i64]) -> Result<BTreeSet<i64>, ClientError>;
}

#[async_trait]
pub trait AppliedJobsClient: Send + Sync {
    async fn applied_job_ids(&self, user_id: i64, job_ids: &[i64]) -> Result<BTreeSet<i64>, ClientError>;
}

pub fn build_http_client(timeout_secs: u64) -> Result<Client, ClientError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

async fn batch_check(
    client: &Client,
    url: String,
    user_id: i64,
    job_ids: &[i64],
) -> Result<BTreeSet<i64>, ClientError> {
    let ids = client
        .post(url)
        .query(&[("userId", user_id)])
        .json(job_ids)
        .send()
        .await?
        .error_for_status()?
        .json::<BTreeSet<i64>>()
        .await?;
    Ok(ids)
}

/// `POST {user-service}/internal/saved-jobs/batch-check`
pub struct HttpSavedJobsClient {
    client: Client,
    base_url: String,
}

impl HttpSavedJobsClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SavedJobsClient for HttpSavedJobsClient {
    async fn saved_job_ids(&self, user_id: i64, job_ids: &[i64]) -> Result<BTreeSet<i64>, ClientError> {
        let url = format!("{}/internal/saved-jobs/batch-check", self.base_url);
        batch_check(&self.client, url, user_id, job_ids).await
    }
}

/// `POST {application-service}/internal/applications/batch-check`
pub struct HttpAppliedJobsClient {
    client: Client,
    base_url: String,
}

impl HttpAppliedJobsClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AppliedJobsClient for HttpAppliedJobsClient {
    async fn applied_job_ids(&self, user_id: i64, job_ids: &[i64]) -> Result<BTreeSet<i64>, ClientError> {
        let url = format!("{}/internal/applications/batch-check", self.base_url);
        batch_check(&self.client, url, user_id, job_ids).await
    }
}

pub async fn saved_ids_or_empty(
    client: &dyn SavedJobsClient,
    user_id: Option<i64>,
    job_ids: &[i64],
) -> BTreeSet<i64> {
    let Some(user_id) = user_id else {
        return BTreeSet::new();
    };
    if job_ids.is_empty() {
        return BTreeSet::new();
    }
    client.saved_job_ids(user_id, job_ids).await.unwrap_or_else(|e| {
        error!(user_id, error = %e, "Failed to fetch saved job ids from user-service, defaulting to empty set");
        BTreeSet::new()
    })
}

pub async fn applied_ids_or_empty(
    client: &dyn AppliedJobsClient,
    user_id: Option<i64>,
    job_ids: &[i64],
) -> BTreeSet<i64> {
    let Some(user_id) = user_id else {
        return BTreeSet::new();
    };
    if job_ids.is_empty() {
        return BTreeSet::new();
    }
    client.applied_job_ids(user_id, job_ids).await.unwrap_or_else(|e| {
        error!(user_id, error = %e, "Failed to fetch applied job ids from application-service, defaulting to empty set");
        BTreeSet::new()
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{extract::Query, routing::post, Json, Router};
    use serde::Deserialize;

    /// Answers with a fixed set, intersected with the requested ids.
    #[derive(Default)]
    pub(crate) struct FixedIds {
        pub ids: BTreeSet<i64>,
        pub calls: AtomicUsize,
    }

    impl FixedIds {
        pub(crate) fn new(ids: &[i64]) -> Self {
            Self {
                ids: ids.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn answer(&self, job_ids: &[i64]) -> BTreeSet<i64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            job_ids.iter().copied().filter(|id| self.ids.contains(id)).collect()
        }
    }

    #[async_trait]
    impl SavedJobsClient for FixedIds {
        async fn saved_job_ids(&self, _user_id: i64, job_ids: &[i64]) -> Result<BTreeSet<i64>, ClientError> {
            Ok(self.answer(job_ids))
        }
    }

    #[async_trait]
    impl AppliedJobsClient for FixedIds {
        async fn applied_job_ids(&self, _user_id: i64, job_ids: &[i64]) -> Result<BTreeSet<i64>, ClientError> {
            Ok(self.answer(job_ids))
        }
    }

    /// Always fails the way an unreachable service does.
    pub(crate) struct Unreachable;

    async fn unreachable_error() -> ClientError {
        // Port 1 is never listening in the test environment.
        let err = build_http_client(1)
            .unwrap()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        ClientError::Http(err)
    }

    #[async_trait]
    impl SavedJobsClient for Unreachable {
        async fn saved_job_ids(&self, _: i64, _: &[i64]) -> Result<BTreeSet<i64>, ClientError> {
            Err(unreachable_error().await)
        }
    }

    #[async_trait]
    impl AppliedJobsClient for Unreachable {
        async fn applied_job_ids(&self, _: i64, _: &[i64]) -> Result<BTreeSet<i64>, ClientError> {
            Err(unreachable_error().await)
        }
    }

    #[tokio::test]
    async fn test_no_identity_skips_lookup() {
        let client = FixedIds::new(&[1, 2]);
        assert!(saved_ids_or_empty(&client, None, &[1, 2]).await.is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_page_skips_lookup() {
        let client = FixedIds::new(&[1, 2]);
        assert!(applied_ids_or_empty(&client, Some(5), &[]).await.is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_returns_subset() {
        let client = FixedIds::new(&[2, 9]);
        let ids = saved_ids_or_empty(&client, Some(5), &[1, 2, 3]).await;
        assert_eq!(ids, BTreeSet::from([2]));
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty_set() {
        assert!(saved_ids_or_empty(&Unreachable, Some(5), &[1]).await.is_empty());
        assert!(applied_ids_or_empty(&Unreachable, Some(5), &[1]).await.is_empty());
    }

    #[derive(Deserialize)]
    struct UserIdQuery {
        #[serde(rename = "userId")]
        user_id: i64,
    }

    #[tokio::test]
    async fn test_http_client_posts_ids_and_reads_set() {
        let app = Router::new().route(
            "/internal/saved-jobs/batch-check",
            post(|Query(q): Query<UserIdQuery>, Json(ids): Json<Vec<i64>>| async move {
                assert_eq!(q.user_id, 42);
                Json(ids.into_iter().filter(|id| id % 2 == 0).collect::<BTreeSet<i64>>())
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = HttpSavedJobsClient::new(build_http_client(5).unwrap(), format!("http://{addr}"));
        let ids = client.saved_job_ids(42, &[1, 2, 3, 4]).await.unwrap();
        assert_eq!(ids, BTreeSet::from([2, 4]));
    }
}
