//! Calls into the job service made while submitting an application.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait JobStatusClient: Send + Sync {
    /// `false` for closed, expired, draft and unknown jobs.
    async fn is_job_active(&self, job_id: i64) -> Result<bool, JobClientError>;

    async fn increment_application_count(&self, job_id: i64) -> Result<(), JobClientError>;
}

pub struct HttpJobStatusClient {
    client: Client,
    base_url: String,
}

impl HttpJobStatusClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, JobClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl JobStatusClient for HttpJobStatusClient {
    async fn is_job_active(&self, job_id: i64) -> Result<bool, JobClientError> {
        let active = self
            .client
            .get(format!("{}/internal/jobs/{job_id}/is-active", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<bool>()
            .await?;
        Ok(active)
    }

    async fn increment_application_count(&self, job_id: i64) -> Result<(), JobClientError> {
        self.client
            .post(format!(
                "{}/api/jobs/{job_id}/increment-applications",
                self.base_url
            ))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use axum::{extract::Path, routing::{get, post}, Json, Router};

    /// In-memory job service: a fixed set of active jobs, increments recorded.
    #[derive(Default)]
    pub(crate) struct FakeJobs {
        pub active: BTreeSet<i64>,
        pub fail: bool,
        pub fail_increment: bool,
        pub incremented: Mutex<Vec<i64>>,
    }

    impl FakeJobs {
        pub(crate) fn with_active(ids: &[i64]) -> Self {
            Self {
                active: ids.iter().copied().collect(),
                ..Default::default()
            }
        }

        /// Answers status checks but refuses to bump counters.
        pub(crate) fn without_counter(ids: &[i64]) -> Self {
            Self {
                fail_increment: true,
                ..Self::with_active(ids)
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    async fn refused() -> JobClientError {
        let err = Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        JobClientError::Http(err)
    }

    #[async_trait]
    impl JobStatusClient for FakeJobs {
        async fn is_job_active(&self, job_id: i64) -> Result<bool, JobClientError> {
            if self.fail {
                return Err(refused().await);
            }
            Ok(self.active.contains(&job_id))
        }

        async fn increment_application_count(&self, job_id: i64) -> Result<(), JobClientError> {
            if self.fail || self.fail_increment {
                return Err(refused().await);
            }
            self.incremented.lock().unwrap().push(job_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_http_client_paths() {
        let app = Router::new()
            .route(
                "/internal/jobs/:job_id/is-active",
                get(|Path(job_id): Path<i64>| async move { Json(job_id == 3) }),
            )
            .route(
                "/api/jobs/:job_id/increment-applications",
                post(|Path(_job_id): Path<i64>| async {}),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = HttpJobStatusClient::new(format!("http://{addr}"), 5).unwrap();
        assert!(client.is_job_active(3).await.unwrap());
        assert!(!client.is_job_active(4).await.unwrap());
        assert!(client.increment_application_count(3).await.is_ok());
    }

    #[tokio::test]
    async fn test_http_client_surfaces_error_status() {
        let app = Router::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = HttpJobStatusClient::new(format!("http://{addr}"), 5).unwrap();
        assert!(client.increment_application_count(9).await.is_err());
    }
}
