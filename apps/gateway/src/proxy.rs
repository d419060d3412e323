//! Prefix routing table and the HTTP client that forwards to services.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{HeaderValue, Request, Response, StatusCode},
};
use bytes::Bytes;
use tracing::debug;

use crate::config::Upstreams;

/// Upper bound on a buffered request body.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub const GATEWAY_HEADER_VALUE: &str = "Elowen-API-Gateway";

const HOP_BY_HOP: &[&str] = &[
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "keep-alive",
    "upgrade",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Auth,
    User,
    Job,
    Application,
    Search,
    Notification,
    Consultant,
}

impl Service {
    pub fn name(self) -> &'static str {
        match self {
            Service::Auth => "auth-service",
            Service::User => "user-service",
            Service::Job => "job-service",
            Service::Application => "application-service",
            Service::Search => "search-service",
            Service::Notification => "notification-service",
            Service::Consultant => "consultant-service",
        }
    }

    pub fn base_url(self, upstreams: &Upstreams) -> &str {
        match self {
            Service::Auth => &upstreams.auth,
            Service::User => &upstreams.user,
            Service::Job => &upstreams.job,
            Service::Application => &upstreams.application,
            Service::Search => &upstreams.search,
            Service::Notification => &upstreams.notification,
            Service::Consultant => &upstreams.consultant,
        }
    }
}

const ROUTES: &[(&str, Service)] = &[
    ("/auth", Service::Auth),
    ("/users", Service::User),
    ("/profile", Service::User),
    ("/api/jobs", Service::Job),
    ("/jobs", Service::Job),
    ("/categories", Service::Job),
    ("/applications", Service::Application),
    ("/apply", Service::Application),
    ("/search", Service::Search),
    ("/notifications", Service::Notification),
    ("/api/consultants", Service::Consultant),
];

fn under_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn resolve_service(path: &str) -> Option<Service> {
    ROUTES
        .iter()
        .find(|(prefix, _)| under_prefix(path, prefix))
        .map(|(_, service)| *service)
}

/// Forwards requests to services with `reqwest` and converts the reply back.
#[derive(Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
}

impl ServiceClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    pub async fn forward(&self, base_url: &str, request: Request<Body>) -> Result<Response<Body>> {
        let target_url = match request.uri().query() {
            Some(query) => format!("{}{}?{}", base_url, request.uri().path(), query),
            None => format!("{}{}", base_url, request.uri().path()),
        };

        let (parts, body) = request.into_parts();
        let body: Bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .context("Failed to read request body")?;

        let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
            .context("Unsupported HTTP method")?;
        let mut outbound = self.client.request(method, &target_url);

        for (name, value) in parts.headers.iter() {
            if !HOP_BY_HOP.contains(&name.as_str()) {
                outbound = outbound.header(name.as_str(), value.as_bytes());
            }
        }
        if !body.is_empty() {
            outbound = outbound.body(body);
        }

        debug!(target_url = %target_url, "Forwarding request");
        let upstream = outbound.send().await.context("Upstream request failed")?;

        let status = StatusCode::from_u16(upstream.status().as_u16())
            .context("Upstream returned an invalid status")?;
        let mut response = Response::builder().status(status);
        for (name, value) in upstream.headers().iter() {
            if !HOP_BY_HOP.contains(&name.as_str()) {
                response = response.header(name.as_str(), value.as_bytes());
            }
        }
        response = response.header(
            portal_common::headers::GATEWAY,
            HeaderValue::from_static(GATEWAY_HEADER_VALUE),
        );

        let bytes = upstream.bytes().await.context("Failed to read upstream body")?;
        response
            .body(Body::from(bytes))
            .context("Failed to build response")
    }
}
