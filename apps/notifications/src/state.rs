use crate::notifier::Notifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Notifier,
    pub max_page_size: i64,
}
