use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::config::Upstreams;
use crate::proxy::ServiceClient;

/// Shared gateway state injected into middleware and the proxy handler.
#[derive(Clone)]
pub struct GatewayState {
    pub verifier: Arc<JwtVerifier>,
    pub upstreams: Arc<Upstreams>,
    pub client: ServiceClient,
}
