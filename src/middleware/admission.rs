//! Admission control middleware stage.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::limiter::LimiterRegistry;
use crate::middleware::client_key::{self, ClientKey};
use crate::observability::metrics;

/// State for the admission stage, injected at router construction.
pub struct AdmissionState {
    pub registry: Arc<LimiterRegistry>,
}

/// Reject or forward a request based on its client key's token bucket.
///
/// A rejected request terminates here with 429 and an empty body; the
/// downstream stages never run and no exchange record is emitted. An
/// admitted request carries its resolved [`ClientKey`] in extensions.
pub async fn admission_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AdmissionState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key::resolve(request.headers(), addr);

    if state.registry.check(&key) {
        request.extensions_mut().insert(ClientKey(key));
        next.run(request).await
    } else {
        tracing::warn!(client_key = %key, "rate limit exceeded");
        metrics::record_rate_limited();
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        response
    }
}
