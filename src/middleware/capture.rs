//! Capture/log middleware stage.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::capture::sink::CaptureSink;
use crate::capture::tee::{CaptureContext, TeeBody};
use crate::middleware::client_key::{self, ClientKey};
use crate::observability::metrics;

/// State for the capture stage, injected at router construction.
pub struct CaptureState {
    pub sink: Arc<dyn CaptureSink>,
    /// Upper bound on the buffered request body size.
    pub max_body_bytes: usize,
}

/// Observe the full request/response exchange without altering it.
///
/// The request body is materialized once and replayed to the handler from
/// its start; the response body is teed so the client receives the
/// handler's exact output while a copy accumulates for the sink. A body
/// that cannot be buffered abandons capture and fails the request before
/// the handler runs.
pub async fn capture_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<CaptureState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let client_key = request
        .extensions()
        .get::<ClientKey>()
        .map(|key| key.0.clone())
        .unwrap_or_else(|| client_key::resolve(request.headers(), addr));

    let uri = request.uri().to_string();
    let method = request.method().to_string();

    let (parts, body) = request.into_parts();
    let request_body = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(
                client_key = %client_key,
                uri = %uri,
                error = %err,
                "failed to buffer request body"
            );
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::BAD_REQUEST;
            return response;
        }
    };
    let request = Request::from_parts(parts, Body::from(request_body.clone()));

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    metrics::record_request(&method, parts.status.as_u16(), start);

    let context = CaptureContext {
        uri,
        method,
        client_key,
        response_status: parts.status.as_u16(),
        request_body,
        sink: Arc::clone(&state.sink),
    };
    Response::from_parts(parts, Body::new(TeeBody::new(body, context)))
}
