//! Client key resolution.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Key under which a request's originator is rate limited and logged.
///
/// Stored in request extensions by the admission stage so the capture
/// stage sees the same resolution.
#[derive(Debug, Clone)]
pub struct ClientKey(pub String);

/// Resolve the client key for a request.
///
/// Prefers the first `X-Forwarded-For` entry, then `X-Real-Ip`, then the
/// transport remote address. Equal keys share one bucket by design.
pub fn resolve(headers: &HeaderMap, remote: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    remote.ip().to_string()
}
