//! Edge admission control and traffic capture middleware.
//!
//! Wraps an axum application with two stages: per-client token-bucket
//! admission control and transparent request/response capture for an
//! observability sink.

pub mod capture;
pub mod config;
pub mod http;
pub mod limiter;
pub mod middleware;
pub mod observability;

pub use config::GateConfig;
pub use http::GateServer;
pub use limiter::LimiterRegistry;
