//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GateConfig;

/// A single semantic problem found in a config.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("capture.max_body_bytes must be greater than zero")]
    ZeroCaptureLimit,

    #[error("rate_limit.sweep.interval_secs must be greater than zero")]
    ZeroSweepInterval,

    #[error("rate_limit.refill_rate_per_sec must be a non-negative number")]
    InvalidRefillRate,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check a parsed config for semantic problems, collecting every error.
///
/// A zero burst capacity (always reject) and a zero refill rate (no
/// replenishment) are both valid limiter configurations.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.capture.enabled && config.capture.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroCaptureLimit);
    }

    if config.rate_limit.sweep.enabled && config.rate_limit.sweep.interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }

    if !config.rate_limit.refill_rate_per_sec.is_finite()
        || config.rate_limit.refill_rate_per_sec < 0.0
    {
        errors.push(ValidationError::InvalidRefillRate);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
