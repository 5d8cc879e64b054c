//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Traffic capture configuration.
    pub capture: CaptureConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Rate limiting configuration.
///
/// The two scalar limits apply to every newly created bucket; they are
/// not per-client-configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Tokens added per second to each bucket.
    pub refill_rate_per_sec: f64,

    /// Maximum tokens per bucket (burst size). Zero rejects everything.
    pub burst_capacity: u32,

    /// Idle bucket eviction settings.
    pub sweep: SweepConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            refill_rate_per_sec: 10.0,
            burst_capacity: 20,
            sweep: SweepConfig::default(),
        }
    }
}

/// Idle bucket sweep configuration.
///
/// Disabled by default: every observed client key is then retained for
/// the process lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Enable the background sweep task.
    pub enabled: bool,

    /// Seconds between sweeps.
    pub interval_secs: u64,

    /// Buckets untouched for longer than this are evicted.
    pub idle_secs: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 60,
            idle_secs: 300,
        }
    }
}

/// Traffic capture configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Enable the capture/log stage.
    pub enabled: bool,

    /// Maximum request body size buffered for capture.
    pub max_body_bytes: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// End-to-end request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address for the Prometheus exporter.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "edge_gate=debug,tower_http=debug".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_limits() {
        let config = GateConfig::default();
        assert_eq!(config.rate_limit.refill_rate_per_sec, 10.0);
        assert_eq!(config.rate_limit.burst_capacity, 20);
        assert!(!config.rate_limit.sweep.enabled);
        assert!(config.capture.enabled);
    }

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let config: GateConfig = toml::from_str(
            r#"
            [rate_limit]
            burst_capacity = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.rate_limit.burst_capacity, 5);
        assert_eq!(config.rate_limit.refill_rate_per_sec, 10.0);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_sweep_section_parses() {
        let config: GateConfig = toml::from_str(
            r#"
            [rate_limit.sweep]
            enabled = true
            interval_secs = 30
            idle_secs = 120
            "#,
        )
        .unwrap();
        assert!(config.rate_limit.sweep.enabled);
        assert_eq!(config.rate_limit.sweep.interval_secs, 30);
        assert_eq!(config.rate_limit.sweep.idle_secs, 120);
    }
}
