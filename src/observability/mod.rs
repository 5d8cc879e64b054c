//! Observability subsystem.
//!
//! # Design Decisions
//! - tracing for structured logs, metrics for counters and gauges
//! - Exchange records are a separate concern (see `capture::sink`)

pub mod logging;
pub mod metrics;
