//! Per-client admission control.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client key resolved by the admission middleware
//!     → registry.rs (one bucket per key, created on first touch)
//!     → bucket.rs (token bucket admit/reject decision)
//! ```
//!
//! # Design Decisions
//! - One lock per bucket: unrelated clients never contend
//! - Registry read-locks for the common case, write-locks only on first touch
//! - Rejection is an expected outcome, not an error

pub mod bucket;
pub mod registry;

pub use bucket::TokenBucket;
pub use registry::LimiterRegistry;
