//! Middleware pipeline stages.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → admission.rs (token bucket check; 429 with empty body on reject)
//!     → capture.rs (buffer request body, tee response body)
//!     → timeout and catch-panic layers
//!     → application handler
//! ```
//!
//! # Design Decisions
//! - Admission runs first: rejected requests cost no body buffering
//! - Capture never mutates what the client or the handler observes
//! - Handler panics and timeouts become responses inside the capture
//!   stage, so every admitted request emits exactly one exchange record

pub mod admission;
pub mod capture;
pub mod client_key;

pub use admission::{admission_middleware, AdmissionState};
pub use capture::{capture_middleware, CaptureState};
pub use client_key::ClientKey;
