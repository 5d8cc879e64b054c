//! HTTP server subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → TraceLayer (span per request)
//!     → admission stage (429 on reject)
//!     → capture stage (buffer, tee, record)
//!     → TimeoutLayer
//!     → catch-panic layer
//!     → application handler
//! ```

pub mod server;

pub use server::GateServer;
