//! Traffic capture.
//!
//! # Data Flow
//! ```text
//! Admitted request:
//!     → request body materialized once, replayed to the handler
//!     → handler produces the response
//!     → tee.rs (each response frame copied while forwarded unchanged)
//!     → sink.rs (exactly one ExchangeRecord per exchange)
//! ```
//!
//! # Design Decisions
//! - The client-facing response is never altered in content or framing
//! - The record is emitted on every exit path, including early body drop
//! - The sink is a trait boundary; storage and formatting live behind it

pub mod sink;
pub mod tee;

pub use sink::{CaptureSink, ExchangeRecord, JsonLinesSink, MemorySink, TracingSink};
pub use tee::TeeBody;
