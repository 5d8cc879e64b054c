//! Token bucket admission primitive.

use std::time::{Duration, Instant};

/// A single-key token bucket.
///
/// Tracks available tokens, refill rate, and capacity for one client key.
/// Capacity and refill rate are fixed at construction. Mutation is not
/// internally synchronized; the registry wraps each bucket in its own
/// `Mutex`.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket. A zero capacity rejects every request.
    pub fn new(capacity: f64, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    /// Admission check against the current time.
    ///
    /// There is no waiting variant: a rejected request returns immediately.
    pub fn allow(&mut self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Admission check against an explicit clock reading.
    ///
    /// Refills `elapsed * refill_rate` tokens capped at capacity, then
    /// consumes one token if at least one is available. A clock reading
    /// older than `last_refill` credits nothing and leaves `last_refill`
    /// in place, so the same interval is never credited twice.
    pub fn allow_at(&mut self, now: Instant) -> bool {
        if now > self.last_refill {
            let elapsed = now.duration_since(self.last_refill).as_secs_f64();
            self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
            self.last_refill = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time since an admission check last touched this bucket.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_refill)
    }
}
