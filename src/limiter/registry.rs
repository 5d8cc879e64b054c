//! Per-client limiter registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::limiter::bucket::TokenBucket;
use crate::observability::metrics;

/// Concurrent mapping from client key to its token bucket.
///
/// Every bucket is created with the same refill rate and capacity, fixed
/// at registry construction. Equal keys collapse to one bucket, so shared
/// clients behind the same address share a budget. Keys are retained for
/// the process lifetime unless [`LimiterRegistry::sweep_idle`] runs.
pub struct LimiterRegistry {
    buckets: RwLock<HashMap<String, Arc<Mutex<TokenBucket>>>>,
    refill_rate: f64,
    capacity: f64,
}

impl LimiterRegistry {
    /// Create an empty registry.
    pub fn new(refill_rate: f64, capacity: f64) -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            refill_rate,
            capacity,
        }
    }

    /// Return the bucket for `key`, creating it on first touch.
    ///
    /// The fast path holds the read lock only. On a miss the write lock is
    /// taken and the key re-checked, so concurrent first-touch on the same
    /// unseen key yields exactly one bucket.
    pub fn get_or_create(&self, key: &str) -> Arc<Mutex<TokenBucket>> {
        {
            let buckets = self.buckets.read().expect("limiter registry lock poisoned");
            if let Some(bucket) = buckets.get(key) {
                return Arc::clone(bucket);
            }
        }

        let mut buckets = self.buckets.write().expect("limiter registry lock poisoned");
        let bucket = Arc::clone(buckets.entry(key.to_string()).or_insert_with(|| {
            Arc::new(Mutex::new(TokenBucket::new(self.capacity, self.refill_rate)))
        }));
        metrics::record_tracked_clients(buckets.len());
        bucket
    }

    /// Run one admission check for `key`.
    pub fn check(&self, key: &str) -> bool {
        let bucket = self.get_or_create(key);
        let mut bucket = bucket.lock().expect("token bucket lock poisoned");
        bucket.allow()
    }

    /// Number of client keys currently tracked.
    pub fn len(&self) -> usize {
        self.buckets.read().expect("limiter registry lock poisoned").len()
    }

    /// Whether no client keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove buckets untouched for longer than `max_idle`.
    ///
    /// Returns the number of buckets removed. Runs under the write lock,
    /// the same discipline as first-touch insertion.
    pub fn sweep_idle(&self, now: Instant, max_idle: Duration) -> usize {
        let mut buckets = self.buckets.write().expect("limiter registry lock poisoned");
        let before = buckets.len();
        buckets.retain(|_, bucket| {
            bucket
                .lock()
                .expect("token bucket lock poisoned")
                .idle_for(now)
                <= max_idle
        });
        metrics::record_tracked_clients(buckets.len());
        before - buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_concurrent_first_touch_creates_one_bucket() {
        let registry = Arc::new(LimiterRegistry::new(10.0, 20.0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || registry.get_or_create("1.2.3.4")));
        }
        let buckets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.len(), 1);
        for bucket in &buckets[1..] {
            assert!(Arc::ptr_eq(&buckets[0], bucket));
        }
    }

    #[test]
    fn test_last_token_admitted_exactly_once() {
        // Capacity 1 with no refill: of N concurrent checks, one admit.
        let registry = Arc::new(LimiterRegistry::new(0.0, 1.0));
        let admitted = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            let admitted = Arc::clone(&admitted);
            handles.push(thread::spawn(move || {
                if registry.check("1.2.3.4") {
                    admitted.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_keys_limited_independently() {
        let registry = LimiterRegistry::new(0.0, 20.0);

        for _ in 0..20 {
            assert!(registry.check("1.2.3.4"));
        }
        assert!(!registry.check("1.2.3.4"));

        for _ in 0..20 {
            assert!(registry.check("5.6.7.8"));
        }
        assert!(!registry.check("5.6.7.8"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_same_key_returns_same_bucket() {
        let registry = LimiterRegistry::new(10.0, 20.0);
        let first = registry.get_or_create("1.2.3.4");
        let second = registry.get_or_create("1.2.3.4");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_idle_buckets() {
        let registry = LimiterRegistry::new(10.0, 20.0);
        registry.check("1.2.3.4");
        registry.check("5.6.7.8");

        let later = Instant::now() + Duration::from_secs(120);
        registry
            .get_or_create("5.6.7.8")
            .lock()
            .unwrap()
            .allow_at(later);

        let removed = registry.sweep_idle(later, Duration::from_secs(60));
        assert_eq!(removed, 1);
        assert_eq!(registry.len(), 1);
        // The surviving key keeps its bucket.
        assert!(registry.check("5.6.7.8"));
    }
}
