//! Login-failure rate limiting
//!
//! Counts consecutive failed login attempts per identity inside a fixed
//! window. Once the threshold is reached, further attempts are rejected
//! before credentials are even checked; a successful login clears the
//! counter.
//!
//! The counter lives behind [`CounterStore`] so a cache-backed store shared
//! across service instances can replace the in-process one. The bundled
//! [`MemoryCounterStore`] keeps counters in a `DashMap`; updates happen under
//! the map's shard lock, so concurrent attempts against the same identity
//! cannot undercount.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Failures allowed before the limiter trips. The attempt after the fifth
/// failure is rejected regardless of credential correctness.
pub const DEFAULT_MAX_FAILURES: u32 = 5;

/// Width of the counting window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Atomic per-key failure counter with a fixed window
pub trait CounterStore: Send + Sync {
    /// Increment the counter for `key`, starting a fresh window if the
    /// current one has lapsed. Returns the count within the active window.
    fn increment(&self, key: &str, window: Duration) -> u32;

    /// Read the counter for `key` without incrementing. A lapsed window
    /// reads as zero.
    fn get(&self, key: &str, window: Duration) -> u32;

    /// Clear the counter for `key`
    fn reset(&self, key: &str);

    /// Drop counters whose window has lapsed. Stores with native expiry
    /// (a TTL-backed cache, say) can leave this as the default no-op.
    fn purge(&self, window: Duration) {
        let _ = window;
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowSlot {
    window_start: Instant,
    count: u32,
}

/// In-process counter store backed by a sharded concurrent map
#[derive(Default)]
pub struct MemoryCounterStore {
    slots: DashMap<String, WindowSlot>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl CounterStore for MemoryCounterStore {
    fn increment(&self, key: &str, window: Duration) -> u32 {
        let now = Instant::now();
        let mut entry = self.slots.entry(key.to_string()).or_insert(WindowSlot {
            window_start: now,
            count: 0,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.window_start = now;
            entry.count = 0;
        }

        entry.count += 1;
        entry.count
    }

    fn get(&self, key: &str, window: Duration) -> u32 {
        match self.slots.get(key) {
            Some(slot) if Instant::now().duration_since(slot.window_start) < window => slot.count,
            _ => 0,
        }
    }

    fn reset(&self, key: &str) {
        self.slots.remove(key);
    }

    fn purge(&self, window: Duration) {
        let now = Instant::now();
        self.slots
            .retain(|_, slot| now.duration_since(slot.window_start) < window);
    }
}

/// Failure limiter for login attempts, keyed by lowercased identity
#[derive(Clone)]
pub struct FailedLoginLimiter {
    store: Arc<dyn CounterStore>,
    max_failures: u32,
    window: Duration,
}

impl FailedLoginLimiter {
    /// Create a limiter over a counter store
    pub fn new(store: Arc<dyn CounterStore>, max_failures: u32, window: Duration) -> Self {
        Self {
            store,
            max_failures,
            window,
        }
    }

    /// Limiter with default threshold and window over an in-memory store
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCounterStore::new()),
            DEFAULT_MAX_FAILURES,
            DEFAULT_WINDOW,
        )
    }

    fn key(identity: &str) -> String {
        identity.trim().to_lowercase()
    }

    /// Whether attempts for this identity are currently rejected
    pub fn is_limited(&self, identity: &str) -> bool {
        self.store.get(&Self::key(identity), self.window) >= self.max_failures
    }

    /// Record a failed attempt; returns the failure count in the window
    pub fn record_failure(&self, identity: &str) -> u32 {
        self.store.increment(&Self::key(identity), self.window)
    }

    /// Clear the counter after a successful login
    pub fn record_success(&self, identity: &str) {
        self.store.reset(&Self::key(identity));
    }

    /// Drop counters whose window has lapsed; meant for periodic
    /// housekeeping so abandoned identities do not accumulate
    pub fn purge_lapsed(&self) {
        self.store.purge(self.window);
    }

    /// Configured failure threshold
    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }

    /// Configured window width
    pub fn window(&self) -> Duration {
        self.window
    }
}
