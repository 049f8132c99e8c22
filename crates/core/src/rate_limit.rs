//! In-memory fixed-window rate limiter keyed by identity.
//!
//! Each key gets `limit + burst` hits per window. The map is pruned of stale
//! windows once it grows past `max_entries`. State is process-local; a
//! multi-instance deployment gets one budget per instance.

use std::collections::HashMap;
use std::sync::Mutex;

/// Default number of tracked keys before stale windows are evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window: i64,
    count: u32,
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    limit: u32,
    burst: u32,
    window_secs: i64,
    max_entries: usize,
    counters: Mutex<HashMap<String, WindowCounter>>,
}

impl FixedWindowLimiter {
    /// A limiter allowing `limit + burst` hits per minute per key.
    pub fn per_minute(limit: u32, burst: u32) -> Self {
        Self::new(limit, burst, 60, DEFAULT_MAX_ENTRIES)
    }

    pub fn new(limit: u32, burst: u32, window_secs: i64, max_entries: usize) -> Self {
        Self {
            limit,
            burst,
            window_secs: window_secs.max(1),
            max_entries,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit for `key` at `now_unix` (seconds).
    ///
    /// Returns `Err(retry_after_secs)` when the key's budget for the current
    /// window is exhausted; the rejected hit is not counted.
    pub fn check(&self, key: &str, now_unix: i64) -> Result<(), u64> {
        let window = now_unix.div_euclid(self.window_secs);
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if counters.len() > self.max_entries {
            counters.retain(|_, v| v.window == window);
        }

        let entry = counters
            .entry(key.to_string())
            .or_insert(WindowCounter { window, count: 0 });
        if entry.window != window {
            entry.window = window;
            entry.count = 0;
        }

        if entry.count >= self.limit.saturating_add(self.burst) {
            let window_end = (window + 1) * self.window_secs;
            return Err((window_end - now_unix).max(1) as u64);
        }
        entry.count += 1;
        Ok(())
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A Unix timestamp aligned to a minute boundary.
    const WINDOW_START: i64 = 1_699_999_980;

    #[test]
    fn allows_limit_plus_burst_then_rejects() {
        let limiter = FixedWindowLimiter::per_minute(3, 2);
        let t = WINDOW_START + 40;
        for _ in 0..5 {
            assert!(limiter.check("user:1", t).is_ok());
        }
        assert_eq!(limiter.check("user:1", t), Err(20));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = FixedWindowLimiter::per_minute(1, 0);
        let t = WINDOW_START;
        assert!(limiter.check("user:1", t).is_ok());
        assert!(limiter.check("user:1", t).is_err());
        assert!(limiter.check("anon:abc", t).is_ok());
    }

    #[test]
    fn new_window_resets_count() {
        let limiter = FixedWindowLimiter::per_minute(1, 0);
        let t = WINDOW_START;
        assert!(limiter.check("ip:1.2.3.4", t + 59).is_ok());
        assert!(limiter.check("ip:1.2.3.4", t + 59).is_err());
        assert!(limiter.check("ip:1.2.3.4", t + 60).is_ok());
    }

    #[test]
    fn retry_after_is_at_least_one_second() {
        let limiter = FixedWindowLimiter::new(0, 0, 60, 100);
        let t = WINDOW_START;
        assert_eq!(limiter.check("k", t), Err(60));
        assert_eq!(limiter.check("k", t + 59), Err(1));
    }

    #[test]
    fn stale_windows_are_evicted_past_capacity() {
        let limiter = FixedWindowLimiter::new(5, 0, 60, 2);
        let t = WINDOW_START;
        limiter.check("a", t).unwrap();
        limiter.check("b", t).unwrap();
        limiter.check("c", t).unwrap();
        assert_eq!(limiter.tracked_keys(), 3);

        limiter.check("d", t + 60).unwrap();
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
