// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sliding-window rate limiting.
//!
//! The counter store is injected. [`InMemoryRateLimitStore`] only sees the
//! requests of one process: a deployment with several instances must supply
//! a shared implementation (e.g. a key-value store with TTLs).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Counter storage behind a [`RateLimiter`].
pub trait RateLimitStore: Send + Sync {
    /// Record a hit for `key` at `now` and return the number of hits within
    /// the trailing `window`, including this one.
    fn record(&self, key: &str, now: Instant, window: Duration) -> usize;

    /// Forget all hits for `key`.
    fn reset(&self, key: &str);
}

/// Single-process store keeping hit timestamps per key.
///
/// Keys with no hits left in the window are swept at most once per window,
/// from inside [`RateLimitStore::record`].
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    buckets: Mutex<Buckets>,
}

#[derive(Debug, Default)]
struct Buckets {
    hits: HashMap<String, Vec<Instant>>,
    last_sweep: Option<Instant>,
}

fn within(now: Instant, stamp: Instant, window: Duration) -> bool {
    now.saturating_duration_since(stamp) < window
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.buckets.lock().unwrap().hits.len()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn record(&self, key: &str, now: Instant, window: Duration) -> usize {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        let sweep_due = buckets
            .last_sweep
            .is_none_or(|last| !within(now, last, window));
        if sweep_due {
            buckets.hits.retain(|_, stamps| {
                stamps.retain(|t| within(now, *t, window));
                !stamps.is_empty()
            });
            buckets.last_sweep = Some(now);
        }

        let stamps = buckets.hits.entry(key.to_string()).or_default();
        stamps.retain(|t| within(now, *t, window));
        stamps.push(now);
        stamps.len()
    }

    fn reset(&self, key: &str) {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        buckets.hits.remove(key);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: usize,
}

/// Allows `limit` hits per key in any trailing `window`.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, limit: usize, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    pub fn in_memory(limit: usize, window: Duration) -> Self {
        Self::new(Arc::new(InMemoryRateLimitStore::new()), limit, window)
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let count = self.store.record(key, now, self.window);
        RateLimitDecision {
            allowed: count <= self.limit,
            remaining: self.limit.saturating_sub(count),
        }
    }

    pub fn reset(&self, key: &str) {
        self.store.reset(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_within_window() {
        let limiter = RateLimiter::in_memory(3, Duration::from_secs(60));
        let start = Instant::now();

        for i in 0..3 {
            let decision = limiter.check_at("login:a@b.c", start + Duration::from_secs(i));
            assert!(decision.allowed);
        }
        let blocked = limiter.check_at("login:a@b.c", start + Duration::from_secs(4));
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
    }

    #[test]
    fn window_slides() {
        let limiter = RateLimiter::in_memory(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at("k", start).allowed);
        assert!(limiter.check_at("k", start + Duration::from_secs(1)).allowed);
        assert!(!limiter.check_at("k", start + Duration::from_secs(2)).allowed);
        // The first two hits have aged out; only the blocked one remains.
        assert!(limiter.check_at("k", start + Duration::from_secs(11)).allowed);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::in_memory(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at("a", now).allowed);
        assert!(limiter.check_at("b", now).allowed);
        assert!(!limiter.check_at("a", now).allowed);
    }

    #[test]
    fn reset_clears_key() {
        let limiter = RateLimiter::in_memory(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at("a", now).allowed);
        limiter.reset("a");
        assert!(limiter.check_at("a", now).allowed);
    }

    #[test]
    fn stale_keys_are_swept_on_later_hits() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::from_secs(900);
        let start = Instant::now();

        for i in 0..1_000 {
            store.record(&format!("login:{i}@example.org"), start, window);
        }
        assert_eq!(store.tracked_keys(), 1_000);

        store.record("login:late@example.org", start + Duration::from_secs(3600), window);
        assert_eq!(store.tracked_keys(), 1);
    }

    #[test]
    fn sweep_keeps_keys_still_in_window() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::from_secs(10);
        let start = Instant::now();

        store.record("old", start, window);
        store.record("recent", start + Duration::from_secs(8), window);
        store.record("new", start + Duration::from_secs(12), window);

        assert_eq!(store.tracked_keys(), 2);
        assert_eq!(store.record("recent", start + Duration::from_secs(13), window), 2);
    }
}
