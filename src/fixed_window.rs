//! Fixed-window engine: INCR the counter for the current window, EXPIRE it
//! the first time it's created, and fall back to TTL when the window is
//! already exhausted.

use crate::config::RateLimiterConfig;
use crate::key::build_key;
use crate::response::Response;
use crate::store::RateLimitStore;
use crate::time::TimeSource;

pub(crate) struct FixedWindowEngine;

impl FixedWindowEngine {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn check<S: RateLimitStore>(
        &self,
        store: &S,
        clock: &dyn TimeSource,
        config: &RateLimiterConfig,
        identifier: &str,
    ) -> Result<Response, S::Error> {
        let now_ms = clock.now_millis();
        let window_seconds = config.window_seconds();
        let window_ms = window_seconds as i64 * 1000;
        let window_index = now_ms.div_euclid(window_ms);
        let reset = (window_index + 1) * window_ms;

        let key = build_key(config.prefix(), identifier, window_index);
        let count = store.incr(&key).await?;

        if count == 1 {
            // First hit in this window: best-effort EXPIRE so the key
            // doesn't linger forever if the process crashes before the
            // window naturally rolls over. A dropped EXPIRE here is
            // tolerated, not retried.
            store.expire(&key, window_seconds).await?;
        }

        if count > config.limit() as i64 {
            let ttl_seconds = store.ttl(&key).await?;
            let retry_after = if ttl_seconds > 0 {
                ttl_seconds as u64 * 1000
            } else {
                0
            };
            return Ok(Response {
                success: false,
                limit: config.limit(),
                remaining: 0,
                retry_after,
                reset,
            });
        }

        Ok(Response {
            success: true,
            limit: config.limit(),
            remaining: config.limit() - count as u64,
            retry_after: 0,
            reset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimiterOptions;
    use crate::key::build_key;
    use crate::store::memory::MemoryStore;
    use crate::store::RateLimitStore;
    use crate::time::ManualClock;
    use std::sync::Arc;

    fn config(limit: u64, window: u64) -> RateLimiterConfig {
        RateLimiterConfig::fixed_window(RateLimiterOptions {
            limit,
            window,
            prefix: None,
        })
        .unwrap()
    }

    fn store_with_clock(clock: Arc<ManualClock>) -> MemoryStore {
        MemoryStore::new(move || clock.now_millis())
    }

    #[tokio::test]
    async fn admits_up_to_the_limit_then_rejects() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(clock.clone());
        let cfg = config(3, 10);
        let engine = FixedWindowEngine::new();

        for expected_remaining in (0..3).rev() {
            let resp = engine.check(&store, &*clock, &cfg, "alice").await.unwrap();
            assert!(resp.success);
            assert_eq!(resp.remaining, expected_remaining);
        }

        let resp = engine.check(&store, &*clock, &cfg, "alice").await.unwrap();
        assert!(!resp.success);
        assert_eq!(resp.remaining, 0);
        assert!(resp.retry_after > 0);
    }

    #[tokio::test]
    async fn window_rolls_over_after_expiry() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(clock.clone());
        let cfg = config(1, 10);
        let engine = FixedWindowEngine::new();

        assert!(engine.check(&store, &*clock, &cfg, "alice").await.unwrap().success);
        assert!(!engine.check(&store, &*clock, &cfg, "alice").await.unwrap().success);

        clock.set(10_000);
        assert!(engine.check(&store, &*clock, &cfg, "alice").await.unwrap().success);
    }

    #[tokio::test]
    async fn rejection_with_no_ttl_clamps_retry_after_to_zero() {
        // Simulates a dropped EXPIRE: the counter key is already over the
        // limit but carries no TTL (MemoryStore's TTL of -1), so there is
        // no usable wait hint.
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(clock.clone());
        let cfg = config(1, 10);
        let engine = FixedWindowEngine::new();

        let key = build_key(cfg.prefix(), "alice", 0);
        store.set(&key, "5").await.unwrap();
        assert_eq!(store.ttl(&key).await.unwrap(), -1);

        let resp = engine.check(&store, &*clock, &cfg, "alice").await.unwrap();
        assert!(!resp.success);
        assert_eq!(resp.retry_after, 0);
    }

    #[tokio::test]
    async fn identifiers_are_independent() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(clock.clone());
        let cfg = config(1, 10);
        let engine = FixedWindowEngine::new();

        assert!(engine.check(&store, &*clock, &cfg, "alice").await.unwrap().success);
        assert!(engine.check(&store, &*clock, &cfg, "bob").await.unwrap().success);
    }
}
