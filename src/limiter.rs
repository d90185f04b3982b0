//! Public facade tying a [`RateLimitStore`], a [`RateLimiterConfig`], and a
//! [`TimeSource`] together into a single `limit` entry point.

use crate::config::{Algorithm, RateLimiterConfig};
use crate::error::RateLimiterError;
use crate::fixed_window::FixedWindowEngine;
use crate::response::Response;
use crate::sliding_window::SlidingWindowEngine;
use crate::store::RateLimitStore;
use crate::time::{SystemClock, TimeSource};

enum Engine {
    Fixed(FixedWindowEngine),
    Sliding(SlidingWindowEngine),
}

/// A rate limiter bound to one store, one configuration, and one clock.
///
/// Cheap to construct; the expensive part (script caching) lives in the
/// per-algorithm engine and is reused across calls to [`RateLimiter::limit`].
pub struct RateLimiter<S: RateLimitStore> {
    store: S,
    config: RateLimiterConfig,
    clock: Box<dyn TimeSource>,
    engine: Engine,
}

impl<S: RateLimitStore> RateLimiter<S> {
    /// Build a limiter backed by [`SystemClock`].
    pub fn new(store: S, config: RateLimiterConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }

    /// Build a limiter with an explicit [`TimeSource`], for tests that need
    /// deterministic window boundaries.
    pub fn with_clock(store: S, config: RateLimiterConfig, clock: impl TimeSource + 'static) -> Self {
        let engine = match config.algorithm() {
            Algorithm::Fixed => Engine::Fixed(FixedWindowEngine::new()),
            Algorithm::Sliding => Engine::Sliding(SlidingWindowEngine::new()),
        };
        Self {
            store,
            config,
            clock: Box::new(clock),
            engine,
        }
    }

    /// Record one event for `identifier` and report whether it should be
    /// admitted.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimiterError::StoreOperation`] if the underlying store
    /// interaction fails; the original driver error is preserved as the
    /// source.
    pub async fn limit(&self, identifier: &str) -> Result<Response, RateLimiterError> {
        let result = match &self.engine {
            Engine::Fixed(engine) => {
                engine
                    .check(&self.store, &*self.clock, &self.config, identifier)
                    .await
            }
            Engine::Sliding(engine) => {
                engine
                    .check(&self.store, &*self.clock, &self.config, identifier)
                    .await
            }
        };
        match result {
            Ok(response) if !response.success => {
                tracing::warn!(
                    identifier = %identifier,
                    limit = %response.limit,
                    retry_after = %response.retry_after,
                    "rate limit exceeded"
                );
                Ok(response)
            }
            Ok(response) => Ok(response),
            Err(err) => {
                tracing::error!(identifier = %identifier, error = %err, "rate limit store operation failed");
                Err(RateLimiterError::store(err))
            }
        }
    }

    /// The configuration this limiter was built with.
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimiterOptions;
    use crate::store::memory::MemoryStore;
    use crate::store::RedisStore;
    use crate::time::ManualClock;
    use std::sync::Arc;

    #[tokio::test]
    async fn fixed_window_limiter_end_to_end() {
        let clock = Arc::new(ManualClock::new(0));
        let store = {
            let clock = clock.clone();
            MemoryStore::new(move || clock.now_millis())
        };
        let config = RateLimiterConfig::fixed_window(RateLimiterOptions {
            limit: 2,
            window: 5,
            prefix: Some("svc".into()),
        })
        .unwrap();
        let limiter = RateLimiter::with_clock(store, config, ManualClock::new(0));

        assert!(limiter.limit("alice").await.unwrap().success);
        assert!(limiter.limit("alice").await.unwrap().success);
        assert!(!limiter.limit("alice").await.unwrap().success);
    }

    #[tokio::test]
    async fn sliding_window_limiter_end_to_end() {
        let clock = Arc::new(ManualClock::new(0));
        let store = {
            let clock = clock.clone();
            MemoryStore::new(move || clock.now_millis())
        };
        let config = RateLimiterConfig::sliding_window(RateLimiterOptions {
            limit: 3,
            window: 5,
            prefix: None,
        })
        .unwrap();
        let limiter = RateLimiter::with_clock(store, config, ManualClock::new(0));

        assert!(limiter.limit("alice").await.unwrap().success);
        assert!(limiter.limit("alice").await.unwrap().success);
        assert!(limiter.limit("alice").await.unwrap().success);
        let resp = limiter.limit("alice").await.unwrap();
        assert!(!resp.success);
        assert_eq!(resp.limit, 3);
    }

    #[tokio::test]
    async fn fixed_window_concurrent_batch_admits_exactly_the_limit() {
        let clock = Arc::new(ManualClock::new(0));
        let store = {
            let clock = clock.clone();
            MemoryStore::new(move || clock.now_millis())
        };
        let config = RateLimiterConfig::fixed_window(RateLimiterOptions {
            limit: 10,
            window: 10,
            prefix: None,
        })
        .unwrap();
        let limiter = Arc::new(RateLimiter::with_clock(store, config, ManualClock::new(0)));

        let tasks: Vec<_> = (0..25)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.limit("shared-identifier").await.unwrap().success })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            if task.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 10);
    }

    #[tokio::test]
    async fn sliding_window_concurrent_batch_admits_exactly_the_limit() {
        let clock = Arc::new(ManualClock::new(0));
        let store = {
            let clock = clock.clone();
            MemoryStore::new(move || clock.now_millis())
        };
        let config = RateLimiterConfig::sliding_window(RateLimiterOptions {
            limit: 10,
            window: 10,
            prefix: None,
        })
        .unwrap();
        let limiter = Arc::new(RateLimiter::with_clock(store, config, ManualClock::new(0)));

        let tasks: Vec<_> = (0..25)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.limit("shared-identifier").await.unwrap().success })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            if task.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 10);
    }

    async fn redis_store() -> RedisStore {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        let client = redis::Client::open(url).unwrap();
        let manager = redis::aio::ConnectionManager::new(client).await.unwrap();
        RedisStore::new(manager)
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn fixed_window_against_real_redis() {
        let config = RateLimiterConfig::fixed_window(RateLimiterOptions {
            limit: 2,
            window: 2,
            prefix: Some("ratelimit-test-fixed".into()),
        })
        .unwrap();
        let limiter = RateLimiter::new(redis_store().await, config);

        let identifier = "integration-fixed";
        assert!(limiter.limit(identifier).await.unwrap().success);
        assert!(limiter.limit(identifier).await.unwrap().success);
        assert!(!limiter.limit(identifier).await.unwrap().success);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn sliding_window_against_real_redis() {
        let config = RateLimiterConfig::sliding_window(RateLimiterOptions {
            limit: 2,
            window: 2,
            prefix: Some("ratelimit-test-sliding".into()),
        })
        .unwrap();
        let limiter = RateLimiter::new(redis_store().await, config);

        let identifier = "integration-sliding";
        assert!(limiter.limit(identifier).await.unwrap().success);
        assert!(limiter.limit(identifier).await.unwrap().success);
        assert!(!limiter.limit(identifier).await.unwrap().success);
    }
}
