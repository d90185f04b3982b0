//! Weighted sliding-window engine: a single atomic server-side script call
//! per [`crate::RateLimiter::limit`] invocation.

use std::sync::OnceLock;

use crate::config::RateLimiterConfig;
use crate::key::build_key;
use crate::response::Response;
use crate::scripts::SLIDING_WINDOW_SCRIPT;
use crate::store::RateLimitStore;
use crate::time::TimeSource;

/// Caches the script's SHA1 digest after the first successful
/// `SCRIPT LOAD`, so steady-state calls skip straight to `EVALSHA`.
pub(crate) struct SlidingWindowEngine {
    sha1: OnceLock<String>,
}

impl SlidingWindowEngine {
    pub(crate) fn new() -> Self {
        Self {
            sha1: OnceLock::new(),
        }
    }

    async fn loaded_sha<S: RateLimitStore>(&self, store: &S) -> Result<String, S::Error> {
        if let Some(sha) = self.sha1.get() {
            return Ok(sha.clone());
        }
        let sha = store.script_load(SLIDING_WINDOW_SCRIPT).await?;
        // Another caller may have raced us here; either digest is the same
        // script, so either stored value is fine.
        let _ = self.sha1.set(sha.clone());
        Ok(sha)
    }

    pub(crate) async fn check<S: RateLimitStore>(
        &self,
        store: &S,
        clock: &dyn TimeSource,
        config: &RateLimiterConfig,
        identifier: &str,
    ) -> Result<Response, S::Error> {
        let now_ms = clock.now_millis();
        let window_ms = config.window_seconds() as i64 * 1000;
        let window_index = now_ms.div_euclid(window_ms);

        let current_key = build_key(config.prefix(), identifier, window_index);
        let previous_key = build_key(config.prefix(), identifier, window_index - 1);
        let keys = [current_key.as_str(), previous_key.as_str()];
        let args = [
            config.limit().to_string(),
            now_ms.to_string(),
            window_ms.to_string(),
            1.to_string(),
        ];

        let sha = self.loaded_sha(store).await?;
        let reply = match store.eval_sha(&sha, &keys, &args).await {
            Ok(reply) => reply,
            Err(err) if S::is_missing_script(&err) => {
                tracing::debug!(identifier = %identifier, "script missing from store cache, reloading");
                let sha = store.script_load(SLIDING_WINDOW_SCRIPT).await?;
                let _ = self.sha1.set(sha.clone());
                store.eval_sha(&sha, &keys, &args).await?
            }
            Err(err) => return Err(err),
        };

        let (remaining_or_neg_one, retry_after_ms) = reply.as_int_pair().unwrap_or((-1, window_ms));
        // A forward-looking guarantee, not the current window's boundary: by
        // this instant both buckets consulted here will have fully aged out.
        let reset = now_ms + 2 * window_ms;

        if remaining_or_neg_one < 0 {
            Ok(Response {
                success: false,
                limit: config.limit(),
                remaining: 0,
                retry_after: retry_after_ms.max(0) as u64,
                reset,
            })
        } else {
            Ok(Response {
                success: true,
                limit: config.limit(),
                remaining: remaining_or_neg_one as u64,
                retry_after: 0,
                reset,
            })
        }
    }
}
