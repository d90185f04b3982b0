//! The minimum store command surface the rate limiter needs:
//! integer-increment with auto-create, second/millisecond expiration,
//! get/set, and script load + script-by-hash evaluation with key/argument
//! separation.
//!
//! [`RedisStore`] implements this over a `redis::aio::ConnectionManager`.
//! Any richer interface than what [`RateLimitStore`] exposes is out of
//! scope for the core.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// A minimal decoded Redis reply, just rich enough to carry the sliding
/// window script's `[remaining_or_neg_one, retry_after_ms]` reply without
/// requiring every [`RateLimitStore`] implementation (including test
/// doubles) to depend on `redis::Value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptReply {
    Int(i64),
    Array(Vec<ScriptReply>),
    Nil,
}

impl ScriptReply {
    /// Interpret this reply as a two-element integer array, as produced by
    /// the sliding-window script.
    pub fn as_int_pair(&self) -> Option<(i64, i64)> {
        match self {
            ScriptReply::Array(items) if items.len() == 2 => {
                match (&items[0], &items[1]) {
                    (ScriptReply::Int(a), ScriptReply::Int(b)) => Some((*a, *b)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl From<redis::Value> for ScriptReply {
    fn from(value: redis::Value) -> Self {
        match value {
            redis::Value::Int(i) => ScriptReply::Int(i),
            redis::Value::Bulk(items) => {
                ScriptReply::Array(items.into_iter().map(ScriptReply::from).collect())
            }
            redis::Value::Nil => ScriptReply::Nil,
            // Everything else (bulk strings, status replies, ...) never
            // appears in the sliding-window script's reply shape.
            other => ScriptReply::Array(vec![ScriptReply::Int(match other {
                redis::Value::Data(bytes) => {
                    String::from_utf8_lossy(&bytes).parse().unwrap_or(0)
                }
                _ => 0,
            })]),
        }
    }
}

/// The store command surface the rate limiter core requires.
///
/// Implementations must be `Send + Sync`: the facade may be shared across
/// concurrent callers, and every method takes `&self`.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// The underlying driver's error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Atomically increment the integer at `key` by 1, creating it at 0
    /// first if absent, and return the new value.
    async fn incr(&self, key: &str) -> Result<i64, Self::Error>;

    /// Set the key's expiration, in whole seconds. Best-effort: a dropped
    /// EXPIRE is tolerated by the fixed-window engine.
    async fn expire(&self, key: &str, seconds: u64) -> Result<(), Self::Error>;

    /// Set the key's expiration, in milliseconds.
    async fn pexpire(&self, key: &str, millis: u64) -> Result<(), Self::Error>;

    /// Remaining time-to-live in whole seconds. Negative values follow
    /// Redis conventions (`-1` no TTL, `-2` missing key).
    async fn ttl(&self, key: &str) -> Result<i64, Self::Error>;

    /// Fetch the string value at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Overwrite the string value at `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Load a script into the store's script cache, returning its SHA1
    /// digest for subsequent [`RateLimitStore::eval_sha`] calls.
    async fn script_load(&self, script: &str) -> Result<String, Self::Error>;

    /// Evaluate a previously-loaded script by SHA1 digest.
    ///
    /// Implementations should surface a distinguishable "unknown script"
    /// condition (Redis's `NOSCRIPT`) so callers can reload and retry; see
    /// [`RateLimitStore::is_missing_script`].
    async fn eval_sha(
        &self,
        sha: &str,
        keys: &[&str],
        args: &[String],
    ) -> Result<ScriptReply, Self::Error>;

    /// Whether `error` indicates the store no longer has the script
    /// cached (Redis `NOSCRIPT`), meaning the caller should reload it via
    /// [`RateLimitStore::script_load`] and retry once.
    fn is_missing_script(error: &Self::Error) -> bool;
}

/// Redis-backed implementation of [`RateLimitStore`] over a
/// `redis::aio::ConnectionManager`.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Wrap an already-connected [`ConnectionManager`].
    ///
    /// Connection/pool setup (retries, auth, TLS) is a driver concern left
    /// to the caller.
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl RateLimitStore for RedisStore {
    type Error = redis::RedisError;

    async fn incr(&self, key: &str) -> Result<i64, Self::Error> {
        let mut conn = self.manager.clone();
        conn.incr(key, 1_i64).await
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<(), Self::Error> {
        let mut conn = self.manager.clone();
        let _: () = conn.expire(key, seconds as i64).await?;
        Ok(())
    }

    async fn pexpire(&self, key: &str, millis: u64) -> Result<(), Self::Error> {
        let mut conn = self.manager.clone();
        let _: () = conn.pexpire(key, millis as i64).await?;
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<i64, Self::Error> {
        let mut conn = self.manager.clone();
        conn.ttl(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let mut conn = self.manager.clone();
        conn.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut conn = self.manager.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn script_load(&self, script: &str) -> Result<String, Self::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("SCRIPT")
            .arg("LOAD")
            .arg(script)
            .query_async(&mut conn)
            .await
    }

    async fn eval_sha(
        &self,
        sha: &str,
        keys: &[&str],
        args: &[String],
    ) -> Result<ScriptReply, Self::Error> {
        let mut conn = self.manager.clone();
        let mut cmd = redis::cmd("EVALSHA");
        cmd.arg(sha).arg(keys.len());
        for k in keys {
            cmd.arg(*k);
        }
        for a in args {
            cmd.arg(a);
        }
        let value: redis::Value = cmd.query_async(&mut conn).await?;
        Ok(ScriptReply::from(value))
    }

    fn is_missing_script(error: &Self::Error) -> bool {
        error.kind() == redis::ErrorKind::NoScriptError
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_reply_decodes_int_pair() {
        let reply = ScriptReply::Array(vec![ScriptReply::Int(4), ScriptReply::Int(0)]);
        assert_eq!(reply.as_int_pair(), Some((4, 0)));
    }

    #[test]
    fn script_reply_rejects_malformed_shapes() {
        assert_eq!(ScriptReply::Int(1).as_int_pair(), None);
        assert_eq!(
            ScriptReply::Array(vec![ScriptReply::Int(1)]).as_int_pair(),
            None
        );
    }
}
