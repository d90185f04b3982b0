//! Distributed rate limiter backed by a Redis-protocol-compatible store.
//!
//! Two algorithms share the same store and key layout: [`config::Algorithm::Fixed`]
//! (INCR/EXPIRE/TTL against non-overlapping windows) and
//! [`config::Algorithm::Sliding`] (a weighted blend of the current and
//! previous window, computed atomically by a single server-side script).
//! Build a [`RateLimiterConfig`] for the algorithm you want, wrap a store in
//! [`RateLimitStore`] (use [`RedisStore`] for a real Redis/Valkey instance),
//! and drive both through [`RateLimiter::limit`].

mod config;
mod error;
mod fixed_window;
mod key;
mod limiter;
mod response;
mod scripts;
mod sliding_window;
mod store;
mod time;

pub use config::{Algorithm, RateLimiterConfig, RateLimiterOptions, DEFAULT_PREFIX};
pub use error::RateLimiterError;
pub use limiter::RateLimiter;
pub use response::Response;
pub use store::{RateLimitStore, RedisStore, ScriptReply};
pub use time::{SystemClock, TimeSource};
