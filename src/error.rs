//! Error taxonomy for the rate limiter.
//!
//! Two concrete kinds, both carrying a human-readable message: a
//! configuration error raised synchronously from construction, and a
//! store-operation error raised from [`crate::RateLimiter::limit`] whenever
//! the underlying store interaction fails. The store-operation variant
//! always preserves the original cause.

use thiserror::Error;

/// Errors produced by the rate limiter.
#[derive(Debug, Error)]
pub enum RateLimiterError {
    /// The supplied [`crate::RateLimiterConfig`] is invalid (non-positive
    /// limit or window, or an unrecognized algorithm kind).
    #[error("invalid rate limiter configuration: {0}")]
    Configuration(String),

    /// A store operation failed while checking the rate limit. The
    /// original driver error is preserved as the source.
    #[error("Failed to check rate limit")]
    StoreOperation(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl RateLimiterError {
    /// Wrap a store-level error, preserving it as the error source.
    pub fn store<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreOperation(Box::new(source))
    }
}
