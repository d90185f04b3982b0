//! Immutable rate limiter configuration.

use crate::error::RateLimiterError;

/// Default key-namespace prefix used when the configuration supplies none.
pub const DEFAULT_PREFIX: &str = "ratelimit";

/// Which decision algorithm a [`RateLimiterConfig`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Non-overlapping windows aligned to epoch time, via INCR/EXPIRE/TTL.
    Fixed,
    /// Weighted blend of the current and immediately preceding window, via
    /// a single atomic server-side script.
    Sliding,
}

/// Immutable configuration for a [`crate::RateLimiter`].
///
/// Built once through [`RateLimiterConfig::fixed_window`] or
/// [`RateLimiterConfig::sliding_window`] and never mutated afterward.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub(crate) algorithm: Algorithm,
    pub(crate) limit: u64,
    pub(crate) window_seconds: u64,
    pub(crate) prefix: String,
}

/// Parameters shared by both algorithm constructors.
#[derive(Debug, Clone)]
pub struct RateLimiterOptions {
    /// Maximum number of admissions per window. Must be positive.
    pub limit: u64,
    /// Window length in seconds. Must be positive.
    pub window: u64,
    /// Key-namespace prefix. Empty or omitted defaults to `"ratelimit"`.
    pub prefix: Option<String>,
}

impl RateLimiterConfig {
    /// Build a fixed-window configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimiterError::Configuration`] if `limit` or `window`
    /// is zero.
    pub fn fixed_window(options: RateLimiterOptions) -> Result<Self, RateLimiterError> {
        Self::new(Algorithm::Fixed, options)
    }

    /// Build a sliding-window configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimiterError::Configuration`] if `limit` or `window`
    /// is zero.
    pub fn sliding_window(options: RateLimiterOptions) -> Result<Self, RateLimiterError> {
        Self::new(Algorithm::Sliding, options)
    }

    fn new(algorithm: Algorithm, options: RateLimiterOptions) -> Result<Self, RateLimiterError> {
        if options.limit == 0 {
            return Err(RateLimiterError::Configuration(
                "limit must be greater than zero".into(),
            ));
        }
        if options.window == 0 {
            return Err(RateLimiterError::Configuration(
                "window must be greater than zero".into(),
            ));
        }

        let prefix = match options.prefix {
            Some(p) if !p.is_empty() => p,
            _ => DEFAULT_PREFIX.to_string(),
        };

        Ok(Self {
            algorithm,
            limit: options.limit,
            window_seconds: options.window,
            prefix,
        })
    }

    /// The configured admission ceiling.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// The configured window length, in seconds.
    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// The effective key-namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Which algorithm this configuration selects.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}
