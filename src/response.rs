//! The immutable decision record returned by every [`crate::RateLimiter::limit`]
//! call.

/// Outcome of a single rate-limit decision.
///
/// Invariants: if `success` then `retry_after == 0` and
/// `remaining` is in `0..limit`; if not `success` then `remaining == 0`
/// and (outside the zero-previous-window edge case) `retry_after > 0`.
/// `reset` is always strictly greater than the wall-clock instant at the
/// moment the response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Whether the event was admitted.
    pub success: bool,
    /// The configured ceiling (`limit` from the [`crate::RateLimiterConfig`]).
    pub limit: u64,
    /// Remaining admissions in the current accounting window.
    pub remaining: u64,
    /// Milliseconds the caller should wait before retrying. Zero when
    /// `success` is `true`.
    pub retry_after: u64,
    /// Absolute wall-clock instant, in milliseconds since epoch, by which
    /// the limiter is guaranteed to have returned to a blank slate for
    /// this identifier. Not the "next admission time".
    pub reset: i64,
}
