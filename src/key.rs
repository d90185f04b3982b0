//! Deterministic mapping from (prefix, identifier, window index) to the
//! store key string.

use std::fmt::Display;

/// Build the store key `"<prefix>:<identifier>:<suffix>"`.
///
/// `suffix` is normally a window index (possibly negative for windows
/// before the epoch), but the function is generic over anything
/// [`Display`]-able so the same helper backs both the fixed-window and
/// sliding-window engines.
pub fn build_key(prefix: &str, identifier: &str, suffix: impl Display) -> String {
    format!("{prefix}:{identifier}:{suffix}")
}
