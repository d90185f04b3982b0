//! Server-side Lua script backing the sliding-window algorithm: a single
//! atomic read-compute-conditional-write against two keys, so concurrent
//! callers across processes never race on the same window.

/// Keys: `KEYS[1]` current-window counter, `KEYS[2]` previous-window counter.
/// Args: `ARGV[1]` limit, `ARGV[2]` now (ms since epoch), `ARGV[3]` window
/// length (ms), `ARGV[4]` increment.
///
/// Returns `{-1, retry_after_ms}` if admitting `ARGV[4]` would push the
/// weighted usage over `ARGV[1]`, without writing anything; otherwise
/// `{remaining, 0}` after incrementing the current counter and refreshing
/// its TTL to outlive two windows.
///
/// The `needed` term in the rejection branch must stay exactly
/// `cumulative - limit + increment`, not `cumulative - limit`: it is the
/// count this call itself would have needed to succeed, not merely how far
/// over the ceiling the existing usage already sits.
pub const SLIDING_WINDOW_SCRIPT: &str = r#"
local current_key = KEYS[1]
local previous_key = KEYS[2]

local limit = tonumber(ARGV[1])
local now_ms = tonumber(ARGV[2])
local window_ms = tonumber(ARGV[3])
local increment = tonumber(ARGV[4])

local current_count = tonumber(redis.call("GET", current_key)) or 0
local previous_count = tonumber(redis.call("GET", previous_key)) or 0

local time_in_current = now_ms % window_ms
local time_remaining_previous = window_ms - time_in_current
local weighted_previous = math.floor((previous_count * time_remaining_previous) / window_ms)
local cumulative = weighted_previous + current_count + increment

if cumulative > limit then
    local needed = cumulative - limit + increment
    local retry_after
    if previous_count > 0 then
        retry_after = math.ceil((needed * window_ms) / previous_count)
        if retry_after > time_remaining_previous then
            retry_after = time_remaining_previous
        end
    else
        retry_after = window_ms - time_in_current
    end
    return {-1, retry_after}
end

local new_current_count = current_count + increment
redis.call("SET", current_key, new_current_count)
redis.call("PEXPIRE", current_key, (2 * window_ms) + 1000)

local remaining = limit - (weighted_previous + new_current_count)
return {remaining, 0}
"#;
