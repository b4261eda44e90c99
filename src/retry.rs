use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Reads `Retry-After` as whole seconds and converts it to milliseconds.
///
/// Only the leading digits count, so `"2.5"` waits 2 s. HTTP-date values
/// and anything not starting with a digit fall back to `default_ms`.
pub(crate) fn retry_after_ms(headers: &HeaderMap, default_ms: u64) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(leading_seconds)
        .map(|seconds| seconds.saturating_mul(1_000))
        .unwrap_or(default_ms)
}

fn leading_seconds(value: &str) -> Option<u64> {
    let value = value.trim();
    let digits = value
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value, |end| &value[..end]);
    digits.parse().ok()
}

/// Total wait before re-sending a rate-limited request:
/// the server's hint plus uniform jitter in `[0, jitter_ms)`.
pub(crate) fn rate_limit_delay(base_ms: u64, jitter_ms: u64) -> Duration {
    let jitter = if jitter_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..jitter_ms)
    };
    Duration::from_millis(base_ms.saturating_add(jitter))
}
