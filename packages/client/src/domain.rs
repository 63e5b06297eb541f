//! Domain logic for client-side operations.
//!
//! Pure functions without side effects.

use std::time::Duration;

/// Delay before the first reconnection attempt.
pub const RECONNECT_BASE_MS: u64 = 1_000;

/// Upper bound of the reconnection delay.
pub const RECONNECT_MAX_MS: u64 = 15_000;

/// Bounded exponential backoff: `min(1000 * 2^attempt, 15000)` ms.
///
/// # Arguments
///
/// * `attempt` - Number of reconnections scheduled since the last successful open
pub fn reconnect_delay(attempt: u32) -> Duration {
    let ms = 2u64
        .checked_pow(attempt)
        .and_then(|factor| factor.checked_mul(RECONNECT_BASE_MS))
        .map_or(RECONNECT_MAX_MS, |ms| ms.min(RECONNECT_MAX_MS));
    Duration::from_millis(ms)
}

/// Estimate of the server clock from the local clock and the last known offset.
pub fn server_now_ms(local_now_ms: i64, server_offset_ms: i64) -> i64 {
    local_now_ms.saturating_add(server_offset_ms)
}
