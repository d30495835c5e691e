//! Retry backoff math.

use std::time::Duration;

/// Delay before retry `attempt` (0-indexed): `base * 2^attempt`.
///
/// Pure so the schedule is testable without I/O; saturates instead of
/// overflowing for absurd attempt counts.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
