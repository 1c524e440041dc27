//! Time base and alignment helpers shared by the limiter internals.
//!
//! The time functions provide a process-wide microsecond counter that is
//! immune to wall-clock jumps, which matters because refill deadlines are
//! absolute timestamps compared against "now" on every coordinator
//! iteration.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// Monotonic time base to prevent issues when the system clock jumps.
// We capture the wall-clock epoch microseconds at process start,
// then advance using a monotonic Instant to compute 'now'.
static START_TIME_BASE: OnceLock<(Instant, i64)> = OnceLock::new();

fn time_base() -> &'static (Instant, i64) {
    START_TIME_BASE.get_or_init(|| {
        let epoch_us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as i64;
        (Instant::now(), epoch_us)
    })
}

/// Returns the current time in microseconds since UNIX epoch.
///
/// The value is anchored to the wall clock once at first use and advanced
/// monotonically afterwards, so consecutive calls never go backwards.
///
/// # Example
///
/// ```rust
/// use iorate::current_time_us;
///
/// let start = current_time_us();
/// // ... some operation ...
/// let elapsed = current_time_us() - start;
/// assert!(elapsed >= 0);
/// ```
#[inline(always)]
pub fn current_time_us() -> i64 {
    let (start, base_us) = time_base();
    base_us.saturating_add(start.elapsed().as_micros() as i64)
}

/// Rounds `bytes` down to a multiple of `alignment`.
///
/// `alignment` must be a power of two. Used when charging direct I/O,
/// which cannot transfer less than one aligned page.
#[inline]
pub(crate) fn truncate_to_page_boundary(alignment: i64, bytes: i64) -> i64 {
    debug_assert!(alignment > 0);
    debug_assert!(
        (alignment & (alignment - 1)) == 0,
        "alignment must be a power of two"
    );
    bytes - (bytes & (alignment - 1))
}
