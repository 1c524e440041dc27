//! Clock injection.
//!
//! The limiter never reads the OS clock directly. All timing flows through
//! a [`SystemClock`], which supplies "now" for the refill schedule and
//! translates the absolute refill deadline into the bounded condition
//! variable wait performed by the elected waiter.
//!
//! Two implementations ship with the crate:
//!
//! - [`DefaultClock`]: the process-wide monotonic microsecond base. What
//!   production embeddings use.
//! - [`ManualClock`]: a simulated clock that only moves when told to, or
//!   when a waiter asks to reach a deadline. Timed waits become immediate
//!   timeouts, so single-threaded tests can step through whole refill
//!   cycles deterministically.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use super::utils::current_time_us;

/// Time source and timed-wait policy for a limiter instance.
pub trait SystemClock: Send + Sync + fmt::Debug {
    /// Current time in microseconds. Used to form absolute wait deadlines.
    fn now_micros(&self) -> i64;

    /// Strictly non-decreasing microseconds. Drives the refill schedule.
    ///
    /// Defaults to [`now_micros`](Self::now_micros), which is already
    /// monotonic for the clocks in this crate.
    fn now_micros_monotonic(&self) -> i64 {
        self.now_micros()
    }

    /// How long a refill waiter should block to reach the absolute
    /// `deadline_us`.
    ///
    /// A simulated clock may instead advance itself to the deadline and
    /// return [`Duration::ZERO`], turning the timed wait into an immediate
    /// timeout. The caller re-evaluates all state under the mutex after
    /// the wait either way, so early or spurious returns are harmless.
    fn wait_until(&self, deadline_us: i64) -> Duration {
        let remaining_us = deadline_us.saturating_sub(self.now_micros());
        if remaining_us > 0 {
            Duration::from_micros(remaining_us as u64)
        } else {
            Duration::ZERO
        }
    }
}

/// The real clock: a monotonic microsecond counter anchored to the wall
/// clock at process start.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultClock;

impl SystemClock for DefaultClock {
    #[inline]
    fn now_micros(&self) -> i64 {
        current_time_us()
    }
}

/// A clock under test control.
///
/// `now` only moves through [`advance`](ManualClock::advance) or when a
/// waiter calls `wait_until`, which jumps straight to the deadline. A
/// thread that would have slept until the next refill instead observes the
/// refill time as already reached and performs the refill itself.
///
/// # Example
///
/// ```rust
/// use iorate::{ManualClock, SystemClock};
///
/// let clock = ManualClock::new(1_000);
/// assert_eq!(clock.now_micros(), 1_000);
/// clock.advance(500);
/// assert_eq!(clock.now_micros(), 1_500);
/// assert!(clock.wait_until(5_000).is_zero());
/// assert_eq!(clock.now_micros(), 5_000);
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now_us: AtomicI64,
}

impl ManualClock {
    /// Creates a clock reading `start_us`.
    pub fn new(start_us: i64) -> Self {
        Self {
            now_us: AtomicI64::new(start_us),
        }
    }

    /// Moves the clock forward by `delta_us`.
    pub fn advance(&self, delta_us: i64) {
        debug_assert!(delta_us >= 0);
        self.now_us.fetch_add(delta_us, Ordering::Relaxed);
    }
}

impl SystemClock for ManualClock {
    fn now_micros(&self) -> i64 {
        self.now_us.load(Ordering::Relaxed)
    }

    fn wait_until(&self, deadline_us: i64) -> Duration {
        // Never move backwards; a deadline in the past is a no-op.
        self.now_us.fetch_max(deadline_us, Ordering::Relaxed);
        Duration::ZERO
    }
}
