//! # Rate Limiter Configuration
//!
//! Configuration types for the multi-tenant I/O rate limiter. Think of this
//! as the "settings panel": how fast tokens refill, how large a single
//! charge may be, and which operation types are throttled at all.
//!
//! ## Token Bucket Parameters
//!
//! ```text
//!     Per-Tenant Bucket Configuration:
//!
//!     ┌──────────────────────────────────┐
//!     │  rate_bytes_per_sec: 10 MB/s     │ ← Sustained rate per tenant
//!     │  refill_period_us:   100_000     │ ← Bucket reset interval
//!     │                                  │
//!     │  refill per period = rate × period / 1e6
//!     │                    = 1 MB        │
//!     │                                  │
//!     │  single_burst_bytes: 0           │ ← 0 means one period's refill
//!     └──────────────────────────────────┘
//! ```
//!
//! ## Operation Modes
//!
//! A limiter throttles reads, writes, or both. The common storage-engine
//! arrangement is a writes-only limiter that owns a second, read-only
//! limiter, selected per request by [`OpType`].

use thiserror::Error;

/// Microseconds per second, the unit conversion used throughout.
pub(crate) const MICROS_PER_SECOND: i64 = 1_000_000;

/// Default refill period: 100 ms.
pub const DEFAULT_REFILL_PERIOD_US: i64 = 100_000;

/// Default anti-starvation fairness parameter.
pub const DEFAULT_FAIRNESS: i32 = 10;

/// Upper bound on the fairness parameter; larger values are clamped.
pub const MAX_FAIRNESS: i32 = 100;

/// Error type for the crate.
///
/// The limiter itself cannot fail a request (it blocks, is granted, or
/// returns on shutdown); errors only arise from invalid configuration or
/// invalid setter arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An argument was outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// I/O priority class of a request.
///
/// Priorities are strict within a tenant: each refill drains `User` fully
/// before `High`, `High` before `Mid`, and `Mid` before `Low`. There is no
/// weighting between classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(usize)]
pub enum IoPriority {
    /// Background work that can wait, e.g. bottom-level compaction.
    Low = 0,
    /// Mid-priority background work.
    Mid = 1,
    /// Latency-sensitive background work, e.g. flushes ahead of a stall.
    High = 2,
    /// Foreground user requests. Always drained first.
    User = 3,
}

impl IoPriority {
    /// Number of real priority classes.
    pub const COUNT: usize = 4;

    /// All priorities in ascending order.
    pub const ALL: [IoPriority; IoPriority::COUNT] = [
        IoPriority::Low,
        IoPriority::Mid,
        IoPriority::High,
        IoPriority::User,
    ];

    /// Index into per-priority counter arrays.
    #[inline(always)]
    pub fn as_index(self) -> usize {
        self as usize
    }

    /// The priority at `index` in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= IoPriority::COUNT`.
    #[inline(always)]
    pub fn from_index(index: usize) -> IoPriority {
        IoPriority::ALL[index]
    }
}

/// Operation type of a request, used to select which bucket (if any)
/// throttles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    /// A read operation.
    Read,
    /// A write operation.
    Write,
}

/// Which operation types a limiter instance throttles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Only read operations are charged.
    ReadsOnly,
    /// Only write operations are charged. The default, matching the usual
    /// arrangement where reads go to a dedicated inner limiter.
    #[default]
    WritesOnly,
    /// Both operation types are charged.
    AllIo,
}

/// Configuration for a [`MultiTenantRateLimiter`](super::MultiTenantRateLimiter).
///
/// Create one with [`RateLimiterConfig::new`] and adjust it with the
/// fluent setters, or fill the fields directly.
///
/// # Example
///
/// ```rust
/// use iorate::{Mode, RateLimiterConfig};
///
/// // 10 MB/s per tenant, throttling both reads and writes from one bucket.
/// let config = RateLimiterConfig::new(10_000_000).with_mode(Mode::AllIo);
/// assert!(config.validate().is_ok());
///
/// // 32 MB/s for writes plus a separate 16 MB/s read bucket.
/// let config = RateLimiterConfig::new(32_000_000).with_read_rate_bytes_per_sec(16_000_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Sustained refill rate per tenant, in bytes per second. Must be
    /// positive.
    pub rate_bytes_per_sec: i64,

    /// Interval between bucket resets in microseconds. Must be positive.
    /// Shorter periods lower worst-case latency; longer periods lower
    /// coordination overhead.
    pub refill_period_us: i64,

    /// Anti-starvation parameter for the randomized priority schedule used
    /// by single-bucket deployments (see
    /// [`priority_iteration_order`](super::priority_iteration_order)).
    /// Must be positive; values above [`MAX_FAIRNESS`] are clamped.
    pub fairness: i32,

    /// Which operation types this limiter charges.
    pub mode: Mode,

    /// When true, the initial rate is halved to leave headroom for a
    /// tuner that adjusts the rate at runtime.
    pub auto_tuned: bool,

    /// Largest single charge permitted, in bytes. Zero means "one refill
    /// period's worth", which is the usual choice.
    pub single_burst_bytes: i64,

    /// When positive, the limiter owns an inner read-only limiter refilled
    /// at this rate, and read requests are forwarded to it.
    pub read_rate_bytes_per_sec: i64,
}

impl Default for RateLimiterConfig {
    /// Default configuration: 64 MiB/s per tenant, 100 ms refill period,
    /// fairness 10, writes-only, no burst override, no read limiter.
    fn default() -> Self {
        Self {
            rate_bytes_per_sec: 64 << 20,
            refill_period_us: DEFAULT_REFILL_PERIOD_US,
            fairness: DEFAULT_FAIRNESS,
            mode: Mode::default(),
            auto_tuned: false,
            single_burst_bytes: 0,
            read_rate_bytes_per_sec: 0,
        }
    }
}

impl RateLimiterConfig {
    /// Creates a configuration with the given per-tenant rate and defaults
    /// for everything else.
    pub fn new(rate_bytes_per_sec: i64) -> Self {
        Self {
            rate_bytes_per_sec,
            ..Default::default()
        }
    }

    /// Sets the refill period in microseconds.
    pub fn with_refill_period_us(mut self, refill_period_us: i64) -> Self {
        self.refill_period_us = refill_period_us;
        self
    }

    /// Sets the fairness parameter.
    pub fn with_fairness(mut self, fairness: i32) -> Self {
        self.fairness = fairness;
        self
    }

    /// Sets which operation types are charged.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables or disables the auto-tuned rate headroom.
    pub fn with_auto_tuned(mut self, auto_tuned: bool) -> Self {
        self.auto_tuned = auto_tuned;
        self
    }

    /// Overrides the single-burst cap. Zero restores the default of one
    /// refill period's worth.
    pub fn with_single_burst_bytes(mut self, single_burst_bytes: i64) -> Self {
        self.single_burst_bytes = single_burst_bytes;
        self
    }

    /// Requests an inner read-only limiter at the given rate.
    pub fn with_read_rate_bytes_per_sec(mut self, read_rate_bytes_per_sec: i64) -> Self {
        self.read_rate_bytes_per_sec = read_rate_bytes_per_sec;
        self
    }

    /// The fairness value actually used, clamped to [`MAX_FAIRNESS`].
    #[inline]
    pub(crate) fn clamped_fairness(&self) -> i32 {
        self.fairness.min(MAX_FAIRNESS)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when:
    /// - `rate_bytes_per_sec` is not positive
    /// - `refill_period_us` is not positive
    /// - `fairness` is not positive
    /// - `single_burst_bytes` is negative
    /// - `read_rate_bytes_per_sec` is negative
    ///
    /// # Example
    ///
    /// ```rust
    /// use iorate::RateLimiterConfig;
    ///
    /// assert!(RateLimiterConfig::new(0).validate().is_err());
    /// assert!(RateLimiterConfig::new(1_000_000).validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), Error> {
        if self.rate_bytes_per_sec <= 0 {
            return Err(Error::InvalidArgument(
                "`rate_bytes_per_sec` must be greater than 0",
            ));
        }
        if self.refill_period_us <= 0 {
            return Err(Error::InvalidArgument(
                "`refill_period_us` must be greater than 0",
            ));
        }
        if self.fairness <= 0 {
            return Err(Error::InvalidArgument("`fairness` must be greater than 0"));
        }
        if self.single_burst_bytes < 0 {
            return Err(Error::InvalidArgument(
                "`single_burst_bytes` must be greater than or equal to 0",
            ));
        }
        if self.read_rate_bytes_per_sec < 0 {
            return Err(Error::InvalidArgument(
                "`read_rate_bytes_per_sec` must be greater than or equal to 0",
            ));
        }
        Ok(())
    }
}
