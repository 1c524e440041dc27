//! Statistics sink and observable counters.
//!
//! Two observability paths exist and they are deliberately separate:
//!
//! - [`Stats`] is a narrow sink the limiter *pushes* events into while it
//!   runs, injected per request by the caller. The embedding storage
//!   engine forwards these into its own telemetry.
//! - [`RateLimiterMetrics`] is a snapshot the caller *pulls* with
//!   [`metrics`](super::MultiTenantRateLimiter::metrics), suitable for
//!   logging or tests.

use std::fmt;

use super::config::IoPriority;
use super::tenant::TENANT_COUNT;

/// Events the limiter reports to an injected [`Stats`] sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Ticker {
    /// A blocked request drained the bucket and began the timed wait for
    /// the next refill.
    NumberRateLimiterDrains,
}

/// A telemetry sink for limiter events.
///
/// Implementations must be thread-safe and must not panic; ticks are
/// recorded while requests are being serviced.
pub trait Stats: Send + Sync {
    /// Records one occurrence of `ticker`.
    fn record_tick(&self, ticker: Ticker);
}

/// A [`Stats`] sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStats;

impl Stats for NoopStats {
    fn record_tick(&self, _ticker: Ticker) {}
}

/// Point-in-time snapshot of a limiter's counters.
///
/// # Example
///
/// ```rust
/// use iorate::MultiTenantRateLimiter;
///
/// let limiter = MultiTenantRateLimiter::new(10_000_000);
/// let metrics = limiter.metrics();
/// assert_eq!(metrics.total_requests_all(), 0);
/// println!("{}", metrics.summary());
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiterMetrics {
    /// Requests accepted per priority class, including those granted from
    /// the fast path.
    pub total_requests: [i64; IoPriority::COUNT],

    /// Bytes granted per priority class.
    pub total_bytes_through: [i64; IoPriority::COUNT],

    /// Requests observed per tenant, diagnostics only.
    pub calls_per_tenant: [u64; TENANT_COUNT],

    /// Tokens left in each tenant's bucket for the current period.
    pub available_bytes: [i64; TENANT_COUNT],

    /// Requests currently enqueued across all tenants and priorities.
    pub pending_requests: usize,

    /// Configured per-tenant rate in bytes per second.
    pub rate_bytes_per_sec: i64,

    /// Bytes added to every tenant's bucket at each refill.
    pub refill_bytes_per_period: i64,
}

impl RateLimiterMetrics {
    /// Bytes granted for one priority class.
    #[inline]
    pub fn bytes_through(&self, pri: IoPriority) -> i64 {
        self.total_bytes_through[pri.as_index()]
    }

    /// Requests accepted for one priority class.
    #[inline]
    pub fn requests(&self, pri: IoPriority) -> i64 {
        self.total_requests[pri.as_index()]
    }

    /// Bytes granted across all priority classes.
    #[inline]
    pub fn total_bytes_through_all(&self) -> i64 {
        self.total_bytes_through.iter().sum()
    }

    /// Requests accepted across all priority classes.
    #[inline]
    pub fn total_requests_all(&self) -> i64 {
        self.total_requests.iter().sum()
    }

    /// A human-readable multi-line report.
    ///
    /// ```text
    /// RateLimiter Metrics:
    /// ├─ Rate: 10000000 B/s (1000000 B/period)
    /// ├─ Throughput:
    /// │  ├─ User: 12 requests, 49152 bytes
    /// │  ├─ High: 0 requests, 0 bytes
    /// │  ├─ Mid: 3 requests, 12288 bytes
    /// │  └─ Low: 1 requests, 4096 bytes
    /// └─ Pending: 0 requests
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "RateLimiter Metrics:\n\
             ├─ Rate: {} B/s ({} B/period)\n\
             ├─ Throughput:\n\
             │  ├─ User: {} requests, {} bytes\n\
             │  ├─ High: {} requests, {} bytes\n\
             │  ├─ Mid: {} requests, {} bytes\n\
             │  └─ Low: {} requests, {} bytes\n\
             └─ Pending: {} requests",
            self.rate_bytes_per_sec,
            self.refill_bytes_per_period,
            self.requests(IoPriority::User),
            self.bytes_through(IoPriority::User),
            self.requests(IoPriority::High),
            self.bytes_through(IoPriority::High),
            self.requests(IoPriority::Mid),
            self.bytes_through(IoPriority::Mid),
            self.requests(IoPriority::Low),
            self.bytes_through(IoPriority::Low),
            self.pending_requests,
        )
    }
}

impl fmt::Display for RateLimiterMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
