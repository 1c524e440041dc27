//! # iorate - Multi-Tenant I/O Rate Limiter
//!
//! A blocking, byte-granular rate limiter for storage-engine I/O. It
//! throttles compaction, flush, and read traffic across a fixed set of
//! logical *tenants*, giving each an equal token budget per refill period
//! while draining a tenant's own requests in strict priority order.
//!
//! ## How Throttling Works
//!
//! Every tenant owns a token bucket counted in bytes. Buckets are reset,
//! not topped up, once per refill period:
//!
//! ```text
//!     One refill period (default 100 ms):
//!
//!     tenant 0: [██████████] 1 MB ──► requests drain it ──► [░░░░░░░░░░] 0
//!     tenant 1: [██████████] 1 MB ──► idle               ──► [██████████] discarded at reset
//!     tenant 2: [██████████] 1 MB ──► half used          ──► [█████░░░░░] discarded at reset
//!
//!     Next refill: every bucket reads 1 MB again. Unused tokens do not
//!     accumulate, so an idle tenant cannot burst beyond one period.
//! ```
//!
//! A request that finds its bucket empty enqueues and blocks. There is no
//! refill thread: the blocked requesters themselves elect one waiter to
//! sleep until the refill time and whoever observes the deadline as passed
//! resets the buckets and grants queued requests, tenants in random order,
//! priorities strictly descending.
//!
//! ## Features
//!
//! - 🪣 **Per-tenant buckets** - noisy neighbors cannot starve other tenants
//! - 📶 **Strict priorities** - `User` before `High` before `Mid` before `Low`
//! - 🧵 **No background thread** - coordinator duties rotate among blocked callers
//! - 📖 **Read/write split** - an optional inner limiter throttles reads at
//!   its own rate
//! - ⏱️ **Injected clock** - deterministic tests with [`ManualClock`]
//!
//! ## Quick Start
//!
//! ```rust
//! use iorate::{IoPriority, MultiTenantRateLimiter, OpType, RateLimiter, set_thread_tenant};
//!
//! // 10 MB/s per tenant, refilled every 100 ms.
//! let limiter = MultiTenantRateLimiter::new(10_000_000);
//!
//! // Worker threads declare their tenant once.
//! set_thread_tenant(0);
//!
//! // Charge 4 KB of write traffic; blocks when the bucket is empty.
//! let charged = limiter.request_token(4096, 0, IoPriority::High, None, OpType::Write);
//! assert_eq!(charged, 4096);
//! # iorate::clear_thread_tenant();
//! ```
//!
//! ## Builder
//!
//! ```rust
//! use iorate::{Mode, RateLimiter, RateLimiterBuilder};
//!
//! let limiter = RateLimiterBuilder::new()
//!     .rate_bytes_per_sec(32_000_000)      // writes budget
//!     .read_rate_bytes_per_sec(16_000_000) // separate reads budget
//!     .refill_period_us(100_000)
//!     .build();
//!
//! assert_eq!(limiter.mode(), Mode::WritesOnly);
//! assert!(limiter.read_rate_limiter().is_some());
//! ```
//!
//! ## Shutdown
//!
//! Dropping the limiter drains it, but when other threads may still be
//! blocked inside [`RateLimiter::request`], call
//! [`MultiTenantRateLimiter::shutdown`] first: it wakes every queued
//! request (which return ungranted) and blocks until all have left.
//!
//! ## Thread Safety
//!
//! All types are thread-safe. Share a limiter across threads via
//! [`SharedRateLimiter`] (an `Arc` alias).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    missing_debug_implementations
)]
#![forbid(unsafe_code)]

// Internal module
mod rate_limiter;

// Public re-exports
pub use rate_limiter::{
    clear_thread_tenant, current_time_us, priority_iteration_order, set_thread_tenant,
    thread_tenant, DefaultClock, Error, FixedTenantSource, IoPriority, ManualClock, Mode,
    MultiTenantRateLimiter, NoopStats, OpType, RateLimiter, RateLimiterConfig,
    RateLimiterMetrics, Stats, SystemClock, TenantSource, ThreadLocalTenantSource, Ticker,
    DEFAULT_FAIRNESS, DEFAULT_REFILL_PERIOD_US, FLUSH_TENANT, MAX_FAIRNESS, TENANT_COUNT,
    TENANT_INVALID, TENANT_UNSET,
};

use std::sync::Arc;

/// A limiter wrapped in `Arc` for convenient sharing across threads.
///
/// # Example
/// ```rust
/// use iorate::{MultiTenantRateLimiter, SharedRateLimiter};
/// use std::sync::Arc;
///
/// let shared: SharedRateLimiter = Arc::new(MultiTenantRateLimiter::new(10_000_000));
/// let clone = shared.clone();
/// std::thread::spawn(move || {
///     let _ = clone.metrics();
/// })
/// .join()
/// .unwrap();
/// ```
pub type SharedRateLimiter = Arc<MultiTenantRateLimiter>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum supported Rust version.
pub const MSRV: &str = "1.70.0";

/// Prelude module for convenient imports.
///
/// # Example
/// ```rust
/// use iorate::prelude::*;
///
/// let limiter = MultiTenantRateLimiter::new(1_000_000);
/// assert_eq!(limiter.mode(), Mode::WritesOnly);
/// ```
pub mod prelude {
    //! Common imports for typical embeddings.

    pub use crate::{
        set_thread_tenant, IoPriority, Mode, MultiTenantRateLimiter, OpType, RateLimiter,
        RateLimiterConfig, SharedRateLimiter, Stats,
    };
}

/// Builder for limiters with custom configuration and injected
/// collaborators.
///
/// The builder layers two things on top of [`RateLimiterConfig`]: a
/// fallible [`try_build`](RateLimiterBuilder::try_build), and injection of
/// the [`SystemClock`] and [`TenantSource`] for tests and unusual
/// embeddings.
///
/// # Example
///
/// ```rust
/// use iorate::RateLimiterBuilder;
///
/// let result = RateLimiterBuilder::new()
///     .rate_bytes_per_sec(0) // Invalid!
///     .try_build();
/// assert!(result.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiterBuilder {
    config: RateLimiterConfig,
    clock: Option<Arc<dyn SystemClock>>,
    tenants: Option<Arc<dyn TenantSource>>,
}

impl RateLimiterBuilder {
    /// Creates a builder with the default configuration, the real clock,
    /// and the thread-local tenant source.
    pub fn new() -> Self {
        Self {
            config: RateLimiterConfig::default(),
            clock: None,
            tenants: None,
        }
    }

    /// Sets the per-tenant rate in bytes per second.
    pub fn rate_bytes_per_sec(mut self, rate_bytes_per_sec: i64) -> Self {
        self.config.rate_bytes_per_sec = rate_bytes_per_sec;
        self
    }

    /// Sets the refill period in microseconds.
    pub fn refill_period_us(mut self, refill_period_us: i64) -> Self {
        self.config.refill_period_us = refill_period_us;
        self
    }

    /// Sets the anti-starvation fairness parameter.
    pub fn fairness(mut self, fairness: i32) -> Self {
        self.config.fairness = fairness;
        self
    }

    /// Sets which operation types are charged.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Enables the auto-tuned rate headroom (halves the initial rate).
    pub fn auto_tuned(mut self, auto_tuned: bool) -> Self {
        self.config.auto_tuned = auto_tuned;
        self
    }

    /// Overrides the single-burst cap; zero means one refill period's
    /// worth.
    pub fn single_burst_bytes(mut self, single_burst_bytes: i64) -> Self {
        self.config.single_burst_bytes = single_burst_bytes;
        self
    }

    /// Adds an inner read-only limiter at the given rate.
    pub fn read_rate_bytes_per_sec(mut self, read_rate_bytes_per_sec: i64) -> Self {
        self.config.read_rate_bytes_per_sec = read_rate_bytes_per_sec;
        self
    }

    /// Injects a clock. The inner read limiter, when configured, shares
    /// it.
    pub fn clock(mut self, clock: Arc<dyn SystemClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Injects a tenant source. The inner read limiter, when configured,
    /// shares it.
    pub fn tenant_source(mut self, tenants: Arc<dyn TenantSource>) -> Self {
        self.tenants = Some(tenants);
        self
    }

    /// Builds the limiter.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. Use
    /// [`try_build`](Self::try_build) to handle errors.
    pub fn build(self) -> MultiTenantRateLimiter {
        self.try_build().expect("invalid rate limiter configuration")
    }

    /// Builds the limiter, returning an error on invalid configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for the conditions listed on
    /// [`RateLimiterConfig::validate`].
    pub fn try_build(self) -> Result<MultiTenantRateLimiter, Error> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(DefaultClock));
        let tenants = self
            .tenants
            .unwrap_or_else(|| Arc::new(ThreadLocalTenantSource));
        MultiTenantRateLimiter::from_parts(self.config, clock, tenants)
    }
}

impl Default for RateLimiterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
