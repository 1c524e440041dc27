//! # Rate Limiter Module
//!
//! Internal implementation of the multi-tenant I/O rate limiter, organized
//! by responsibility:
//!
//! ```text
//!     rate_limiter/
//!     ├── mod.rs          (You are here - Module organization)
//!     ├── config.rs       (Priorities, modes, configuration)
//!     ├── core.rs         (Coordinator protocol and refill engine)
//!     ├── clock.rs        (Injected time source and timed waits)
//!     ├── tenant.rs       (Tenant identity source)
//!     ├── metrics.rs      (Stats sink and counter snapshots)
//!     └── utils.rs        (Time base, alignment helpers)
//! ```
//!
//! ## Request Flow
//!
//! ```text
//!     Caller thread
//!          │
//!          ▼
//!     ┌──────────┐   READ with inner limiter
//!     │   Core   │ ─────────────────────────► inner Core (read bucket)
//!     └────┬─────┘
//!          │ tenant id from TenantSource
//!          ▼
//!     per-tenant bucket ──empty──► queue[tenant][priority]
//!          │                            │
//!          ▼                            ▼
//!       granted ◄──── refill-and-grant (elected among waiters,
//!                     deadline from SystemClock)
//! ```

mod clock;
mod config;
mod core;
mod metrics;
mod tenant;
mod utils;

/// Injected time source and the simulated/real clocks.
pub use self::clock::{DefaultClock, ManualClock, SystemClock};

/// Priorities, operation types, modes, configuration, and the error type.
pub use self::config::{
    Error, IoPriority, Mode, OpType, RateLimiterConfig, DEFAULT_FAIRNESS,
    DEFAULT_REFILL_PERIOD_US, MAX_FAIRNESS,
};

/// The limiter itself, the capability trait, and the single-bucket
/// priority schedule.
pub use self::core::{priority_iteration_order, MultiTenantRateLimiter, RateLimiter};

/// Telemetry sink and counter snapshots.
pub use self::metrics::{NoopStats, RateLimiterMetrics, Stats, Ticker};

/// Tenant identity source and the thread-local helpers.
pub use self::tenant::{
    clear_thread_tenant, set_thread_tenant, thread_tenant, FixedTenantSource, TenantSource,
    ThreadLocalTenantSource, FLUSH_TENANT, TENANT_COUNT, TENANT_INVALID, TENANT_UNSET,
};

/// Monotonic microsecond counter used by the default clock.
pub use self::utils::current_time_us;
