//! # Core Multi-Tenant Limiter Implementation
//!
//! This module implements the heart of the crate: a blocking, byte-granular
//! rate limiter that charges each request against its tenant's token bucket
//! and queues the remainder when the bucket runs dry.
//!
//! ## The Coordinator Protocol
//!
//! There is no background refill thread. Blocked requesters elect one of
//! themselves to wait for the refill time and whichever thread observes
//! the deadline as passed performs the refill, all under one mutex:
//!
//! ```text
//!     Request arrives
//!          │
//!          ▼
//!     bucket has tokens? ──Yes──► charge and return
//!          │ No
//!          ▼
//!     enqueue in queue[tenant][priority]
//!          │
//!          ▼                      refill time reached
//!     ┌─ coordinator loop ◄──────────────┐
//!     │  refill still ahead?             │
//!     │    ├─ a waiter exists → sleep on │
//!     │    │  own condvar (no deadline)  │
//!     │    └─ else become THE waiter:    │
//!     │       timed sleep until refill ──┘
//!     │  refill due → reset buckets, grant
//!     │  queues in random tenant order,
//!     │  strict priority within a tenant
//!     └─ repeat until granted or shutdown
//! ```
//!
//! When a granted thread leaves the loop it signals the front of one
//! non-empty queue before releasing the mutex, so at least one candidate
//! for future duties is always awake while work remains queued.
//!
//! ## Fairness Shape
//!
//! - Within one (tenant, priority) queue: strict FIFO.
//! - Within a tenant: strict priority, `User` down to `Low`.
//! - Across tenants: a fresh uniform-random permutation each refill, which
//!   prevents starvation when demand exceeds one period's tokens.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::clock::{DefaultClock, SystemClock};
use super::config::{Error, IoPriority, Mode, OpType, RateLimiterConfig, MICROS_PER_SECOND};
use super::metrics::{RateLimiterMetrics, Stats, Ticker};
use super::tenant::{
    TenantSource, ThreadLocalTenantSource, FLUSH_TENANT, TENANT_COUNT, TENANT_INVALID,
    TENANT_UNSET,
};
use super::utils::truncate_to_page_boundary;

/// How many requests pass between diagnostic dumps of the per-tenant call
/// counters.
const CALLS_LOG_INTERVAL: u64 = 1000;

/// The capability set shared by all limiter variants.
///
/// [`MultiTenantRateLimiter`] is the multi-bucket realization; a
/// single-bucket variant using [`priority_iteration_order`] plugs into the
/// same surface.
pub trait RateLimiter: Send + Sync {
    /// Which operation types this limiter charges.
    fn mode(&self) -> Mode;

    /// Charges `bytes` against the caller's tenant, blocking until granted
    /// or until shutdown.
    ///
    /// Requests with [`OpType::Read`] are forwarded to the inner read
    /// limiter when one exists and return untouched otherwise. `stats`
    /// receives limiter events attributed to this request.
    ///
    /// The caller must keep `bytes` within
    /// [`get_single_burst_bytes`](Self::get_single_burst_bytes); use
    /// [`request_token`](Self::request_token) to clamp automatically.
    fn request(&self, bytes: i64, pri: IoPriority, stats: Option<&dyn Stats>, op_type: OpType);

    /// Replaces the per-tenant rate. Takes effect at the next refill.
    fn set_bytes_per_second(&self, bytes_per_second: i64);

    /// The configured per-tenant rate in bytes per second.
    fn get_bytes_per_second(&self) -> i64;

    /// Overrides the largest single charge. Zero restores the default of
    /// one refill period's worth.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `single_burst_bytes` is negative.
    fn set_single_burst_bytes(&self, single_burst_bytes: i64) -> Result<(), Error>;

    /// The largest single charge currently permitted: the raw override if
    /// set, else one refill period's worth of tokens.
    fn get_single_burst_bytes(&self) -> i64;

    /// Bytes granted so far for one priority class.
    fn get_total_bytes_through(&self, pri: IoPriority) -> i64;

    /// Requests accepted so far for one priority class.
    fn get_total_requests(&self, pri: IoPriority) -> i64;

    /// Bytes granted so far across all priority classes.
    fn get_total_bytes_through_all(&self) -> i64 {
        IoPriority::ALL
            .iter()
            .map(|pri| self.get_total_bytes_through(*pri))
            .sum()
    }

    /// Requests accepted so far across all priority classes.
    fn get_total_requests_all(&self) -> i64 {
        IoPriority::ALL
            .iter()
            .map(|pri| self.get_total_requests(*pri))
            .sum()
    }

    /// Whether this limiter's mode charges the given operation type.
    fn is_rate_limited(&self, op_type: OpType) -> bool {
        match (self.mode(), op_type) {
            (Mode::AllIo, _) => true,
            (Mode::WritesOnly, OpType::Write) => true,
            (Mode::ReadsOnly, OpType::Read) => true,
            _ => false,
        }
    }

    /// Convenience wrapper around [`request`](Self::request): clamps
    /// `bytes` to the single-burst cap, applies direct-I/O alignment, and
    /// returns the byte count actually charged.
    ///
    /// With a positive `alignment`, `bytes` is rounded down to an aligned
    /// multiple but never below `alignment` itself. Direct I/O cannot
    /// transfer less than one page, so one page may exceed the burst cap
    /// rather than be skipped.
    fn request_token(
        &self,
        bytes: i64,
        alignment: i64,
        pri: IoPriority,
        stats: Option<&dyn Stats>,
        op_type: OpType,
    ) -> i64 {
        let mut bytes = bytes;
        if self.is_rate_limited(op_type) {
            bytes = bytes.min(self.get_single_burst_bytes());
            if alignment > 0 {
                bytes = truncate_to_page_boundary(alignment, bytes).max(alignment);
            }
            self.request(bytes, pri, stats, op_type);
        }
        bytes
    }
}

/// One pending request.
///
/// Shared between the requesting thread and the queue via `Arc`. The
/// outstanding count is only mutated with the request mutex held; the
/// atomic is there to make the sharing safe, not to synchronize.
struct Req {
    /// Originally requested byte count, immutable.
    bytes: i64,
    /// Outstanding demand, non-increasing toward zero.
    request_bytes: AtomicI64,
    /// Wakes this request's thread, and recruits it for coordinator
    /// duties.
    cv: Condvar,
}

impl Req {
    fn new(bytes: i64) -> Self {
        Self {
            bytes,
            request_bytes: AtomicI64::new(bytes),
            cv: Condvar::new(),
        }
    }

    #[inline]
    fn outstanding(&self) -> i64 {
        self.request_bytes.load(Ordering::Relaxed)
    }

    #[inline]
    fn set_outstanding(&self, bytes: i64) {
        self.request_bytes.store(bytes, Ordering::Relaxed);
    }
}

/// Everything guarded by the request mutex.
struct LimiterState {
    /// FIFO of pending requests per (tenant, priority).
    queues: [[VecDeque<Arc<Req>>; IoPriority::COUNT]; TENANT_COUNT],
    /// Tokens left in each tenant's bucket for the current period.
    available_bytes: [i64; TENANT_COUNT],
    /// Absolute monotonic time of the next refill.
    next_refill_us: i64,
    /// True while some thread performs the timed wait for the refill.
    wait_until_refill_pending: bool,
    /// Shutdown initiated; no further grants or refills.
    stop: bool,
    /// Enqueued requests observed at shutdown that still need to drain.
    requests_to_wait: i64,
    total_requests: [i64; IoPriority::COUNT],
    total_bytes_through: [i64; IoPriority::COUNT],
    calls_per_tenant: [u64; TENANT_COUNT],
    total_calls: u64,
    rng: SmallRng,
}

impl LimiterState {
    fn record_call(&mut self, tenant: usize, mode: Mode) {
        self.calls_per_tenant[tenant] += 1;
        self.total_calls += 1;
        if self.total_calls % CALLS_LOG_INTERVAL == 0 {
            debug!(?mode, calls = ?self.calls_per_tenant, "per-tenant request counts");
        }
    }

    fn pending_requests(&self) -> usize {
        self.queues.iter().flatten().map(VecDeque::len).sum()
    }
}

/// A blocking I/O rate limiter with one token bucket per tenant.
///
/// Each tenant receives an equal quota of
/// `rate_bytes_per_sec × refill_period / 1s` tokens every refill period.
/// Unused tokens do not carry over; the bucket is reset, which caps the
/// short-term burst of an idle tenant to one period's worth.
///
/// When `read_rate_bytes_per_sec` is configured, the limiter owns a second
/// limiter for reads and dispatches on [`OpType`], forming a two-bucket
/// system with independent rates.
///
/// All methods take `&self`; share the limiter across threads with `Arc`.
///
/// # Example
///
/// ```rust
/// use iorate::{IoPriority, MultiTenantRateLimiter, OpType, RateLimiter, set_thread_tenant};
///
/// let limiter = MultiTenantRateLimiter::new(10_000_000);
///
/// set_thread_tenant(2);
/// let charged = limiter.request_token(4096, 0, IoPriority::User, None, OpType::Write);
/// assert_eq!(charged, 4096);
/// assert_eq!(limiter.get_total_bytes_through(IoPriority::User), 4096);
/// # iorate::clear_thread_tenant();
/// ```
pub struct MultiTenantRateLimiter {
    mode: Mode,
    refill_period_us: i64,
    fairness: i32,
    rate_bytes_per_sec: AtomicI64,
    refill_bytes_per_period: AtomicI64,
    raw_single_burst_bytes: AtomicI64,
    clock: Arc<dyn SystemClock>,
    tenants: Arc<dyn TenantSource>,
    state: Mutex<LimiterState>,
    /// Signaled by draining requests during shutdown.
    exit_cv: Condvar,
    /// Inner limiter that throttles reads when configured.
    read_rate_limiter: Option<Box<MultiTenantRateLimiter>>,
}

impl MultiTenantRateLimiter {
    /// Creates a limiter with the given per-tenant rate and default
    /// configuration: 100 ms refill period, writes-only, no read limiter.
    pub fn new(rate_bytes_per_sec: i64) -> Self {
        Self::with_config(RateLimiterConfig::new(rate_bytes_per_sec))
    }

    /// Creates a limiter from a full configuration, with the real clock
    /// and the thread-local tenant source.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. Use
    /// [`RateLimiterBuilder::try_build`](crate::RateLimiterBuilder::try_build)
    /// to handle errors instead.
    pub fn with_config(config: RateLimiterConfig) -> Self {
        Self::from_parts(
            config,
            Arc::new(DefaultClock),
            Arc::new(ThreadLocalTenantSource),
        )
        .expect("invalid rate limiter configuration")
    }

    pub(crate) fn from_parts(
        config: RateLimiterConfig,
        clock: Arc<dyn SystemClock>,
        tenants: Arc<dyn TenantSource>,
    ) -> Result<Self, Error> {
        config.validate()?;

        let read_rate_limiter = if config.read_rate_bytes_per_sec > 0 {
            // The read bucket gets its own limiter with default period and
            // fairness; it charges everything handed to it, so it runs in
            // the writes-only mode with no nested read limiter.
            let inner_config = RateLimiterConfig::new(config.read_rate_bytes_per_sec);
            Some(Box::new(Self::from_parts(
                inner_config,
                Arc::clone(&clock),
                Arc::clone(&tenants),
            )?))
        } else {
            None
        };

        let rate_bytes_per_sec = if config.auto_tuned {
            config.rate_bytes_per_sec / 2
        } else {
            config.rate_bytes_per_sec
        };
        let refill_bytes_per_period =
            calculate_refill_bytes_per_period(rate_bytes_per_sec, config.refill_period_us);

        let state = LimiterState {
            queues: std::array::from_fn(|_| std::array::from_fn(|_| VecDeque::new())),
            available_bytes: [0; TENANT_COUNT],
            next_refill_us: clock.now_micros_monotonic(),
            wait_until_refill_pending: false,
            stop: false,
            requests_to_wait: 0,
            total_requests: [0; IoPriority::COUNT],
            total_bytes_through: [0; IoPriority::COUNT],
            calls_per_tenant: [0; TENANT_COUNT],
            total_calls: 0,
            rng: SmallRng::seed_from_u64(clock.now_micros() as u64),
        };

        Ok(Self {
            mode: config.mode,
            refill_period_us: config.refill_period_us,
            fairness: config.clamped_fairness(),
            rate_bytes_per_sec: AtomicI64::new(rate_bytes_per_sec),
            refill_bytes_per_period: AtomicI64::new(refill_bytes_per_period),
            raw_single_burst_bytes: AtomicI64::new(config.single_burst_bytes),
            clock,
            tenants,
            state: Mutex::new(state),
            exit_cv: Condvar::new(),
            read_rate_limiter,
        })
    }

    /// The inner read limiter, when one was configured.
    pub fn read_rate_limiter(&self) -> Option<&MultiTenantRateLimiter> {
        self.read_rate_limiter.as_deref()
    }

    /// Draws a [`priority_iteration_order`] schedule using this limiter's
    /// configured fairness and internal RNG.
    ///
    /// Single-bucket deployments call this once per refill; the
    /// multi-tenant grant path does not consult it.
    pub fn generate_priority_iteration_order(&self) -> [IoPriority; IoPriority::COUNT] {
        let mut state = self.state.lock();
        priority_iteration_order(self.fairness, &mut state.rng)
    }

    /// Tokens left in `tenant`'s bucket for the current period.
    ///
    /// # Panics
    ///
    /// Panics if `tenant >= TENANT_COUNT`.
    pub fn available_bytes(&self, tenant: usize) -> i64 {
        assert!(tenant < TENANT_COUNT, "tenant id out of range");
        self.state.lock().available_bytes[tenant]
    }

    /// A snapshot of all observable counters.
    pub fn metrics(&self) -> RateLimiterMetrics {
        let state = self.state.lock();
        RateLimiterMetrics {
            total_requests: state.total_requests,
            total_bytes_through: state.total_bytes_through,
            calls_per_tenant: state.calls_per_tenant,
            available_bytes: state.available_bytes,
            pending_requests: state.pending_requests(),
            rate_bytes_per_sec: self.rate_bytes_per_sec.load(Ordering::Relaxed),
            refill_bytes_per_period: self.refill_bytes_per_period.load(Ordering::Relaxed),
        }
    }

    /// Initiates shutdown and blocks until every enqueued request has
    /// returned to its caller.
    ///
    /// Pending requests are woken and exit ungranted; requests arriving
    /// afterwards return immediately without accounting. Idempotent, and
    /// invoked by `Drop` as a fallback for limiters that were never shut
    /// down explicitly.
    pub fn shutdown(&self) {
        if let Some(inner) = &self.read_rate_limiter {
            inner.shutdown();
        }

        let mut state = self.state.lock();
        if !state.stop {
            state.stop = true;
            state.requests_to_wait = state.pending_requests() as i64;
            for tenant_queues in state.queues.iter() {
                for queue in tenant_queues.iter().rev() {
                    for req in queue.iter() {
                        req.cv.notify_one();
                    }
                }
            }
        }
        while state.requests_to_wait > 0 {
            self.exit_cv.wait(&mut state);
        }
    }

    fn resolve_tenant(&self) -> Option<usize> {
        match self.tenants.current() {
            TENANT_INVALID => {
                debug!("dropping request with invalid tenant id");
                None
            }
            TENANT_UNSET => Some(FLUSH_TENANT),
            id if (0..TENANT_COUNT as i32).contains(&id) => Some(id as usize),
            id => {
                warn!(tenant_id = id, "tenant id out of range, dropping request");
                None
            }
        }
    }

    /// The write-path entry point; reads that reach a limiter through its
    /// inner dispatch also land here.
    fn request_inner(&self, bytes: i64, pri: IoPriority, stats: Option<&dyn Stats>) {
        let tenant = match self.resolve_tenant() {
            Some(tenant) => tenant,
            None => return,
        };

        debug_assert!(bytes <= self.get_single_burst_bytes());
        let mut bytes = bytes.max(0);

        let mut state = self.state.lock();

        if state.stop {
            // Shutdown is draining; new arrivals exit unsatisfied.
            return;
        }

        state.total_requests[pri.as_index()] += 1;
        state.record_call(tenant, self.mode);

        // Fast path: charge whatever the bucket can cover right now.
        if state.available_bytes[tenant] > 0 {
            let bytes_through = state.available_bytes[tenant].min(bytes);
            state.total_bytes_through[pri.as_index()] += bytes_through;
            state.available_bytes[tenant] -= bytes_through;
            bytes -= bytes_through;
        }

        if bytes == 0 {
            // Granted.
            return;
        }

        let req = Arc::new(Req::new(bytes));
        state.queues[tenant][pri.as_index()].push_back(Arc::clone(&req));

        // A thread representing a queued request coordinates with other
        // such threads. There are two duties:
        //
        // (1) Waiting for the next refill time.
        // (2) Refilling the buckets and granting queued requests.
        loop {
            let time_until_refill_us =
                state.next_refill_us - self.clock.now_micros_monotonic();
            if time_until_refill_us > 0 {
                if state.wait_until_refill_pending {
                    // Somebody is performing (1). Trust we'll be woken up
                    // when our request is granted or we are needed for
                    // future duties.
                    req.cv.wait(&mut state);
                } else {
                    // Whichever thread reaches here first performs duty
                    // (1).
                    let wait_until = self.clock.now_micros() + time_until_refill_us;
                    if let Some(stats) = stats {
                        stats.record_tick(Ticker::NumberRateLimiterDrains);
                    }
                    state.wait_until_refill_pending = true;
                    let timeout = self.clock.wait_until(wait_until);
                    if !timeout.is_zero() {
                        let _ = req.cv.wait_for(&mut state, timeout);
                    }
                    state.wait_until_refill_pending = false;
                }
            } else {
                // Whichever thread reaches here first performs duty (2).
                self.refill_and_grant(&mut state);
            }

            if req.outstanding() == 0 {
                // Granted. Make sure at least one candidate stays awake
                // for future duties by signaling a front request before we
                // release the mutex.
                signal_next_coordinator(&state);
            }
            if state.stop || req.outstanding() == 0 {
                break;
            }
        }

        if state.stop && req.outstanding() > 0 {
            // This request was still enqueued when shutdown counted the
            // drain set; acknowledge so the drain can finish.
            state.requests_to_wait -= 1;
            self.exit_cv.notify_one();
        }
    }

    /// Duty (2): reset every bucket to one period's tokens and drain
    /// queues, tenants in random order, priorities strictly descending.
    fn refill_and_grant(&self, state: &mut LimiterState) {
        state.next_refill_us = self.clock.now_micros_monotonic() + self.refill_period_us;

        let refill_bytes_per_period = self.refill_bytes_per_period.load(Ordering::Relaxed);

        let LimiterState {
            queues,
            available_bytes,
            total_bytes_through,
            rng,
            ..
        } = state;

        // Tokens never accumulate across periods; a stale budget is
        // discarded with the reset.
        for bucket in available_bytes.iter_mut() {
            *bucket = refill_bytes_per_period;
        }

        let mut tenant_order: [usize; TENANT_COUNT] = std::array::from_fn(|i| i);
        tenant_order.shuffle(rng);

        let mut granted = 0usize;
        for &tenant in tenant_order.iter() {
            for pri_index in (0..IoPriority::COUNT).rev() {
                let queue = &mut queues[tenant][pri_index];
                while let Some(outstanding) = queue.front().map(|req| req.outstanding()) {
                    if available_bytes[tenant] < outstanding {
                        // Grant partial bytes even though the head wants
                        // more than the bucket holds, which happens when
                        // other requests consumed the period's budget, the
                        // rate was lowered with requests enqueued, or the
                        // burst cap exceeds the refill size.
                        if let Some(front) = queue.front() {
                            front.set_outstanding(outstanding - available_bytes[tenant]);
                        }
                        available_bytes[tenant] = 0;
                        break;
                    }
                    if let Some(req) = queue.pop_front() {
                        available_bytes[tenant] -= outstanding;
                        req.set_outstanding(0);
                        total_bytes_through[pri_index] += req.bytes;
                        // Quota granted, wake the owning thread.
                        req.cv.notify_one();
                        granted += 1;
                    }
                }
            }
        }

        debug!(granted, refill_bytes_per_period, "refilled tenant buckets");
    }
}

impl RateLimiter for MultiTenantRateLimiter {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn request(&self, bytes: i64, pri: IoPriority, stats: Option<&dyn Stats>, op_type: OpType) {
        if op_type == OpType::Read {
            if let Some(inner) = &self.read_rate_limiter {
                inner.request_inner(bytes, pri, stats);
                return;
            }
        }
        if !self.is_rate_limited(op_type) {
            // Nothing throttles this operation type: no dedicated read
            // bucket above, and the mode excludes it from the main one.
            return;
        }
        self.request_inner(bytes, pri, stats);
    }

    fn set_bytes_per_second(&self, bytes_per_second: i64) {
        debug_assert!(bytes_per_second > 0);
        let _guard = self.state.lock();
        self.rate_bytes_per_sec
            .store(bytes_per_second, Ordering::Relaxed);
        self.refill_bytes_per_period.store(
            calculate_refill_bytes_per_period(bytes_per_second, self.refill_period_us),
            Ordering::Relaxed,
        );
    }

    fn get_bytes_per_second(&self) -> i64 {
        self.rate_bytes_per_sec.load(Ordering::Relaxed)
    }

    fn set_single_burst_bytes(&self, single_burst_bytes: i64) -> Result<(), Error> {
        if single_burst_bytes < 0 {
            return Err(Error::InvalidArgument(
                "`single_burst_bytes` must be greater than or equal to 0",
            ));
        }
        let _guard = self.state.lock();
        self.raw_single_burst_bytes
            .store(single_burst_bytes, Ordering::Relaxed);
        Ok(())
    }

    fn get_single_burst_bytes(&self) -> i64 {
        let raw = self.raw_single_burst_bytes.load(Ordering::Relaxed);
        if raw > 0 {
            raw
        } else {
            self.refill_bytes_per_period.load(Ordering::Relaxed)
        }
    }

    fn get_total_bytes_through(&self, pri: IoPriority) -> i64 {
        self.state.lock().total_bytes_through[pri.as_index()]
    }

    fn get_total_requests(&self, pri: IoPriority) -> i64 {
        self.state.lock().total_requests[pri.as_index()]
    }
}

impl Drop for MultiTenantRateLimiter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for MultiTenantRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiTenantRateLimiter")
            .field("mode", &self.mode)
            .field(
                "rate_bytes_per_sec",
                &self.rate_bytes_per_sec.load(Ordering::Relaxed),
            )
            .field("refill_period_us", &self.refill_period_us)
            .field("fairness", &self.fairness)
            .field("has_read_limiter", &self.read_rate_limiter.is_some())
            .finish()
    }
}

/// Signals the front record of the first non-empty queue, scanning tenants
/// in index order and priorities from `User` down, so a coordinator
/// candidate is awake whenever work remains.
fn signal_next_coordinator(state: &LimiterState) {
    for tenant_queues in state.queues.iter() {
        for queue in tenant_queues.iter().rev() {
            if let Some(front) = queue.front() {
                front.cv.notify_one();
                return;
            }
        }
    }
}

/// One period's refill, clamped so `rate × period` cannot overflow.
fn calculate_refill_bytes_per_period(rate_bytes_per_sec: i64, refill_period_us: i64) -> i64 {
    if i64::MAX / rate_bytes_per_sec < refill_period_us {
        // The result is inaccurate in the overflow case but still a number
        // large enough to never throttle.
        i64::MAX / MICROS_PER_SECOND
    } else {
        rate_bytes_per_sec * refill_period_us / MICROS_PER_SECOND
    }
}

/// The randomized priority schedule used by single-bucket deployments.
///
/// `User` always drains first. `High` precedes `Mid` and `Low` with
/// probability `1 - 1/fairness`, and independently `Mid` precedes `Low`
/// with probability `1 - 1/fairness`, so lower classes occasionally jump
/// ahead and cannot starve. The multi-tenant refill path does not use this
/// schedule; it keeps strict priority and randomizes across tenants
/// instead.
///
/// # Example
///
/// ```rust
/// use iorate::{priority_iteration_order, IoPriority};
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let order = priority_iteration_order(10, &mut rng);
/// assert_eq!(order[0], IoPriority::User);
/// ```
pub fn priority_iteration_order<R: Rng>(
    fairness: i32,
    rng: &mut R,
) -> [IoPriority; IoPriority::COUNT] {
    let fairness = fairness.clamp(1, super::config::MAX_FAIRNESS) as u32;
    let mut order = [IoPriority::User; IoPriority::COUNT];

    let high_after_mid_low = rng.gen_ratio(1, fairness);
    let mid_after_low = rng.gen_ratio(1, fairness);

    if high_after_mid_low {
        order[3] = IoPriority::High;
        order[2] = if mid_after_low {
            IoPriority::Mid
        } else {
            IoPriority::Low
        };
        order[1] = if order[2] == IoPriority::Mid {
            IoPriority::Low
        } else {
            IoPriority::Mid
        };
    } else {
        order[1] = IoPriority::High;
        order[3] = if mid_after_low {
            IoPriority::Mid
        } else {
            IoPriority::Low
        };
        order[2] = if order[3] == IoPriority::Mid {
            IoPriority::Low
        } else {
            IoPriority::Mid
        };
    }

    order
}
