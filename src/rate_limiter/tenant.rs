//! Tenant identity.
//!
//! Every request is charged against exactly one tenant's bucket. The
//! limiter does not decide which tenant a thread belongs to; it asks an
//! injected [`TenantSource`]. The default source reads a thread-local set
//! by the embedding application when it spawns worker threads, mirroring
//! how a storage engine tags its compaction and flush workers.

use std::cell::Cell;
use std::fmt;

/// Number of tenants. Buckets and queues are statically sized by this.
pub const TENANT_COUNT: usize = 5;

/// Tenant that absorbs traffic from threads with no tenant assigned,
/// typically shared flush work.
pub const FLUSH_TENANT: usize = 1;

/// Sentinel: the calling thread has no tenant assigned. Such requests are
/// charged to [`FLUSH_TENANT`].
pub const TENANT_UNSET: i32 = -1;

/// Sentinel: the calling thread's tenant id is known to be bad. Such
/// requests are dropped without blocking and without accounting.
pub const TENANT_INVALID: i32 = -2;

/// Source of the calling thread's tenant id.
///
/// Implementations return a value in `0..TENANT_COUNT`, or one of
/// [`TENANT_UNSET`] / [`TENANT_INVALID`]. Any other value is treated as
/// invalid by the limiter.
///
/// Implementations must not panic; the limiter calls `current` while
/// servicing every request.
pub trait TenantSource: Send + Sync + fmt::Debug {
    /// The tenant id of the calling thread.
    fn current(&self) -> i32;
}

thread_local! {
    static CURRENT_TENANT: Cell<i32> = const { Cell::new(TENANT_UNSET) };
}

/// Assigns a tenant id to the calling thread, as seen by
/// [`ThreadLocalTenantSource`].
///
/// # Example
///
/// ```rust
/// use iorate::{set_thread_tenant, thread_tenant};
///
/// set_thread_tenant(2);
/// assert_eq!(thread_tenant(), 2);
/// ```
pub fn set_thread_tenant(tenant_id: i32) {
    CURRENT_TENANT.with(|cell| cell.set(tenant_id));
}

/// The calling thread's tenant id, [`TENANT_UNSET`] if none was assigned.
pub fn thread_tenant() -> i32 {
    CURRENT_TENANT.with(Cell::get)
}

/// Resets the calling thread's tenant id to [`TENANT_UNSET`].
pub fn clear_thread_tenant() {
    set_thread_tenant(TENANT_UNSET);
}

/// The default tenant source: reads the thread-local id set through
/// [`set_thread_tenant`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadLocalTenantSource;

impl TenantSource for ThreadLocalTenantSource {
    fn current(&self) -> i32 {
        thread_tenant()
    }
}

/// A tenant source that always answers with the same id. Useful in tests
/// and single-tenant embeddings.
#[derive(Debug, Clone, Copy)]
pub struct FixedTenantSource(
    /// The id reported for every thread.
    pub i32,
);

impl TenantSource for FixedTenantSource {
    fn current(&self) -> i32 {
        self.0
    }
}
