//! Threaded end-to-end scenarios driven by the real clock.
//!
//! Deterministic single-threaded protocol coverage lives in the unit
//! tests; these exercise the limiter the way a storage engine does, with
//! worker threads blocking across refill periods.

use iorate::{
    clear_thread_tenant, set_thread_tenant, IoPriority, MultiTenantRateLimiter, OpType,
    RateLimiter, RateLimiterBuilder, RateLimiterConfig, TENANT_INVALID,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_cross_tenant_isolation() {
    // 10 MB/s per tenant, 100 ms periods: each bucket holds 1 MB.
    let limiter = Arc::new(MultiTenantRateLimiter::new(10_000_000));

    // Tenant 0 saturates its own bucket with a full-burst request.
    let hog = Arc::clone(&limiter);
    thread::spawn(move || {
        set_thread_tenant(0);
        hog.request(1_000_000, IoPriority::User, None, OpType::Write);
    })
    .join()
    .unwrap();
    assert_eq!(limiter.available_bytes(0), 0);

    // Tenant 2 must complete from its own bucket without waiting for a
    // refill.
    let other = Arc::clone(&limiter);
    let latency = thread::spawn(move || {
        set_thread_tenant(2);
        let start = Instant::now();
        other.request(1_000, IoPriority::Low, None, OpType::Write);
        start.elapsed()
    })
    .join()
    .unwrap();

    println!("tenant 2 latency under tenant 0 saturation: {latency:?}");
    assert!(
        latency < Duration::from_millis(50),
        "tenant 2 waited {latency:?} behind tenant 0"
    );
    assert_eq!(limiter.available_bytes(2), 999_000);
}

#[test]
fn test_priority_order_within_tenant() {
    // 5 MB/s over 200 ms periods: 1 MB per refill for tenant 3.
    let limiter = Arc::new(MultiTenantRateLimiter::with_config(
        RateLimiterConfig::new(5_000_000).with_refill_period_us(200_000),
    ));

    // Empty tenant 3's bucket so the contenders all enqueue.
    let drain = Arc::clone(&limiter);
    thread::spawn(move || {
        set_thread_tenant(3);
        drain.request(1_000_000, IoPriority::User, None, OpType::Write);
    })
    .join()
    .unwrap();
    assert_eq!(limiter.available_bytes(3), 0);

    // Three 500 KB requests contend for the next 1 MB refill. Enqueue
    // order is Low first; grant order must still be User, Mid, Low.
    let mut done = Vec::new();
    let mut workers = Vec::new();
    for pri in [IoPriority::Low, IoPriority::User, IoPriority::Mid] {
        let flag = Arc::new(AtomicBool::new(false));
        done.push((pri, Arc::clone(&flag)));
        let limiter = Arc::clone(&limiter);
        workers.push(thread::spawn(move || {
            set_thread_tenant(3);
            limiter.request(500_000, pri, None, OpType::Write);
            flag.store(true, Ordering::SeqCst);
        }));
        // Keep enqueue order stable.
        thread::sleep(Duration::from_millis(10));
    }

    // Before the refill nobody has been granted.
    thread::sleep(Duration::from_millis(50));
    for (pri, flag) in &done {
        assert!(!flag.load(Ordering::SeqCst), "{pri:?} granted early");
    }

    // After the first refill the 1 MB budget covers User and Mid only.
    thread::sleep(Duration::from_millis(200));
    for (pri, flag) in &done {
        let granted = flag.load(Ordering::SeqCst);
        match pri {
            IoPriority::Low => assert!(!granted, "Low overtook higher priorities"),
            _ => assert!(granted, "{pri:?} not granted by the first refill"),
        }
    }
    assert_eq!(limiter.get_total_bytes_through(IoPriority::User), 1_500_000);
    assert_eq!(limiter.get_total_bytes_through(IoPriority::Mid), 500_000);
    assert_eq!(limiter.get_total_bytes_through(IoPriority::Low), 0);

    // The next refill clears the leftover Low request.
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(limiter.get_total_bytes_through(IoPriority::Low), 500_000);
}

#[test]
fn test_shutdown_drains_blocked_requests() {
    // 100 bytes per period against 500 KB requests: nowhere near
    // satisfiable, so all three workers stay blocked until shutdown.
    let limiter = Arc::new(MultiTenantRateLimiter::with_config(
        RateLimiterConfig::new(1_000).with_single_burst_bytes(1_000_000),
    ));

    let mut workers = Vec::new();
    let mut done = Vec::new();
    for tenant in 0..3 {
        let flag = Arc::new(AtomicBool::new(false));
        done.push(Arc::clone(&flag));
        let limiter = Arc::clone(&limiter);
        workers.push(thread::spawn(move || {
            set_thread_tenant(tenant);
            limiter.request(500_000, IoPriority::High, None, OpType::Write);
            flag.store(true, Ordering::SeqCst);
        }));
    }

    // Let everyone enqueue and sit through a couple of starved refills.
    thread::sleep(Duration::from_millis(250));
    for flag in &done {
        assert!(!flag.load(Ordering::SeqCst));
    }

    // Shutdown returns only after all three acknowledged the drain, and
    // all three request calls return ungranted.
    limiter.shutdown();
    for worker in workers {
        worker.join().unwrap();
    }
    for flag in &done {
        assert!(flag.load(Ordering::SeqCst));
    }
}

#[test]
fn test_read_write_composition() {
    let limiter = Arc::new(
        RateLimiterBuilder::new()
            .rate_bytes_per_sec(10_000_000)
            .read_rate_bytes_per_sec(10_000_000)
            .build(),
    );

    let worker = Arc::clone(&limiter);
    thread::spawn(move || {
        set_thread_tenant(0);
        worker.request(1_000, IoPriority::User, None, OpType::Read);
        worker.request(2_000, IoPriority::User, None, OpType::Write);
    })
    .join()
    .unwrap();

    // Reads drained the inner bucket only, writes the outer only.
    let inner = limiter.read_rate_limiter().unwrap();
    assert_eq!(inner.get_total_bytes_through(IoPriority::User), 1_000);
    assert_eq!(limiter.get_total_bytes_through(IoPriority::User), 2_000);
    assert_eq!(inner.available_bytes(0), 999_000);
    assert_eq!(limiter.available_bytes(0), 998_000);
}

#[test]
fn test_read_without_inner_limiter_never_blocks() {
    // One byte per second leaves zero tokens per period, so a charged
    // request would block for a very long time. Reads must bypass it
    // entirely when no read limiter exists.
    let limiter = MultiTenantRateLimiter::with_config(
        RateLimiterConfig::new(1).with_single_burst_bytes(1_000_000),
    );

    set_thread_tenant(0);
    let start = Instant::now();
    limiter.request(500_000, IoPriority::User, None, OpType::Read);
    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(limiter.get_total_requests_all(), 0);
    clear_thread_tenant();

    // Shut down explicitly; nothing is queued, so this is immediate.
    limiter.shutdown();
}

#[test]
fn test_invalid_tenant_never_blocks() {
    let limiter = MultiTenantRateLimiter::with_config(
        RateLimiterConfig::new(1).with_single_burst_bytes(1_000_000),
    );

    set_thread_tenant(TENANT_INVALID);
    let start = Instant::now();
    limiter.request(500_000, IoPriority::User, None, OpType::Write);
    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(limiter.get_total_requests_all(), 0);
    clear_thread_tenant();
}

#[test]
fn test_throughput_stays_within_rate() {
    // 1 MB/s over 50 ms periods for tenant 0.
    let limiter = Arc::new(MultiTenantRateLimiter::with_config(
        RateLimiterConfig::new(1_000_000).with_refill_period_us(50_000),
    ));
    let per_period = 50_000i64;

    let worker = Arc::clone(&limiter);
    let (elapsed, requests) = thread::spawn(move || {
        set_thread_tenant(0);
        let start = Instant::now();
        let mut requests = 0u32;
        while start.elapsed() < Duration::from_millis(400) {
            worker.request(10_000, IoPriority::User, None, OpType::Write);
            requests += 1;
        }
        (start.elapsed(), requests)
    })
    .join()
    .unwrap();

    let through = limiter.get_total_bytes_through_all();
    let elapsed_us = elapsed.as_micros() as i64;
    let bound = 1_000_000 * elapsed_us / 1_000_000 + 2 * per_period;
    println!("granted {through} bytes over {elapsed:?} in {requests} requests (bound {bound})");

    assert!(through > 2 * per_period, "made no forward progress");
    assert!(
        through <= bound,
        "granted {through} bytes, exceeding the bound of {bound}"
    );
}

#[test]
fn test_sustained_multi_tenant_load() {
    let limiter = Arc::new(MultiTenantRateLimiter::new(10_000_000));

    let mut workers = Vec::new();
    for tenant in 0..4 {
        let limiter = Arc::clone(&limiter);
        workers.push(thread::spawn(move || {
            set_thread_tenant(tenant);
            let mut granted = 0i64;
            for _ in 0..50 {
                granted +=
                    limiter.request_token(8_192, 0, IoPriority::Mid, None, OpType::Write);
            }
            granted
        }));
    }

    let per_tenant: Vec<i64> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    println!("granted per tenant: {per_tenant:?}");

    for granted in &per_tenant {
        assert_eq!(*granted, 50 * 8_192);
    }
    assert_eq!(
        limiter.get_total_bytes_through(IoPriority::Mid),
        4 * 50 * 8_192
    );
    let metrics = limiter.metrics();
    assert_eq!(metrics.total_requests_all(), 200);
    assert_eq!(metrics.pending_requests, 0);
}
