//! Basic usage walkthrough for the iorate crate.
//!
//! Run with: `cargo run --example basic`

use iorate::{
    set_thread_tenant, IoPriority, MultiTenantRateLimiter, OpType, RateLimiter,
    RateLimiterConfig,
};
use std::time::Instant;

fn main() {
    println!("=== Multi-Tenant I/O Rate Limiter ===\n");

    simple_example();
    println!("\n{}\n", "=".repeat(50));

    refill_example();
    println!("\n{}\n", "=".repeat(50));

    dynamic_rate_example();
    println!("\n{}\n", "=".repeat(50));

    metrics_example();
}

fn simple_example() {
    println!("1. Simple write throttling:");

    // 10 MB/s per tenant, refilled every 100 ms.
    let limiter = MultiTenantRateLimiter::new(10_000_000);
    set_thread_tenant(0);

    let charged = limiter.request_token(4096, 0, IoPriority::User, None, OpType::Write);
    println!("   charged {charged} bytes against tenant 0");
    println!(
        "   tenant 0 has {} bytes left this period",
        limiter.available_bytes(0)
    );
}

fn refill_example() {
    println!("2. Blocking across a refill:");

    // 1 MB per 100 ms period.
    let limiter = MultiTenantRateLimiter::new(10_000_000);
    set_thread_tenant(0);

    // Drain the whole period's budget at once.
    limiter.request(1_000_000, IoPriority::User, None, OpType::Write);
    println!("   bucket drained: {} bytes left", limiter.available_bytes(0));

    // The next request must wait for the refill.
    let start = Instant::now();
    limiter.request(64 * 1024, IoPriority::User, None, OpType::Write);
    println!("   64 KB follow-up granted after {:?}", start.elapsed());
}

fn dynamic_rate_example() {
    println!("3. Changing the rate at runtime:");

    let limiter = MultiTenantRateLimiter::with_config(
        RateLimiterConfig::new(10_000_000).with_refill_period_us(100_000),
    );
    println!(
        "   single burst at 10 MB/s: {} bytes",
        limiter.get_single_burst_bytes()
    );

    limiter.set_bytes_per_second(40_000_000);
    println!(
        "   single burst after raising to 40 MB/s: {} bytes",
        limiter.get_single_burst_bytes()
    );
}

fn metrics_example() {
    println!("4. Observability:");

    let limiter = MultiTenantRateLimiter::new(10_000_000);
    set_thread_tenant(1);
    for _ in 0..8 {
        limiter.request_token(16 * 1024, 0, IoPriority::Mid, None, OpType::Write);
    }
    limiter.request_token(4096, 0, IoPriority::User, None, OpType::Write);

    println!("{}", limiter.metrics().summary());
}
