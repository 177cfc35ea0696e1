//! # Example: retry_with_backoff
//!
//! Demonstrates how [`retry`] re-invokes a flaky operation with exponential backoff.
//!
//! The operation fails twice before succeeding.
//!
//! ## Flow
//! ```text
//! retry(op, cfg)
//!   ├─► op() → Err("boom #1")
//!   ├─► delay 100ms → 200ms, sleep(200ms)
//!   ├─► op() → Err("boom #2")
//!   ├─► delay 200ms → 400ms, sleep(400ms)
//!   └─► op() → Ok("payload")
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=delayvisor=debug cargo run --example retry_with_backoff
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use delayvisor::{Backoff, RetryConfig, RetryError, retry};
use tracing_subscriber::EnvFilter;

static CALLS: AtomicU64 = AtomicU64::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    // 1. Configure: two retries, 100ms base delay, doubling before each sleep
    let cfg = RetryConfig::default()
        .with_retries(2)
        .with_delay(Duration::from_millis(100))
        .with_backoff(Backoff::Exponential);

    // 2. Flaky operation: fails twice, then succeeds
    let value = retry(
        || {
            let attempt = CALLS.fetch_add(1, Ordering::Relaxed) + 1;
            async move {
                println!("[flaky] attempt {attempt}");
                if attempt <= 2 {
                    Err(format!("boom #{attempt}"))
                } else {
                    Ok("payload")
                }
            }
        },
        cfg,
    )
    .await?;
    println!("[main] got {value:?}");

    // 3. Operation that never succeeds: exhausts the budget
    let res = retry(|| async { Err::<(), _>(42) }, cfg.with_retries(1)).await;
    if let Err(RetryError::Exhausted {
        attempts,
        final_delay,
        cause,
    }) = res
    {
        println!("[main] gave up after {attempts} attempts (final delay {final_delay:?}): {cause}");
    }

    Ok(())
}
