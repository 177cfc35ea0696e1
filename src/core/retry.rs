//! # Retry executor.
//!
//! Runs a fallible async operation until it succeeds or the attempt budget
//! from [`RetryConfig`] is spent.
//!
//! ## Flow
//! ```text
//! attempt = 0, delay = cfg.delay
//! loop {
//!   ├─► op().await
//!   │     ├─ Ok(v)  ──► return Ok(v)
//!   │     └─ Err(e) ──► last = e
//!   ├─► attempt == retries ──► Err(Exhausted{ attempts: attempt + 1, final_delay: delay, cause: last })
//!   ├─► delay = backoff.advance(delay)   (doubles for Exponential)
//!   ├─► sleep(delay)
//!   └─► attempt += 1
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially**, never in parallel
//! - No sleep after the final attempt
//! - The delay is advanced **before** each sleep, so exponential sleeps start at `2 × delay`

use std::fmt::{Debug, Display};
use std::future::Future;

use crate::core::config::RetryConfig;
use crate::core::delay::delay;
use crate::error::RetryError;

/// Invokes `op` until it returns `Ok`, sleeping between failed attempts.
///
/// `op` is called at most `cfg.retries + 1` times. When every attempt fails, the
/// last failure is returned inside [`RetryError::Exhausted`]. Any `Display` value is
/// accepted as a failure: the cause's message is its `Display` form and the value
/// itself is available via `downcast_ref::<E>()`. Use [`retry_err`] for error types
/// whose `source()` chain should stay walkable.
///
/// ## Example
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use delayvisor::{retry, RetryConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let calls = AtomicU32::new(0);
/// let cfg = RetryConfig::default().with_retries(3).with_delay_ms(1);
///
/// let out = retry(|| {
///     let n = calls.fetch_add(1, Ordering::Relaxed) + 1;
///     async move { if n >= 3 { Ok("success") } else { Err("retry") } }
/// }, cfg).await;
///
/// assert_eq!(out.unwrap(), "success");
/// assert_eq!(calls.load(Ordering::Relaxed), 3);
/// # }
/// ```
pub async fn retry<T, E, F, Fut>(op: F, cfg: RetryConfig) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + Debug + Send + Sync + 'static,
{
    run(op, cfg, anyhow::Error::msg).await
}

/// Same as [`retry`], for failures that implement [`std::error::Error`].
///
/// The last failure becomes the cause unchanged, so its own `source()` chain is
/// preserved and reachable through [`anyhow::Error::chain`] or
/// [`std::error::Error::source`] on the returned [`RetryError`].
pub async fn retry_err<T, E, F, Fut>(op: F, cfg: RetryConfig) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    run(op, cfg, anyhow::Error::new).await
}

/// Attempt loop shared by [`retry`] and [`retry_err`]; `into_cause` wraps the last failure.
async fn run<T, E, F, Fut>(
    mut op: F,
    cfg: RetryConfig,
    into_cause: fn(E) -> anyhow::Error,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut current = cfg.delay;
    let mut attempt: u32 = 0;

    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if attempt >= cfg.retries {
            let attempts = attempt.saturating_add(1);
            tracing::warn!(
                attempts,
                final_delay = ?current,
                error = %err,
                "retry budget exhausted"
            );
            return Err(RetryError::Exhausted {
                attempts,
                final_delay: current,
                cause: into_cause(err),
            });
        }

        current = cfg.backoff.advance(current);
        tracing::debug!(
            attempt = attempt + 1,
            max_attempts = cfg.max_attempts(),
            delay = ?current,
            backoff = %cfg.backoff,
            error = %err,
            "attempt failed, retrying after delay"
        );
        delay(current).await;
        attempt += 1;
    }
}
