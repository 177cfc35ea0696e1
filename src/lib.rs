//! # delayvisor
//!
//! **Delayvisor** is a small async utility library for Rust built on Tokio.
//!
//! It provides plain delays, identifiable delays that can be cancelled or
//! rescheduled while in flight, and a retry wrapper with fixed or exponential
//! backoff.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   delay(d) ─────────────────────────────► tokio::time::sleep
//!        ▲
//!        │ (sleep between attempts)
//! ┌──────┴───────────────┐        ┌──────────────────────────────────────────┐
//! │ retry(op, cfg)       │        │ TimeoutRegistry                          │
//! │ - RetryConfig        │        │ - id → Entry { oneshot::Sender,          │
//! │ - Backoff            │        │               CancellationToken, gen }   │
//! │ - RetryError         │        │ - create / cancel / update / teardown    │
//! └──────────────────────┘        └──────────────┬───────────────────────────┘
//!                                                │ one timer task per entry
//!                                                ▼
//!                                  select! { sleep(d), token.cancelled() }
//! ```
//!
//! The retry executor and the registry share no state.
//!
//! ### Delay lifecycle
//! ```text
//! create(d) ──► (id, PendingDelay)
//!   ├─ timer fires        ─► Ok("Timeout {id} completed"), entry removed
//!   ├─ cancel(id, reason) ─► Err(TimeoutError::Cancelled{ id, reason })
//!   ├─ update(id, d')     ─► old future abandoned, new PendingDelay under the same id
//!   └─ teardown_all()     ─► Err(TimeoutError::Cancelled{ id, "Process exiting" })
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / functions                       |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Delays**        | Plain non-cancellable sleeps.                            | [`delay`], [`delay_ms`]                     |
//! | **Registry**      | Identifiable delays with cancel / update / teardown.     | [`TimeoutRegistry`], [`PendingDelay`]       |
//! | **Retry**         | Bounded retries with fixed or exponential backoff.       | [`retry`], [`retry_err`], [`RetryConfig`]   |
//! | **Errors**        | Typed errors for cancelled delays and exhausted retries. | [`TimeoutError`], [`RetryError`]            |
//! | **Shutdown**      | Process-exit hook tearing down pending delays.           | [`TimeoutRegistry::teardown_on_signal`], [`TimeoutRegistry::teardown_when`] |
//!
//! ## Logging
//! The crate emits [`tracing`] events (`debug` for delay lifecycle and scheduled
//! retries, `warn` for exhausted retries and failed teardown deliveries). Install
//! any subscriber to see them.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use delayvisor::{retry, Backoff, RetryConfig, TimeoutRegistry};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = TimeoutRegistry::new();
//!
//!     // Fire-and-wait delay with an id.
//!     let delay = registry.create(Duration::from_millis(10));
//!     let msg = delay.future.await?;
//!     assert!(msg.contains(&delay.id));
//!
//!     // Retry with exponential backoff.
//!     let cfg = RetryConfig::default()
//!         .with_retries(2)
//!         .with_delay(Duration::from_millis(1))
//!         .with_backoff(Backoff::Exponential);
//!     let value = retry(|| async { Ok::<_, std::io::Error>(42) }, cfg).await?;
//!     assert_eq!(value, 42);
//!
//!     registry.teardown_all();
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod policies;

// ---- Public re-exports ----

pub use crate::core::shutdown::wait_for_shutdown_signal;
pub use crate::core::{
    CancellableDelay, PendingDelay, RetryConfig, TimeoutRegistry, delay, delay_ms, retry,
    retry_err,
};
pub use error::{NOT_FOUND, PROCESS_EXITING, RetryError, TimeoutError};
pub use policies::{Backoff, ParseBackoffError};
