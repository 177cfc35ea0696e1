//! Retry policies.
//!
//! ## Contents
//! - [`Backoff`] how the sleep between attempts evolves (fixed / exponential)
//!
//! ## Quick wiring
//! ```text
//! RetryConfig { retries, delay, backoff: Backoff }
//!      └─► core::retry uses backoff.advance(delay) before every sleep
//! ```
//!
//! ## Defaults
//! - `Backoff::Fixed`.

mod backoff;

pub use backoff::{Backoff, ParseBackoffError};
