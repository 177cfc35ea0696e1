//! Runtime core: delays, the timeout registry, and the retry executor.
//!
//! Internal modules:
//! - [`delay`]: plain non-cancellable sleeps;
//! - [`entry`]: registry entries and the futures handed to callers;
//! - [`registry`]: identifiable delays with cancel/update/teardown;
//! - [`retry`]: retry loop with fixed or exponential backoff;
//! - [`config`]: retry settings;
//! - [`shutdown`]: process-exit hook wiring OS signals to registry teardown.

mod config;
mod delay;
mod entry;
mod registry;
mod retry;
pub(crate) mod shutdown;

pub use config::RetryConfig;
pub use delay::{delay, delay_ms};
pub use entry::{CancellableDelay, PendingDelay};
pub use registry::TimeoutRegistry;
pub use retry::{retry, retry_err};
