//! # Retry configuration.
//!
//! Provides [`RetryConfig`], the settings consumed by [`retry`](crate::retry).
//!
//! ## Defaults
//! - `retries = 3` (up to four invocations in total)
//! - `delay = 2s`
//! - `backoff = Backoff::Fixed`
//!
//! ## Sentinel values
//! - `retries = 0` → exactly one attempt, no sleep
//! - `delay = 0s` → retry on the next timer tick

use std::time::Duration;

use crate::policies::Backoff;

/// Settings for one [`retry`](crate::retry) call.
///
/// All fields are public; the `with_*` helpers exist for chaining off [`RetryConfig::default`].
///
/// ## Field semantics
/// - `retries`: additional attempts after the first one fails
/// - `delay`: sleep before the first retry (before doubling, for exponential backoff)
/// - `backoff`: how the sleep evolves between retries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Number of retries after the initial attempt.
    pub retries: u32,

    /// Base delay between attempts.
    pub delay: Duration,

    /// Growth rule for the delay.
    pub backoff: Backoff,
}

impl RetryConfig {
    /// Sets the retry budget.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the base delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(self, ms: u64) -> Self {
        self.with_delay(Duration::from_millis(ms))
    }

    /// Sets the backoff policy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Total number of invocations permitted (`retries + 1`).
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for RetryConfig {
    /// Default configuration:
    ///
    /// - `retries = 3`
    /// - `delay = 2000ms`
    /// - `backoff = Backoff::Fixed`
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(2000),
            backoff: Backoff::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RetryConfig::default();
        assert_eq!(cfg.retries, 3);
        assert_eq!(cfg.delay, Duration::from_secs(2));
        assert_eq!(cfg.backoff, Backoff::Fixed);
        assert_eq!(cfg.max_attempts(), 4);
    }

    #[test]
    fn test_builders_override_fields() {
        let cfg = RetryConfig::default()
            .with_retries(0)
            .with_delay_ms(50)
            .with_backoff(Backoff::Exponential);
        assert_eq!(cfg.retries, 0);
        assert_eq!(cfg.delay, Duration::from_millis(50));
        assert_eq!(cfg.backoff, Backoff::Exponential);
        assert_eq!(cfg.max_attempts(), 1);
    }
}
