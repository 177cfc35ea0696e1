//! # Backoff policy for retried operations.
//!
//! [`Backoff`] controls how the sleep between two attempts evolves:
//! - [`Backoff::Fixed`] keeps the configured delay for every retry;
//! - [`Backoff::Exponential`] doubles the delay after every failed attempt,
//!   *before* the sleep that follows it.
//!
//! There is no cap and no jitter: with `delay = 100ms` the exponential sleeps are
//! `200ms, 400ms, 800ms, ...`.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use delayvisor::Backoff;
//!
//! let d = Duration::from_millis(100);
//! assert_eq!(Backoff::Fixed.advance(d), Duration::from_millis(100));
//! assert_eq!(Backoff::Exponential.advance(d), Duration::from_millis(200));
//!
//! let parsed: Backoff = "exponential".parse().unwrap();
//! assert_eq!(parsed, Backoff::Exponential);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backoff {
    /// Constant delay between attempts (default).
    #[default]
    Fixed,
    /// Delay doubles after each failed attempt.
    Exponential,
}

impl Backoff {
    /// Returns the delay to sleep after a failed attempt, given the current magnitude.
    ///
    /// Doubling saturates at [`Duration::MAX`] instead of overflowing.
    pub fn advance(&self, current: Duration) -> Duration {
        match self {
            Backoff::Fixed => current,
            Backoff::Exponential => current.saturating_mul(2),
        }
    }

    /// Returns the configuration name of the policy (`"fixed"` / `"exponential"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Backoff::Fixed => "fixed",
            Backoff::Exponential => "exponential",
        }
    }
}

impl fmt::Display for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown backoff name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backoff {0:?}; expected \"fixed\" or \"exponential\"")]
pub struct ParseBackoffError(String);

impl FromStr for Backoff {
    type Err = ParseBackoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Backoff::Fixed),
            "exponential" => Ok(Backoff::Exponential),
            _ => Err(ParseBackoffError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_is_constant() {
        let mut d = Duration::from_millis(500);
        for _ in 0..10 {
            d = Backoff::Fixed.advance(d);
            assert_eq!(d, Duration::from_millis(500));
        }
    }

    #[test]
    fn test_exponential_doubles() {
        let mut d = Duration::from_millis(100);
        let mut seen = Vec::new();
        for _ in 0..4 {
            d = Backoff::Exponential.advance(d);
            seen.push(d.as_millis());
        }
        assert_eq!(seen, vec![200, 400, 800, 1600]);
    }

    #[test]
    fn test_exponential_saturates() {
        assert_eq!(Backoff::Exponential.advance(Duration::MAX), Duration::MAX);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("fixed".parse::<Backoff>(), Ok(Backoff::Fixed));
        assert_eq!(" Exponential ".parse::<Backoff>(), Ok(Backoff::Exponential));
        assert!("linear".parse::<Backoff>().is_err());
        assert_eq!(Backoff::Exponential.to_string(), "exponential");
        assert_eq!(Backoff::default(), Backoff::Fixed);
    }
}
