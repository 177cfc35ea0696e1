//! Error types returned by the delay registry and the retry executor.
//!
//! This module defines two error enums:
//!
//! - [`TimeoutError`]: a pending delay was cancelled or could not be found.
//! - [`RetryError`]: the retry executor ran out of attempts.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::time::Duration;
use thiserror::Error;

/// Reason attached to delays reclaimed by [`TimeoutRegistry::teardown_all`](crate::TimeoutRegistry::teardown_all).
pub const PROCESS_EXITING: &str = "Process exiting";

/// Reason reported by [`TimeoutError::NotFound`].
pub const NOT_FOUND: &str = "Timeout not found";

/// # Errors produced by cancellable delays.
///
/// Both variants belong to the same "timeout cancelled" family: consumers
/// usually branch on the variant and then inspect [`TimeoutError::id`] and
/// [`TimeoutError::reason`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError {
    /// The delay was cancelled before it fired (explicit cancel or process teardown).
    #[error("{reason}")]
    Cancelled {
        /// Identifier of the cancelled delay.
        id: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The identifier does not refer to a live delay.
    #[error("Timeout not found")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
    },
}

impl TimeoutError {
    /// Builds a [`TimeoutError::Cancelled`], defaulting the reason to `Timeout {id} cancelled`.
    ///
    /// # Example
    /// ```
    /// use delayvisor::TimeoutError;
    ///
    /// let err = TimeoutError::cancelled("abc", None);
    /// assert_eq!(err.to_string(), "Timeout abc cancelled");
    ///
    /// let err = TimeoutError::cancelled("abc", Some("user abort"));
    /// assert_eq!(err.reason(), "user abort");
    /// ```
    pub fn cancelled(id: impl Into<String>, reason: Option<&str>) -> Self {
        let id = id.into();
        let reason = match reason {
            Some(r) => r.to_string(),
            None => format!("Timeout {id} cancelled"),
        };
        TimeoutError::Cancelled { id, reason }
    }

    /// Identifier of the delay this error refers to.
    pub fn id(&self) -> &str {
        match self {
            TimeoutError::Cancelled { id, .. } | TimeoutError::NotFound { id } => id,
        }
    }

    /// Human-readable reason; same text as the `Display` output.
    pub fn reason(&self) -> &str {
        match self {
            TimeoutError::Cancelled { reason, .. } => reason,
            TimeoutError::NotFound { .. } => NOT_FOUND,
        }
    }

    /// Returns `true` for [`TimeoutError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, TimeoutError::NotFound { .. })
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use delayvisor::TimeoutError;
    ///
    /// let err = TimeoutError::NotFound { id: "abc".into() };
    /// assert_eq!(err.as_label(), "timeout_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TimeoutError::Cancelled { .. } => "timeout_cancelled",
            TimeoutError::NotFound { .. } => "timeout_not_found",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TimeoutError::Cancelled { id, reason } => format!("cancelled: id={id} reason={reason}"),
            TimeoutError::NotFound { id } => format!("not found: id={id}"),
        }
    }
}

/// # Errors produced by the retry executor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryError {
    /// Every permitted attempt failed.
    #[error("retry exhausted after {attempts} attempts: {cause}")]
    Exhausted {
        /// Number of times the operation was invoked.
        attempts: u32,
        /// Delay magnitude in effect when the budget ran out.
        final_delay: Duration,
        /// The last failure. Its message is the failure's `Display` form;
        /// the original value can be recovered with `downcast_ref`.
        #[source]
        cause: anyhow::Error,
    },
}

impl RetryError {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// Delay magnitude in effect when the budget ran out.
    pub fn final_delay(&self) -> Duration {
        match self {
            RetryError::Exhausted { final_delay, .. } => *final_delay,
        }
    }

    /// The normalized last failure.
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            RetryError::Exhausted { cause, .. } => cause,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Exhausted { .. } => "retry_exhausted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RetryError::Exhausted {
                attempts,
                final_delay,
                cause,
            } => format!("exhausted: attempts={attempts} final_delay={final_delay:?} cause={cause}"),
        }
    }
}
