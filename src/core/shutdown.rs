//! # Process-exit hook for the timeout registry.
//!
//! The host process owns its lifecycle; the registry only needs to learn when it ends.
//! [`TimeoutRegistry::teardown_on_signal`] listens for a termination signal and then
//! runs [`TimeoutRegistry::teardown_all`]. Hosts with their own shutdown notification
//! can pass it to [`TimeoutRegistry::teardown_when`] instead.
//!
//! | Platform | Signals that trigger teardown |
//! |----------|-------------------------------|
//! | unix     | `SIGINT`, `SIGTERM`, `SIGQUIT` |
//! | other    | Ctrl-C                        |

use std::future::Future;
use std::io;

use crate::core::registry::TimeoutRegistry;

/// Resolves with the name of the first termination signal the process receives.
///
/// Listeners are installed when the future is first polled. Fails only if a
/// listener cannot be installed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Resolves with the name of the first termination signal the process receives.
///
/// Only Ctrl-C is observed on this platform.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

impl TimeoutRegistry {
    /// Waits for a termination signal, then rejects every pending delay with
    /// `Process exiting`.
    ///
    /// Returns the number of delays torn down. Typically spawned once at startup:
    /// ```rust,no_run
    /// use delayvisor::TimeoutRegistry;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let registry = TimeoutRegistry::new();
    /// let hook = tokio::spawn({
    ///     let registry = registry.clone();
    ///     async move { registry.teardown_on_signal().await }
    /// });
    /// // ... use `registry` ...
    /// # drop(hook);
    /// # }
    /// ```
    pub async fn teardown_on_signal(&self) -> io::Result<usize> {
        self.teardown_when(wait_for_shutdown_signal()).await
    }

    /// Runs [`teardown_all`](Self::teardown_all) once `shutdown` resolves.
    ///
    /// `shutdown` yields a label for the trigger, used only for logging. If it fails,
    /// nothing is torn down and the error is returned.
    pub async fn teardown_when<S>(&self, shutdown: S) -> io::Result<usize>
    where
        S: Future<Output = io::Result<&'static str>>,
    {
        let trigger = shutdown.await?;
        tracing::info!(trigger, pending = self.len(), "shutdown requested");
        Ok(self.teardown_all())
    }
}
