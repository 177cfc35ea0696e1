//! # Timeout registry - identifiable, cancellable delays.
//!
//! [`TimeoutRegistry`] maps generated identifiers to live delays and lets callers
//! cancel or reschedule them while they are in flight.
//!
//! ## Architecture
//! ```text
//! create(d)          → insert Entry{gen} → spawn timer(id, gen, d) → (id, PendingDelay)
//! cancel(id, reason) → remove Entry      → retire timer → reject PendingDelay
//! update(id, d)      → replace Entry{gen'} → retire old timer (old future abandoned)
//!                                          → spawn timer(id, gen', d) → PendingDelay
//! timer fires        → remove Entry if gen matches → resolve "Timeout {id} completed"
//! teardown_all()     → drain entries → retire timers → reject "Process exiting"
//! ```
//!
//! ## Rules
//! - At most one entry per identifier
//! - A timer only removes the entry of its own generation
//! - The mapping lock is never held across an `.await`
//! - Settlement happens before `cancel`/`teardown_all` return

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::runtime::Handle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::entry::{CancellableDelay, Entry, PendingDelay};
use crate::error::{PROCESS_EXITING, TimeoutError};

/// Length of generated identifiers.
const ID_LEN: usize = 16;

/// Shared state behind every [`TimeoutRegistry`] handle.
struct Inner {
    entries: Mutex<HashMap<String, Entry>>,
    generation: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // Entries stay consistent across a panicking holder: every mutation is a single map call.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Removes the entry for `id` only if it still belongs to `generation`.
    fn take_current(&self, id: &str, generation: u64) -> Option<Entry> {
        let mut entries = self.lock();
        match entries.get(id) {
            Some(entry) if entry.generation == generation => entries.remove(id),
            _ => None,
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let entries = self
            .entries
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for entry in entries.values() {
            entry.retire();
        }
    }
}

/// Registry of pending cancellable delays.
///
/// Cloning is cheap and yields another handle to the same registry. Construct one
/// per process and hand it to whatever needs it; call [`TimeoutRegistry::teardown_all`]
/// (or [`TimeoutRegistry::teardown_on_signal`]) on shutdown.
///
/// ### Runtime
/// [`create`](Self::create) and [`update`](Self::update) spawn timer tasks on the
/// current Tokio runtime and must be called from within one.
///
/// ### Example
/// ```rust
/// use std::time::Duration;
/// use delayvisor::TimeoutRegistry;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let registry = TimeoutRegistry::new();
/// let delay = registry.create(Duration::from_millis(500));
///
/// assert!(registry.cancel(&delay.id, Some("no longer needed")));
/// let err = delay.future.await.unwrap_err();
/// assert_eq!(err.reason(), "no longer needed");
/// # }
/// ```
#[derive(Clone)]
pub struct TimeoutRegistry {
    inner: Arc<Inner>,
}

impl Default for TimeoutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimeoutRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutRegistry")
            .field("pending", &self.len())
            .finish()
    }
}

impl TimeoutRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Starts a cancellable delay of `duration`.
    ///
    /// The returned future resolves with `Timeout {id} completed` once the delay
    /// elapses, unless it is cancelled or rescheduled first.
    ///
    /// ### Panics
    /// Panics when called outside a Tokio runtime. The registry is left unchanged.
    pub fn create(&self, duration: Duration) -> CancellableDelay {
        let runtime = Handle::current();
        let generation = self.inner.next_generation();
        let (entry, future) = Entry::new(generation);
        let token = entry.timer_token();

        let id = {
            let mut entries = self.inner.lock();
            let id = loop {
                let candidate = generate_id();
                if !entries.contains_key(&candidate) {
                    break candidate;
                }
            };
            entries.insert(id.clone(), entry);
            id
        };

        tracing::debug!(id = %id, ?duration, "delay created");
        self.arm(&runtime, id.clone(), generation, duration, token);
        CancellableDelay { id, future }
    }

    /// Cancels the delay `id`, rejecting its future with [`TimeoutError::Cancelled`].
    ///
    /// `reason` defaults to `Timeout {id} cancelled`.
    /// Returns `false` (and does nothing) if `id` is not live.
    pub fn cancel(&self, id: &str, reason: Option<&str>) -> bool {
        let Some(entry) = self.inner.lock().remove(id) else {
            tracing::debug!(id, "cancel: delay not found");
            return false;
        };

        let err = TimeoutError::cancelled(id, reason);
        tracing::debug!(id, reason = err.reason(), "delay cancelled");
        if entry.settle(Err(err)).is_err() {
            tracing::debug!(id, "cancelled delay had no listener");
        }
        true
    }

    /// Reschedules the delay `id` to fire after `duration` from now.
    ///
    /// The previous future is abandoned (it never completes); the returned future
    /// replaces it and is the one later `cancel` calls reject.
    ///
    /// ### Errors
    /// [`TimeoutError::NotFound`] if `id` is not live.
    ///
    /// ### Panics
    /// Panics when called outside a Tokio runtime, whether or not `id` is live.
    /// The registry is left unchanged.
    pub fn update(&self, id: &str, duration: Duration) -> Result<PendingDelay, TimeoutError> {
        let runtime = Handle::current();
        let generation = self.inner.next_generation();
        let (entry, future) = Entry::new(generation);
        let token = entry.timer_token();

        let previous = {
            let mut entries = self.inner.lock();
            match entries.get_mut(id) {
                Some(slot) => std::mem::replace(slot, entry),
                None => {
                    tracing::debug!(id, "update: delay not found");
                    return Err(TimeoutError::NotFound { id: id.to_string() });
                }
            }
        };
        previous.abandon();

        tracing::debug!(id, ?duration, "delay rescheduled");
        self.arm(&runtime, id.to_string(), generation, duration, token);
        Ok(future)
    }

    /// Rejects every pending delay with reason `Process exiting` and empties the registry.
    ///
    /// A rejection that cannot be delivered is logged and skipped; the remaining
    /// entries are still torn down. Returns the number of entries reclaimed.
    pub fn teardown_all(&self) -> usize {
        let drained: Vec<(String, Entry)> = self.inner.lock().drain().collect();
        let count = drained.len();

        for (id, entry) in drained {
            let err = TimeoutError::cancelled(id.as_str(), Some(PROCESS_EXITING));
            if let Err(undelivered) = entry.settle(Err(err)) {
                tracing::warn!(id = %id, outcome = ?undelivered, "failed to reject pending delay during teardown");
            }
        }

        if count > 0 {
            tracing::info!(count, "pending delays torn down");
        }
        count
    }

    /// Number of live delays.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if no delay is live.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns `true` if `id` refers to a live delay.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().contains_key(id)
    }

    /// Returns sorted identifiers of live delays.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.lock().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Spawns the timer task for one entry generation.
    fn arm(
        &self,
        runtime: &Handle,
        id: String,
        generation: u64,
        duration: Duration,
        token: CancellationToken,
    ) {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);

        runtime.spawn(async move {
            select! {
                _ = token.cancelled() => {}
                _ = time::sleep(duration) => {
                    let Some(inner) = inner.upgrade() else { return };
                    let Some(entry) = inner.take_current(&id, generation) else { return };
                    tracing::debug!(id = %id, "delay completed");
                    let _ = entry.settle(Ok(format!("Timeout {id} completed")));
                }
            }
        });
    }
}

fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_resolves_with_id() {
        let registry = TimeoutRegistry::new();
        let start = Instant::now();
        let (id, fut) = registry.create(ms(300)).into_parts();
        assert!(registry.contains(&id));
        assert_eq!(id.len(), ID_LEN);

        let msg = fut.await.expect("delay should complete");
        assert!(msg.contains(&id), "message {msg:?} should embed {id}");
        assert!(start.elapsed() >= ms(300));
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_unique() {
        let registry = TimeoutRegistry::new();
        let delays: Vec<_> = (0..64).map(|_| registry.create(ms(1_000))).collect();
        let mut ids: Vec<_> = delays.iter().map(|d| d.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 64);
        assert_eq!(registry.ids(), ids);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_rejects_once() {
        let registry = TimeoutRegistry::new();
        let delay = registry.create(ms(500));

        assert!(registry.cancel(&delay.id, None));
        assert!(!registry.cancel(&delay.id, None));
        assert!(!registry.cancel(&delay.id, Some("again")));
        assert!(!registry.contains(&delay.id));

        let err = registry.update(&delay.id, ms(10)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.reason(), "Timeout not found");
        assert!(registry.is_empty());

        let err = delay.future.await.unwrap_err();
        assert_eq!(err.reason(), format!("Timeout {} cancelled", delay.id));
        assert_eq!(err.id(), delay.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_flight_with_reason() {
        let registry = TimeoutRegistry::new();
        let start = Instant::now();
        let (id, fut) = registry.create(ms(500)).into_parts();

        let canceller = registry.clone();
        tokio::spawn(async move {
            time::sleep(ms(50)).await;
            canceller.cancel(&id, Some("x"));
        });

        let err = fut.await.unwrap_err();
        assert_eq!(err.to_string(), "x");
        let elapsed = start.elapsed();
        assert!(elapsed >= ms(50) && elapsed < ms(100), "rejected at {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_returns_false() {
        let registry = TimeoutRegistry::new();
        assert!(!registry.cancel("missing", Some("whatever")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_unknown_is_not_found() {
        let registry = TimeoutRegistry::new();
        let err = registry.update("missing", ms(10)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.reason(), "Timeout not found");
        assert_eq!(err.id(), "missing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_after_completion_is_not_found() {
        let registry = TimeoutRegistry::new();
        let delay = registry.create(ms(10));
        delay.future.await.expect("delay should complete");
        assert!(registry.update(&delay.id, ms(10)).unwrap_err().is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_reschedules_and_abandons_old_future() {
        let registry = TimeoutRegistry::new();
        let start = Instant::now();
        let (id, old) = registry.create(ms(100)).into_parts();

        let new = registry.update(&id, ms(400)).expect("live delay");
        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);

        let msg = new.await.expect("rescheduled delay should complete");
        assert!(msg.contains(&id));
        assert!(start.elapsed() >= ms(400));
        assert!(registry.is_empty());

        let old = time::timeout(ms(10_000), old).await;
        assert!(old.is_err(), "replaced future must never settle");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_update_rejects_new_future() {
        let registry = TimeoutRegistry::new();
        let (id, old) = registry.create(ms(100)).into_parts();
        let new = registry.update(&id, ms(1_000)).expect("live delay");

        assert!(registry.cancel(&id, Some("stop")));
        assert_eq!(new.await.unwrap_err().reason(), "stop");
        assert!(time::timeout(ms(5_000), old).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_does_not_remove_replacement() {
        let registry = TimeoutRegistry::new();
        let (id, _old) = registry.create(ms(50)).into_parts();
        let new = registry.update(&id, ms(200)).expect("live delay");

        time::sleep(ms(100)).await;
        assert!(registry.contains(&id), "old timer removed the replacement entry");

        new.await.expect("rescheduled delay should complete");
        assert!(!registry.contains(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_rejects_everything() {
        let registry = TimeoutRegistry::new();
        let a = registry.create(ms(1_000));
        let b = registry.create(ms(2_000));
        // A dropped listener must not stop the rest of the teardown.
        let dropped = registry.create(ms(3_000));
        drop(dropped.future);

        assert_eq!(registry.teardown_all(), 3);
        assert!(registry.is_empty());

        // Reclaimed ids are gone for good.
        for id in [&a.id, &b.id, &dropped.id] {
            assert!(!registry.cancel(id, None));
            assert!(registry.update(id, ms(10)).unwrap_err().is_not_found());
        }
        assert!(registry.is_empty());

        for fut in [a.future, b.future] {
            let err = fut.await.unwrap_err();
            assert_eq!(err.reason(), PROCESS_EXITING);
        }
        assert_eq!(registry.teardown_all(), 0);
    }

    #[test]
    fn test_outside_runtime_panics_without_registering() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let registry = TimeoutRegistry::new();
        let created = catch_unwind(AssertUnwindSafe(|| registry.create(ms(10))));
        assert!(created.is_err());
        assert!(registry.is_empty());

        let updated = catch_unwind(AssertUnwindSafe(|| registry.update("missing", ms(10))));
        assert!(updated.is_err());
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_completes() {
        let registry = TimeoutRegistry::new();
        let delay = registry.create(Duration::ZERO);
        let msg = delay.future.await.expect("zero delay should complete");
        assert!(msg.contains(&delay.id));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_and_cancel() {
        let registry = TimeoutRegistry::new();
        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let delay = registry.create(Duration::from_secs(60));
                assert!(registry.cancel(&delay.id, None));
                delay.future.await.is_err()
            }));
        }
        for h in handles {
            assert!(h.await.expect("task panicked"));
        }
        assert!(registry.is_empty());
    }
}
