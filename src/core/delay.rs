//! Plain, non-cancellable delays.

use std::time::Duration;

use tokio::time;

/// Completes after `duration` has elapsed.
///
/// There is no handle and no error path. `Duration::ZERO` completes on the next timer tick.
pub async fn delay(duration: Duration) {
    time::sleep(duration).await;
}

/// Millisecond form of [`delay`]; zero and negative values complete on the next timer tick.
pub async fn delay_ms(ms: i64) {
    delay(Duration::from_millis(ms.max(0).unsigned_abs())).await;
}
