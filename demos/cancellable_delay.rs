//! # Example: cancellable_delay
//!
//! Demonstrates the [`TimeoutRegistry`] lifecycle: natural completion, cancellation,
//! rescheduling, and teardown on a shutdown signal.
//!
//! ## Run
//! ```bash
//! RUST_LOG=delayvisor=debug cargo run --example cancellable_delay
//! ```

use std::time::Duration;

use delayvisor::{TimeoutRegistry, delay};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let registry = TimeoutRegistry::new();

    // Teardown hook: rejects whatever is still pending when Ctrl-C arrives.
    tokio::spawn({
        let registry = registry.clone();
        async move {
            match registry.teardown_on_signal().await {
                Ok(n) => println!("[hook] tore down {n} pending delays"),
                Err(e) => eprintln!("[hook] signal registration failed: {e}"),
            }
        }
    });

    // 1. Natural completion
    let first = registry.create(Duration::from_millis(200));
    println!("[main] {}", first.future.await?);

    // 2. Cancellation mid-flight
    let (id, fut) = registry.create(Duration::from_millis(500)).into_parts();
    tokio::spawn({
        let registry = registry.clone();
        async move {
            delay(Duration::from_millis(50)).await;
            registry.cancel(&id, Some("operator abort"));
        }
    });
    match fut.await {
        Ok(msg) => println!("[main] unexpected completion: {msg}"),
        Err(e) => println!("[main] cancelled: {} ({})", e, e.as_label()),
    }

    // 3. Reschedule: the new future replaces the old one
    let (id, _old) = registry.create(Duration::from_secs(10)).into_parts();
    let rescheduled = registry.update(&id, Duration::from_millis(100))?;
    println!("[main] {}", rescheduled.await?);

    // 4. Long delay left for the shutdown hook (press Ctrl-C)
    let long = registry.create(Duration::from_secs(3600));
    println!("[main] waiting on {}; press Ctrl-C to tear down", long.id);
    match long.future.await {
        Ok(msg) => println!("[main] {msg}"),
        Err(e) => println!("[main] {e}"),
    }
    Ok(())
}
