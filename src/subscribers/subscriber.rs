//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], an extension point for plugging custom event
//! handlers (logging, metrics, test probes) into the runtime.

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the fan-out listener, in event order.
    async fn on_event(&self, event: &Event);

    /// Returns a short, stable subscriber name.
    fn name(&self) -> &'static str {
        "subscriber"
    }
}
