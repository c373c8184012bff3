//! # Termination-signal listener.
//!
//! Translates SIGINT and SIGTERM into a [`SchedEvent::ShutdownRequested`] on
//! the dispatcher queue, where teardown happens in the same serialized loop
//! as every other mutation.

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SchedError;
use crate::sched::SchedEvent;

/// Spawns the SIGINT/SIGTERM listener.
pub fn spawn_shutdown_listener(
    events: mpsc::Sender<SchedEvent>,
    token: CancellationToken,
) -> Result<JoinHandle<()>, SchedError> {
    let mut sigint =
        signal(SignalKind::interrupt()).map_err(|source| SchedError::SignalSetup { source })?;
    let mut sigterm =
        signal(SignalKind::terminate()).map_err(|source| SchedError::SignalSetup { source })?;

    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = sigint.recv() => {},
            _ = sigterm.recv() => {},
        }
        let _ = events.send(SchedEvent::ShutdownRequested).await;
    }))
}
