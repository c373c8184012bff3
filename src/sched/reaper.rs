//! # Child reaper: SIGCHLD listener and waitpid drain.
//!
//! The reaper does the minimal, reentrant-safe part of child-state handling:
//! on every SIGCHLD it drains *all* pending state changes with
//! `waitpid(-1, WNOHANG | WUNTRACED)` (several children may change state
//! before the listener runs) and enqueues one [`SchedEvent`] per change. The
//! dispatcher decides what the changes mean.
//!
//! A state change for a process the registry no longer tracks is enqueued
//! anyway; classification against the registry belongs to the dispatcher,
//! which drops unknown pids.

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SchedError;
use crate::sched::SchedEvent;

/// Spawns the SIGCHLD listener.
///
/// The signal listener is registered before this function returns, so no
/// SIGCHLD delivered afterwards can be missed.
pub fn spawn_reaper(
    events: mpsc::Sender<SchedEvent>,
    token: CancellationToken,
) -> Result<JoinHandle<()>, SchedError> {
    let mut sigchld =
        signal(SignalKind::child()).map_err(|source| SchedError::SignalSetup { source })?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                sig = sigchld.recv() => {
                    if sig.is_none() || !drain(&events).await {
                        return;
                    }
                }
            }
        }
    }))
}

/// Drains every pending child-state change into the event queue.
///
/// Returns `false` when the reaper should stop (queue closed or fatal
/// waitpid error, which is forwarded as [`SchedEvent::WaitFailed`]).
async fn drain(events: &mpsc::Sender<SchedEvent>) -> bool {
    loop {
        let status = waitpid(
            Pid::from_raw(-1),
            Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED),
        );
        let ev = match status {
            Ok(WaitStatus::StillAlive) => return true,
            Ok(WaitStatus::Exited(pid, code)) => SchedEvent::ChildExited { pid, code },
            Ok(WaitStatus::Signaled(pid, _, _)) => SchedEvent::ChildKilled { pid },
            Ok(WaitStatus::Stopped(pid, _)) => SchedEvent::ChildStopped { pid },
            Ok(_) => continue,
            // All children reaped within this drain.
            Err(Errno::ECHILD) => return true,
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                let _ = events.send(SchedEvent::WaitFailed { errno }).await;
                return false;
            }
        };
        if events.send(ev).await.is_err() {
            return false;
        }
    }
}
