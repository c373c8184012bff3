//! # Dispatcher input events.

use nix::unistd::Pid;
use tokio::sync::oneshot;

use crate::ipc::wire::Request;

/// One unit of work on the dispatcher queue.
///
/// Signal handlers and the shell channel do reentrant-safe work only: they
/// record that an event occurred and enqueue it here. All registry mutation
/// happens in the dispatcher loop that drains this queue.
#[derive(Debug)]
pub enum SchedEvent {
    /// A tracked child exited on its own.
    ChildExited {
        /// Process id reported by `waitpid`.
        pid: Pid,
        /// Exit status.
        code: i32,
    },

    /// A tracked child was terminated by a signal.
    ChildKilled {
        /// Process id reported by `waitpid`.
        pid: Pid,
    },

    /// A tracked child stopped (preemption SIGSTOP or a manual stop).
    ChildStopped {
        /// Process id reported by `waitpid`.
        pid: Pid,
    },

    /// The quantum timer fired; preempt the running task.
    ///
    /// Synthesized by the dispatcher's own timer arm so that preemption
    /// flows through the same event model as everything else.
    QuantumExpired,

    /// One administrative command from the shell.
    ShellRequest {
        /// Decoded command.
        request: Request,
        /// Status code answered to the shell.
        reply: oneshot::Sender<i32>,
    },

    /// SIGINT/SIGTERM observed; kill everything and exit.
    ShutdownRequested,

    /// Polling child state failed irrecoverably.
    WaitFailed {
        /// The errno `waitpid` reported.
        errno: nix::errno::Errno,
    },
}
