//! Error types used by the taskwheel scheduler.
//!
//! [`SchedError`] covers fatal conditions: a failed bootstrap, a broken
//! process-control primitive, or the event queue closing underneath the
//! dispatcher. Administrative failures (kill of an unknown id, a failed
//! `exec-task` spawn) are *not* errors here; they travel back to the shell
//! as negative status codes on the response channel (see [`crate::ipc::wire`]).

use nix::errno::Errno;
use thiserror::Error;

/// Fatal scheduler errors.
///
/// Any of these terminates the scheduler process with exit code 1.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedError {
    /// No worker executables were given on the command line.
    #[error("no worker tasks were requested")]
    NoTasks,

    /// A child process could not be spawned during bootstrap.
    #[error("failed to spawn {path:?}: {source}")]
    Spawn {
        /// Path of the executable that failed to start.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Creating or configuring the shell pipe pair failed.
    #[error("shell channel setup failed: {errno}")]
    ChannelSetup {
        /// Underlying errno.
        errno: Errno,
    },

    /// Converting a pipe end into an async handle failed.
    #[error("shell channel registration failed: {source}")]
    ChannelRegister {
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Delivering a signal to a tracked process failed.
    #[error("signal delivery to pid {pid} failed: {errno}")]
    Deliver {
        /// Target process id.
        pid: i32,
        /// Underlying errno.
        errno: Errno,
    },

    /// Polling child state failed irrecoverably.
    #[error("waitpid failed: {errno}")]
    Wait {
        /// Underlying errno.
        errno: Errno,
    },

    /// A freshly spawned child died before reaching its stop checkpoint.
    #[error("child {pid} exited before reaching its stop checkpoint")]
    DiedBeforeCheckpoint {
        /// Process id of the dead child.
        pid: i32,
    },

    /// Registering an OS signal listener failed.
    #[error("signal listener setup failed: {source}")]
    SignalSetup {
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The scheduler event queue closed while tasks were still tracked.
    #[error("event queue closed unexpectedly")]
    QueueClosed,

    /// Command-line arguments could not be parsed.
    #[error("{0}")]
    Usage(String),
}

impl SchedError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskwheel::SchedError;
    ///
    /// assert_eq!(SchedError::NoTasks.as_label(), "no_tasks");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedError::NoTasks => "no_tasks",
            SchedError::Spawn { .. } => "spawn_failed",
            SchedError::ChannelSetup { .. } => "channel_setup_failed",
            SchedError::ChannelRegister { .. } => "channel_register_failed",
            SchedError::Deliver { .. } => "signal_delivery_failed",
            SchedError::Wait { .. } => "wait_failed",
            SchedError::DiedBeforeCheckpoint { .. } => "died_before_checkpoint",
            SchedError::SignalSetup { .. } => "signal_setup_failed",
            SchedError::QueueClosed => "event_queue_closed",
            SchedError::Usage(_) => "usage",
        }
    }
}
