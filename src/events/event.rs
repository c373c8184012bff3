//! # Runtime events emitted by the scheduler.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Admission events**: tasks entering the registry (bootstrap or `exec-task`)
//! - **Dispatch events**: rotation of the running slot (continue/preempt/quantum)
//! - **Lifecycle events**: observed child state changes (stopped, exited, killed)
//! - **Channel events**: shell request handling and channel teardown
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! task name, the scheduler-assigned id and the OS process id.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission events ===
    /// A task was admitted at the tail of the rotation.
    ///
    /// Sets: `task`, `id`, `pid`.
    TaskAdmitted,

    /// An `exec-task` spawn failed; nothing was admitted.
    ///
    /// Sets: `task` (requested path), `reason`.
    SpawnFailed,

    // === Dispatch events ===
    /// A task received SIGCONT and now owns the running slot.
    ///
    /// Sets: `task`, `id`, `pid`.
    TaskContinued,

    /// The running task was stopped to make room for its successor.
    ///
    /// Sets: `task`, `id`, `pid`.
    TaskPreempted,

    /// The quantum timer fired.
    QuantumExpired,

    // === Lifecycle events ===
    /// A tracked child reported a stop (preemption or manual SIGSTOP).
    ///
    /// Informational only; the dispatcher takes no action.
    ///
    /// Sets: `pid`.
    ChildStopped,

    /// A tracked task exited on its own.
    ///
    /// Sets: `task`, `id`, `pid`, `code` (exit status).
    TaskExited,

    /// A tracked task was terminated by a signal (including admin kills).
    ///
    /// Sets: `task`, `id`, `pid`, optional `reason`.
    TaskKilled,

    // === Shell channel events ===
    /// A shell request was decoded and answered.
    ///
    /// Sets: `reason` (command name), `code` (status sent back).
    ShellRequestHandled,

    /// The shell channel was abandoned after a protocol failure.
    ///
    /// The scheduler keeps running the remaining tasks.
    ///
    /// Sets: `reason`.
    ShellChannelClosed,

    // === Terminal events ===
    /// A termination signal was observed; all tasks will be killed.
    ShutdownRequested,

    /// The registry drained naturally; the scheduler exits with status 0.
    SchedulerDrained,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task display name, if applicable.
    pub task: Option<Arc<str>>,
    /// Scheduler-assigned task id.
    pub id: Option<u32>,
    /// OS process id.
    pub pid: Option<i32>,
    /// Exit status or response status code.
    pub code: Option<i32>,
    /// Human-readable reason (errors, protocol details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            id: None,
            pid: None,
            code: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a scheduler-assigned task id.
    #[inline]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Attaches an OS process id.
    #[inline]
    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches an exit status or response status code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
