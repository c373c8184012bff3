//! # Task record types.

use std::fmt;

use nix::unistd::Pid;

/// Scheduler-assigned task identifier.
///
/// Unique and monotonically increasing within a run; never reused, even
/// after the task it named is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role of a tracked task.
///
/// The shell is admitted into the rotation like any worker, but bootstrap
/// wires its pipe pair and teardown reporting differs, so the record carries
/// an explicit tag rather than encoding the role in a magic id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRole {
    /// The controlling shell process.
    Shell,
    /// An ordinary scheduled child.
    Worker,
}

/// Bookkeeping record for one tracked child process.
///
/// Records are exclusively owned by the [`Registry`](crate::registry::Registry);
/// other components hold [`TaskId`]s, never references, across scheduling
/// points.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    /// Scheduler-assigned identifier.
    pub id: TaskId,
    /// OS process id.
    pub pid: Pid,
    /// Display name (the executable path it was spawned from).
    pub name: String,
    /// Shell or worker.
    pub role: TaskRole,
}
