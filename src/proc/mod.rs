//! # Process control primitive.
//!
//! [`ProcessControl`] is the seam between the scheduler and the OS: spawning
//! a child that parks itself in SIGSTOP before exec, delivering the three
//! scheduling signals, and the bootstrap barrier that waits for a child to
//! reach its stop checkpoint. The dispatcher and bootstrap are generic over
//! it so scenario tests can run against a recording fake.
//!
//! Children are deliberately spawned with [`std::process::Command`] rather
//! than `tokio::process`: the runtime's own child reaping would race the
//! scheduler's `waitpid` drain in [`crate::sched::reaper`].

use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;

use nix::sys::signal::{kill, raise, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::error::SchedError;

/// Signals the scheduler delivers to tracked processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcSignal {
    /// Resume a suspended task (SIGCONT).
    Continue,
    /// Suspend the running task (SIGSTOP).
    Stop,
    /// Terminate unconditionally (SIGKILL). Immediate, no grace period.
    Kill,
}

impl ProcSignal {
    fn as_signal(self) -> Signal {
        match self {
            ProcSignal::Continue => Signal::SIGCONT,
            ProcSignal::Stop => Signal::SIGSTOP,
            ProcSignal::Kill => Signal::SIGKILL,
        }
    }
}

/// OS capabilities the scheduler needs from the process layer.
pub trait ProcessControl {
    /// Spawns `path` with the given arguments, stopped before exec.
    ///
    /// The child raises SIGSTOP ahead of the exec and stays suspended until
    /// the rotation delivers its first [`ProcSignal::Continue`].
    fn spawn_suspended(&mut self, path: &str, args: &[String]) -> Result<Pid, SchedError>;

    /// Delivers a scheduling signal to a tracked process.
    fn deliver(&mut self, pid: Pid, sig: ProcSignal) -> Result<(), SchedError>;

    /// Blocks until the freshly spawned child reports its stop checkpoint.
    ///
    /// Part of the bootstrap barrier; must be called before anything can
    /// send the child a `Continue`.
    fn await_checkpoint(&mut self, pid: Pid) -> Result<(), SchedError>;
}

/// Real implementation backed by `fork`/`exec`, `kill(2)` and `waitpid(2)`.
#[derive(Debug, Default)]
pub struct OsProcessControl;

impl OsProcessControl {
    /// Creates the OS-backed process control.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessControl for OsProcessControl {
    fn spawn_suspended(&mut self, path: &str, args: &[String]) -> Result<Pid, SchedError> {
        let mut cmd = Command::new(path);
        cmd.args(args);
        // Runs in the child between fork and exec.
        unsafe {
            cmd.pre_exec(|| raise(Signal::SIGSTOP).map_err(io::Error::from));
        }
        let child = cmd.spawn().map_err(|source| SchedError::Spawn {
            path: path.to_string(),
            source,
        })?;
        Ok(Pid::from_raw(child.id() as i32))
    }

    fn deliver(&mut self, pid: Pid, sig: ProcSignal) -> Result<(), SchedError> {
        match kill(pid, sig.as_signal()) {
            Ok(()) => Ok(()),
            // The target died between our registry lookup and the kill(2);
            // the reaper will deliver the exit notification shortly.
            Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(errno) => Err(SchedError::Deliver {
                pid: pid.as_raw(),
                errno,
            }),
        }
    }

    fn await_checkpoint(&mut self, pid: Pid) -> Result<(), SchedError> {
        loop {
            match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
                Ok(WaitStatus::Stopped(_, _)) => return Ok(()),
                Ok(WaitStatus::Exited(_, _)) | Ok(WaitStatus::Signaled(_, _, _)) => {
                    return Err(SchedError::DiedBeforeCheckpoint { pid: pid.as_raw() });
                }
                Ok(_) => continue,
                Err(nix::errno::Errno::EINTR) => continue,
                Err(errno) => return Err(SchedError::Wait { errno }),
            }
        }
    }
}
