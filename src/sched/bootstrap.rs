//! # Bootstrap: spawn everything suspended, then hand over to the dispatcher.
//!
//! The shell is spawned first with a private pipe pair whose child-end fd
//! numbers are passed as zero-padded command-line arguments. Every worker
//! from the command line follows. All children park themselves in SIGSTOP
//! before exec; bootstrap blocks until each one has reported that stop
//! checkpoint, so the dispatcher can never deliver a SIGCONT to a process
//! that is not yet ready for it.

use std::os::fd::{AsRawFd, OwnedFd};

use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::unistd::pipe;

use crate::config::Config;
use crate::error::SchedError;
use crate::events::{Bus, Event, EventKind};
use crate::proc::ProcessControl;
use crate::registry::{Registry, TaskRole};

/// Result of a successful bootstrap.
#[derive(Debug)]
pub struct Bootstrapped {
    /// Registry holding the shell (head) and all workers, in admission order.
    pub registry: Registry,
    /// Parent read end of the shell→scheduler request pipe.
    pub request_rx: OwnedFd,
    /// Parent write end of the scheduler→shell response pipe.
    pub response_tx: OwnedFd,
}

/// Keeps a parent-side pipe end out of future exec'd children.
fn set_cloexec(fd: &OwnedFd) -> Result<(), SchedError> {
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))
        .map(|_| ())
        .map_err(|errno| SchedError::ChannelSetup { errno })
}

/// Spawns the shell and all requested workers behind the suspended barrier.
///
/// Fatal on: zero workers, pipe setup failure, any spawn failure, or a child
/// dying before its checkpoint.
pub fn bootstrap<P: ProcessControl>(
    procs: &mut P,
    cfg: &Config,
    workers: &[String],
    bus: &Bus,
) -> Result<Bootstrapped, SchedError> {
    if workers.is_empty() {
        return Err(SchedError::NoTasks);
    }

    let (request_rx, request_tx) = pipe().map_err(|errno| SchedError::ChannelSetup { errno })?;
    let (response_rx, response_tx) = pipe().map_err(|errno| SchedError::ChannelSetup { errno })?;
    set_cloexec(&request_rx)?;
    set_cloexec(&response_tx)?;

    let mut registry = Registry::new();
    let mut pids = Vec::with_capacity(workers.len() + 1);

    // The shell writes requests into request_tx and reads statuses from
    // response_rx; it learns both fds from its argv, like any classic
    // fd-passing exec.
    let shell_args = vec![
        format!("{:05}", request_tx.as_raw_fd()),
        format!("{:05}", response_rx.as_raw_fd()),
    ];
    let shell_pid = procs.spawn_suspended(&cfg.shell_path, &shell_args)?;
    let shell_id = registry.insert(shell_pid, &cfg.shell_path, TaskRole::Shell);
    pids.push(shell_pid);
    bus.publish(
        Event::new(EventKind::TaskAdmitted)
            .with_task(cfg.shell_path.as_str())
            .with_id(shell_id.0)
            .with_pid(shell_pid.as_raw()),
    );

    // The child ends live on only inside the shell.
    drop(request_tx);
    drop(response_rx);

    for path in workers {
        let pid = procs.spawn_suspended(path, &[])?;
        let id = registry.insert(pid, path, TaskRole::Worker);
        pids.push(pid);
        bus.publish(
            Event::new(EventKind::TaskAdmitted)
                .with_task(path.as_str())
                .with_id(id.0)
                .with_pid(pid.as_raw()),
        );
    }

    // Barrier: every child must reach its SIGSTOP checkpoint before the
    // dispatcher may continue anyone.
    for pid in pids {
        procs.await_checkpoint(pid)?;
    }

    Ok(Bootstrapped {
        registry,
        request_rx,
        response_tx,
    })
}
