//! # Dispatcher: the single-threaded scheduling loop.
//!
//! The dispatcher owns the [`Registry`], the process-control handle and the
//! quantum timer, and consumes the [`SchedEvent`] queue. Because it is the
//! only writer of the registry, every administrative command and every child
//! notification observes a consistent task table; serialization comes from
//! queue order, not from masking.
//!
//! ## Rotation rules
//! - On start, the head task (the shell) is continued; the quantum is armed
//!   when more than one task exists.
//! - Quantum expiry preempts: the running task is stopped, its circular
//!   successor continued, the timer re-armed. With a single task the timer
//!   stays disarmed - there is nobody to yield to.
//! - A death (natural exit, signal, or `kill-task`) removes the record. If
//!   it owned the running slot, the successor captured *before* the removal
//!   takes over. Draining the registry ends the loop with
//!   [`Outcome::Drained`].
//! - A stop notification is informational only; preemption stops arrive
//!   here after the rotation already moved on.
//! - Notifications for pids no longer in the registry are dropped (they
//!   lost a race against an earlier removal).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::error::SchedError;
use crate::events::{Bus, Event, EventKind};
use crate::ipc::wire::{
    Request, STATUS_NO_SUCH_TASK, STATUS_OK, STATUS_SPAWN_FAILED,
};
use crate::proc::{ProcSignal, ProcessControl};
use crate::registry::{Registry, TaskId, TaskRole};
use crate::sched::SchedEvent;

/// How the dispatch loop ended. Both map to exit code 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every tracked task exited or was killed; the registry is empty.
    Drained,
    /// A termination signal was observed; all tasks were killed.
    Shutdown,
}

/// Round-robin dispatcher over one logical running slot.
pub struct Dispatcher<P: ProcessControl> {
    registry: Registry,
    procs: P,
    bus: Bus,
    quantum: Duration,
    events: mpsc::Receiver<SchedEvent>,
    /// Armed quantum deadline; `None` while preemption is pointless.
    deadline: Option<Instant>,
}

impl<P: ProcessControl> Dispatcher<P> {
    /// Creates a dispatcher over a bootstrapped registry.
    pub fn new(
        registry: Registry,
        procs: P,
        bus: Bus,
        quantum: Duration,
        events: mpsc::Receiver<SchedEvent>,
    ) -> Self {
        Self {
            registry,
            procs,
            bus,
            quantum,
            events,
            deadline: None,
        }
    }

    /// Runs the dispatch loop until the registry drains, a shutdown signal
    /// arrives, or a fatal error occurs.
    pub async fn run(mut self) -> Result<Outcome, SchedError> {
        self.start()?;
        loop {
            let ev = self.next_event().await?;
            if let Some(outcome) = self.handle_event(ev)? {
                return Ok(outcome);
            }
        }
    }

    /// Continues the head task and arms the quantum.
    fn start(&mut self) -> Result<(), SchedError> {
        let head = self.registry.head().ok_or(SchedError::NoTasks)?;
        self.continue_task(head)?;
        self.arm_quantum();
        Ok(())
    }

    /// Waits for the next event, synthesizing [`SchedEvent::QuantumExpired`]
    /// when the armed deadline fires first.
    async fn next_event(&mut self) -> Result<SchedEvent, SchedError> {
        match self.deadline {
            Some(at) => tokio::select! {
                _ = time::sleep_until(at) => Ok(SchedEvent::QuantumExpired),
                ev = self.events.recv() => ev.ok_or(SchedError::QueueClosed),
            },
            None => self.events.recv().await.ok_or(SchedError::QueueClosed),
        }
    }

    /// Applies one event to the registry and the running slot.
    fn handle_event(&mut self, ev: SchedEvent) -> Result<Option<Outcome>, SchedError> {
        match ev {
            SchedEvent::ChildExited { pid, code } => {
                let Some(id) = self.registry.id_for_pid(pid) else {
                    return Ok(None);
                };
                self.publish_for(id, EventKind::TaskExited, |e| e.with_code(code));
                self.retire(id)
            }
            SchedEvent::ChildKilled { pid } => {
                let Some(id) = self.registry.id_for_pid(pid) else {
                    return Ok(None);
                };
                self.publish_for(id, EventKind::TaskKilled, |e| e);
                self.retire(id)
            }
            SchedEvent::ChildStopped { pid } => {
                self.bus
                    .publish(Event::new(EventKind::ChildStopped).with_pid(pid.as_raw()));
                Ok(None)
            }
            SchedEvent::QuantumExpired => self.preempt(),
            SchedEvent::ShellRequest { request, reply } => {
                let (status, outcome) = self.handle_request(request)?;
                // The shell may already be gone; its exit notification is
                // on the queue behind us.
                let _ = reply.send(status);
                Ok(outcome)
            }
            SchedEvent::ShutdownRequested => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                let ids: Vec<TaskId> = self.registry.iter_ring().map(|r| r.id).collect();
                for id in ids {
                    if let Some(rec) = self.registry.find_by_id(id) {
                        self.procs.deliver(rec.pid, ProcSignal::Kill)?;
                    }
                }
                Ok(Some(Outcome::Shutdown))
            }
            SchedEvent::WaitFailed { errno } => Err(SchedError::Wait { errno }),
        }
    }

    /// Stops the running task and hands the slot to its successor.
    fn preempt(&mut self) -> Result<Option<Outcome>, SchedError> {
        self.bus.publish(Event::new(EventKind::QuantumExpired));
        if self.registry.len() <= 1 {
            self.deadline = None;
            return Ok(None);
        }
        let Some(cur) = self.registry.running() else {
            return Ok(None);
        };
        let Some(next) = self.registry.next_after(cur) else {
            return Ok(None);
        };

        if let Some(rec) = self.registry.find_by_id(cur) {
            self.procs.deliver(rec.pid, ProcSignal::Stop)?;
        }
        self.publish_for(cur, EventKind::TaskPreempted, |e| e);
        self.continue_task(next)?;
        self.arm_quantum();
        Ok(None)
    }

    /// Removes a dead task, repointing the running slot if it owned it.
    fn retire(&mut self, id: TaskId) -> Result<Option<Outcome>, SchedError> {
        let was_running = self.registry.running() == Some(id);
        // Capture the successor before the removal; afterwards the id is gone.
        let successor = if was_running {
            self.registry.next_after(id)
        } else {
            None
        };
        self.registry.remove(id);

        if self.registry.is_empty() {
            self.bus.publish(Event::new(EventKind::SchedulerDrained));
            return Ok(Some(Outcome::Drained));
        }
        if was_running {
            if let Some(next) = successor {
                self.continue_task(next)?;
            }
            self.arm_quantum();
        } else if self.registry.len() == 1 {
            // The survivor has nobody to yield to.
            self.deadline = None;
        }
        Ok(None)
    }

    /// Executes one shell command against the (consistent) registry.
    fn handle_request(&mut self, request: Request) -> Result<(i32, Option<Outcome>), SchedError> {
        match request {
            Request::ListTasks => {
                self.print_tasks();
                Ok((STATUS_OK, None))
            }
            Request::KillTask(raw) => {
                let id = TaskId(raw);
                let Some(rec) = self.registry.find_by_id(id) else {
                    return Ok((STATUS_NO_SUCH_TASK, None));
                };
                let pid = rec.pid;
                self.procs.deliver(pid, ProcSignal::Kill)?;
                self.publish_for(id, EventKind::TaskKilled, |e| e.with_reason("kill-task"));
                let outcome = self.retire(id)?;
                Ok((STATUS_OK, outcome))
            }
            Request::ExecTask(path) => match self.procs.spawn_suspended(&path, &[]) {
                Ok(pid) => {
                    let id = self.registry.insert(pid, &path, TaskRole::Worker);
                    self.publish_for(id, EventKind::TaskAdmitted, |e| e);
                    // The new task waits, suspended, for the rotation to
                    // reach it; but the running task can now be preempted.
                    if self.deadline.is_none() && self.registry.len() > 1 {
                        self.arm_quantum();
                    }
                    Ok((STATUS_OK, None))
                }
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::SpawnFailed)
                            .with_task(path)
                            .with_reason(err.to_string()),
                    );
                    Ok((STATUS_SPAWN_FAILED, None))
                }
            },
        }
    }

    /// Delivers SIGCONT to `id` and gives it the running slot.
    fn continue_task(&mut self, id: TaskId) -> Result<(), SchedError> {
        let Some(rec) = self.registry.find_by_id(id) else {
            return Ok(());
        };
        let pid = rec.pid;
        self.procs.deliver(pid, ProcSignal::Continue)?;
        self.registry.set_running(Some(id));
        self.publish_for(id, EventKind::TaskContinued, |e| e);
        Ok(())
    }

    /// Arms the quantum deadline, unless a lone task makes it pointless.
    fn arm_quantum(&mut self) {
        self.deadline = if self.registry.len() > 1 {
            Some(Instant::now() + self.quantum)
        } else {
            None
        };
    }

    fn publish_for<F>(&self, id: TaskId, kind: EventKind, extra: F)
    where
        F: FnOnce(Event) -> Event,
    {
        if let Some(rec) = self.registry.find_by_id(id) {
            let ev = Event::new(kind)
                .with_task(rec.name.as_str())
                .with_id(rec.id.0)
                .with_pid(rec.pid.as_raw());
            self.bus.publish(extra(ev));
        }
    }

    /// Human-readable task table, the side effect of `list-tasks`.
    fn print_tasks(&self) {
        println!("{:-<74}", "");
        for rec in self.registry.iter_ring() {
            let marker = if self.registry.running() == Some(rec.id) {
                "running"
            } else {
                ""
            };
            let role = match rec.role {
                TaskRole::Shell => "shell",
                TaskRole::Worker => "worker",
            };
            println!(
                "| id={:<4} name={:<32} pid={:<8} {:<6} {:<8}|",
                rec.id.0,
                rec.name,
                rec.pid.as_raw(),
                role,
                marker
            );
        }
        println!("{:-<74}", "");
    }
}
