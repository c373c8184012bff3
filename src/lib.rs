//! # taskwheel
//!
//! **Taskwheel** is a round-robin scheduler for externally spawned child
//! processes. It multiplexes a fixed set of suspended children onto one
//! logical "running" slot, rotating on quantum expiry and on task death,
//! and takes administrative commands from a separate controller process
//! (the *shell*) over a pipe pair.
//!
//! ## Architecture
//! ```text
//!             ┌───────────────┐   spawn suspended, barrier   ┌─────────────┐
//!             │   bootstrap   ├─────────────────────────────►│ shell + N   │
//!             └──────┬────────┘                              │ workers     │
//!                    ▼                                       └──────┬──────┘
//!             ┌───────────────┐                                     │ SIGCHLD
//!   SIGCHLD ─►│    reaper     │── ChildExited/Stopped/Killed ──┐    │
//!             └───────────────┘                                │    │
//!   SIGINT ──►┌───────────────┐                                ▼    │
//!   SIGTERM   │ shutdown task │── ShutdownRequested ──► mpsc queue  │
//!             └───────────────┘                                │    │
//!   request ─►┌───────────────┐                                │    │
//!   pipe      │ ShellChannel  │── ShellRequest{..., reply} ────┘    │
//!   response◄─┤               │◄───────── oneshot status            │
//!   pipe      └───────────────┘                                     │
//!                                                              ┌────▼───────┐
//!                    Dispatcher loop ◄─────────────────────────┤  Registry  │
//!                    (sole registry writer, quantum timer,     │ ring+map   │
//!                     SIGCONT/SIGSTOP/SIGKILL via proc layer)  └────────────┘
//! ```
//!
//! ## Design rules
//! - **The queue is the lock.** Signal listeners and the shell channel only
//!   enqueue [`SchedEvent`]s; the dispatcher loop is the single writer of
//!   the [`Registry`]. An administrative command and a child notification
//!   can never observe each other half-done.
//! - **Ids, not pointers.** Records live in stable-keyed storage; rotation
//!   order is an explicit ring of monotonically increasing [`TaskId`]s that
//!   are never reused, so a stale id cannot alias a freed record.
//! - **Preemption is an event.** Quantum expiry is synthesized into the same
//!   event model as child deaths and shell commands.
//! - **Strict round-robin.** Admission order is rotation order; no
//!   priorities, no fairness beyond the cycle, no state across restarts.
//!
//! ## Observability
//! Every scheduling decision is published as an [`Event`] on a broadcast
//! [`Bus`]; plug in a [`Subscribe`] implementation (or the built-in
//! [`LogWriter`]) to watch the rotation.

mod config;
mod error;
mod events;
mod ipc;
mod proc;
mod registry;
mod sched;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use error::SchedError;
pub use events::{Bus, Event, EventKind};
pub use ipc::wire;
pub use ipc::ShellChannel;
pub use proc::{OsProcessControl, ProcSignal, ProcessControl};
pub use registry::{Registry, TaskId, TaskRecord, TaskRole};
pub use sched::{
    bootstrap, spawn_reaper, spawn_shutdown_listener, Bootstrapped, Dispatcher, Outcome,
    SchedEvent,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
