//! Scheduler core: dispatch loop and its event sources.
//!
//! ```text
//!  SIGCHLD ─► reaper ── waitpid drain ──┐
//!  SIGINT/SIGTERM ─► shutdown listener ─┼─► mpsc queue ─► Dispatcher loop ─► Registry
//!  shell pipe ─► ShellChannel ──────────┘        ▲                │
//!                                                └── oneshot ◄───┘ (request status)
//! ```
//!
//! All asynchronous sources are reduced to [`SchedEvent`] values on one
//! queue; the dispatcher loop is the only code that touches the registry,
//! so notification handling and administrative commands can never observe a
//! half-updated task table. The queue *is* the signal mask of the classic
//! design.
//!
//! Modules:
//! - [`dispatcher`]: consumes the queue, owns registry and quantum timer;
//! - [`reaper`]: SIGCHLD listener draining `waitpid` into the queue;
//! - [`bootstrap`]: spawns shell + workers behind the all-suspended barrier;
//! - [`shutdown`]: termination-signal listener.

mod bootstrap;
mod dispatcher;
mod event;
mod reaper;
mod shutdown;

pub use bootstrap::{bootstrap, Bootstrapped};
pub use dispatcher::{Dispatcher, Outcome};
pub use event::SchedEvent;
pub use reaper::spawn_reaper;
pub use shutdown::spawn_shutdown_listener;
