//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the dispatcher, the child
//! reaper and the shell channel.
//!
//! These events are the scheduler's observability surface: they feed the
//! [`Subscribe`](crate::subscribers::Subscribe) fan-out (e.g. the built-in
//! [`LogWriter`](crate::subscribers::LogWriter)). They are distinct from
//! [`SchedEvent`](crate::sched::SchedEvent), the dispatcher's input queue.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
