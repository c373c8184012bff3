//! # Task registry: circular ordered collection of tracked processes.
//!
//! The registry replaces the classic hand-linked circular list of a
//! round-robin scheduler with stable-keyed storage:
//!
//! - records live in a `HashMap<TaskId, TaskRecord>`,
//! - rotation order is an explicit ring (`VecDeque<TaskId>`),
//! - the running slot is an `Option<TaskId>`.
//!
//! Task ids are monotonic and never reused within a run, so a stale id held
//! across a removal can never alias a different record.
//!
//! The registry performs no locking: the dispatcher loop is its only writer,
//! and every asynchronous source reaches it through the event queue.

mod record;
mod ring;

pub use record::{TaskId, TaskRecord, TaskRole};
pub use ring::Registry;
