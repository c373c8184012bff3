//! # Shell IPC: wire format and channel task.
//!
//! The controlling shell talks to the scheduler over two unidirectional
//! anonymous pipes carrying fixed-size frames:
//!
//! ```text
//! shell ── request pipe (68-byte frames) ──► ShellChannel ──► SchedEvent queue
//! shell ◄─ response pipe (4-byte status) ─── ShellChannel ◄── oneshot reply
//! ```
//!
//! One request is in flight at a time; a short read or write abandons the
//! channel while the scheduler keeps running the remaining tasks.

mod channel;
pub mod wire;

pub use channel::ShellChannel;
