//! # Simple logging subscriber.
//!
//! [`LogWriter`] prints scheduler events to stdout in a human-readable
//! format.
//!
//! ## Output format
//! ```text
//! [admitted] task=./worker id=2 pid=4013
//! [continued] task=./shell id=1 pid=4012
//! [quantum] 2s slice expired
//! [preempted] task=./shell id=1 pid=4012
//! [exited] task=./worker id=2 pid=4013 code=0
//! [shell-closed] reason="short read"
//! [drained] all tasks finished
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Not intended as a structured logging layer - implement a custom
/// [`Subscribe`] for that.
pub struct LogWriter;

fn fmt_target(e: &Event) -> String {
    format!(
        "task={} id={} pid={}",
        e.task.as_deref().unwrap_or("?"),
        e.id.map_or_else(|| "?".into(), |i| i.to_string()),
        e.pid.map_or_else(|| "?".into(), |p| p.to_string()),
    )
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskAdmitted => println!("[admitted] {}", fmt_target(e)),
            EventKind::SpawnFailed => {
                println!(
                    "[spawn-failed] task={:?} reason={:?}",
                    e.task.as_deref().unwrap_or("?"),
                    e.reason.as_deref().unwrap_or("?"),
                );
            }
            EventKind::TaskContinued => println!("[continued] {}", fmt_target(e)),
            EventKind::TaskPreempted => println!("[preempted] {}", fmt_target(e)),
            EventKind::QuantumExpired => println!("[quantum] slice expired"),
            EventKind::ChildStopped => {
                println!("[stopped] pid={}", e.pid.unwrap_or(-1));
            }
            EventKind::TaskExited => {
                println!("[exited] {} code={}", fmt_target(e), e.code.unwrap_or(-1));
            }
            EventKind::TaskKilled => {
                println!(
                    "[killed] {} reason={:?}",
                    fmt_target(e),
                    e.reason.as_deref().unwrap_or("signal"),
                );
            }
            EventKind::ShellRequestHandled => {
                println!(
                    "[shell] command={} status={}",
                    e.reason.as_deref().unwrap_or("?"),
                    e.code.unwrap_or(0),
                );
            }
            EventKind::ShellChannelClosed => {
                println!(
                    "[shell-closed] reason={:?}",
                    e.reason.as_deref().unwrap_or("?"),
                );
            }
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::SchedulerDrained => println!("[drained] all tasks finished"),
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
