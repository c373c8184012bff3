//! # Event subscribers for the scheduler runtime.
//!
//! Provides the [`Subscribe`] trait and built-in implementations for handling
//! runtime events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ```text
//! Dispatcher / Reaper / ShellChannel ── publish(Event) ──► Bus
//!                                                           │
//!                                               SubscriberSet::emit(&Event)
//!                                                    ┌──────┴──────┐
//!                                                    ▼             ▼
//!                                                LogWriter      custom...
//! ```

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
