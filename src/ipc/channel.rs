//! # Shell channel task.
//!
//! [`ShellChannel`] owns the scheduler-side pipe ends and services the shell
//! request loop: read one fixed-size request, forward it to the dispatcher
//! as a [`SchedEvent::ShellRequest`], await the status on a oneshot, write
//! the fixed-size response.
//!
//! ## Protocol failures
//! A short read or write (including EOF when the shell dies) abandons the
//! channel: the task publishes [`EventKind::ShellChannelClosed`] and exits.
//! The dispatcher and the remaining tasks are unaffected; only decode errors
//! are answered in-band with [`wire::STATUS_BAD_COMMAND`].
//!
//! Requests are strictly serial: the next frame is not read until the
//! previous response has been written.

use std::os::fd::{AsRawFd, OwnedFd};

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::pipe;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SchedError;
use crate::events::{Bus, Event, EventKind};
use crate::ipc::wire::{self, REQUEST_SIZE};
use crate::sched::SchedEvent;

/// Scheduler-side endpoint of the shell pipe pair.
pub struct ShellChannel {
    requests: pipe::Receiver,
    responses: pipe::Sender,
    events: mpsc::Sender<SchedEvent>,
    bus: Bus,
}

/// Puts a raw pipe end into non-blocking mode for the async reactor.
pub(crate) fn set_nonblocking(fd: &OwnedFd) -> Result<(), SchedError> {
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK))
        .map(|_| ())
        .map_err(|errno| SchedError::ChannelSetup { errno })
}

impl ShellChannel {
    /// Wraps the parent's pipe ends, registering them with the reactor.
    ///
    /// `request_rx` is the read end of the shell→scheduler pipe and
    /// `response_tx` the write end of the scheduler→shell pipe.
    pub fn from_owned(
        request_rx: OwnedFd,
        response_tx: OwnedFd,
        events: mpsc::Sender<SchedEvent>,
        bus: Bus,
    ) -> Result<Self, SchedError> {
        set_nonblocking(&request_rx)?;
        set_nonblocking(&response_tx)?;
        let requests = pipe::Receiver::from_owned_fd(request_rx)
            .map_err(|source| SchedError::ChannelRegister { source })?;
        let responses = pipe::Sender::from_owned_fd(response_tx)
            .map_err(|source| SchedError::ChannelRegister { source })?;
        Ok(Self {
            requests,
            responses,
            events,
            bus,
        })
    }

    /// Spawns the request loop.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(token).await })
    }

    async fn run(mut self, token: CancellationToken) {
        loop {
            let mut buf = [0u8; REQUEST_SIZE];
            let read = tokio::select! {
                _ = token.cancelled() => return,
                read = self.requests.read_exact(&mut buf) => read,
            };
            if let Err(err) = read {
                self.abandon(format!("short request read: {err}"));
                return;
            }

            let status = match wire::decode_request(&buf) {
                Ok(request) => {
                    let name = request.name();
                    let Some(status) = self.dispatch(request).await else {
                        // Dispatcher is gone; nothing left to serve.
                        return;
                    };
                    self.bus.publish(
                        Event::new(EventKind::ShellRequestHandled)
                            .with_reason(name)
                            .with_code(status),
                    );
                    status
                }
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::ShellRequestHandled)
                            .with_reason(err.to_string())
                            .with_code(wire::STATUS_BAD_COMMAND),
                    );
                    wire::STATUS_BAD_COMMAND
                }
            };

            if let Err(err) = self.responses.write_all(&wire::encode_status(status)).await {
                self.abandon(format!("short response write: {err}"));
                return;
            }
        }
    }

    /// Forwards one decoded request to the dispatcher and awaits the status.
    async fn dispatch(&self, request: wire::Request) -> Option<i32> {
        let (reply, answer) = oneshot::channel();
        self.events
            .send(SchedEvent::ShellRequest { request, reply })
            .await
            .ok()?;
        answer.await.ok()
    }

    fn abandon(&self, reason: String) {
        self.bus
            .publish(Event::new(EventKind::ShellChannelClosed).with_reason(reason));
    }
}
