//! # Fan-out set of subscribers.
//!
//! [`SubscriberSet`] forwards each bus event to every registered subscriber,
//! in registration order. A dedicated listener task (spawned with
//! [`SubscriberSet::spawn_listener`]) drains the bus so publishers never wait
//! on subscriber work.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Ordered collection of event subscribers.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Arc<Self> {
        Arc::new(Self { subs })
    }

    /// Delivers one event to every subscriber, sequentially.
    pub async fn emit(&self, ev: &Event) {
        for sub in &self.subs {
            sub.on_event(ev).await;
        }
    }

    /// Subscribes to the bus and forwards events until the token is
    /// cancelled or the bus closes.
    ///
    /// Lagged receivers skip the missed items and keep going; losing a log
    /// line is preferable to stalling the scheduler.
    pub fn spawn_listener(self: Arc<Self>, bus: &Bus, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.emit(&ev).await,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let a = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let b = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let set = SubscriberSet::new(vec![a.clone() as Arc<dyn Subscribe>, b.clone()]);

        set.emit(&Event::new(EventKind::TaskAdmitted)).await;
        set.emit(&Event::new(EventKind::TaskExited)).await;

        let expected = vec![EventKind::TaskAdmitted, EventKind::TaskExited];
        assert_eq!(*a.seen.lock().unwrap(), expected);
        assert_eq!(*b.seen.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_listener_forwards_until_cancelled() {
        let rec = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let set = SubscriberSet::new(vec![rec.clone() as Arc<dyn Subscribe>]);
        let bus = Bus::new(16);
        let token = CancellationToken::new();
        let handle = set.spawn_listener(&bus, token.clone());

        bus.publish(Event::new(EventKind::QuantumExpired));
        tokio::task::yield_now().await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(*rec.seen.lock().unwrap(), vec![EventKind::QuantumExpired]);
    }
}
