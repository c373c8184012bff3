//! Scheduler binary: bootstrap, wire the event sources, run the dispatcher.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use taskwheel::{
    bootstrap, spawn_reaper, spawn_shutdown_listener, Bus, Config, Dispatcher, LogWriter,
    OsProcessControl, SchedError, ShellChannel, Subscribe, SubscriberSet,
};

/// Capacity of the dispatcher event queue.
const EVENT_QUEUE_CAPACITY: usize = 128;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("taskwheel: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), SchedError> {
    let (cfg, workers) = Config::from_args(std::env::args().skip(1))?;

    let bus = Bus::new(cfg.bus_capacity);
    let token = CancellationToken::new();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let _log_task = SubscriberSet::new(subs).spawn_listener(&bus, token.clone());

    let mut procs = OsProcessControl::new();
    let boot = bootstrap(&mut procs, &cfg, &workers, &bus)?;

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    // Listeners are registered before the dispatcher delivers the first
    // SIGCONT, so no child-state change can be missed.
    let _reaper = spawn_reaper(events_tx.clone(), token.clone())?;
    let _signals = spawn_shutdown_listener(events_tx.clone(), token.clone())?;
    let _shell = ShellChannel::from_owned(boot.request_rx, boot.response_tx, events_tx, bus.clone())?
        .spawn(token.clone());

    let dispatcher = Dispatcher::new(boot.registry, procs, bus, cfg.quantum, events_rx);
    let outcome = dispatcher.run().await;
    token.cancel();
    // Drained and Shutdown both exit 0.
    outcome.map(|_| ())
}
