//! Timer event loop
//!
//! The loop is the only owner of the state machine. User events and ticks
//! arrive over one channel and are processed strictly one at a time.

use std::{sync::Arc, time::Duration};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::effect_runner::EffectRunner;
use crate::{
    persistence::SnapshotStore,
    services::{Clock, Notifier},
    timer::{TimerEvent, TimerMachine, TimerSnapshot},
};

/// Messages accepted by the event loop
#[derive(Debug)]
pub enum Command {
    /// A user event, optionally with a channel for the resulting snapshot
    Dispatch {
        event: TimerEvent,
        reply: Option<oneshot::Sender<DispatchResult>>,
    },
    /// A tick from the ticker with the given generation
    Tick { generation: u64 },
}

/// What happened to a dispatched event
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub handled: bool,
    pub snapshot: TimerSnapshot,
}

/// Machine plus the collaborators that execute its effects
pub struct TimerDriver {
    machine: TimerMachine,
    runner: EffectRunner,
    clock: Arc<dyn Clock>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
}

impl TimerDriver {
    /// Build the driver and its command channel.
    ///
    /// The returned sender is the only strong one; the loop exits once it
    /// and all of its clones are dropped.
    pub fn new(
        machine: TimerMachine,
        notifier: Arc<dyn Notifier>,
        snapshots: Option<SnapshotStore>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> (Self, mpsc::UnboundedSender<Command>, mpsc::UnboundedReceiver<Command>) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::capture(&machine, clock.now_ms()));
        let runner = EffectRunner::new(notifier, snapshots, tick_interval, commands.downgrade());

        let driver = Self {
            machine,
            runner,
            clock,
            snapshot_tx,
        };
        (driver, commands, command_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn machine(&self) -> &TimerMachine {
        &self.machine
    }

    /// Process one command to completion
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Dispatch { event, reply } => {
                let handled = self.apply(event);
                let snapshot = self.publish();
                if let Some(reply) = reply {
                    if reply.send(DispatchResult { handled, snapshot }).is_err() {
                        debug!("Dispatch caller went away before the reply");
                    }
                }
            }
            Command::Tick { generation } => {
                if self.runner.active_generation() != Some(generation) {
                    debug!("Dropping stale tick from ticker #{}", generation);
                    return;
                }
                if self.apply(TimerEvent::Tick) {
                    self.publish();
                }
            }
        }
    }

    fn apply(&mut self, event: TimerEvent) -> bool {
        let previous = self.machine.state();
        let outcome = self.machine.send(event, self.clock.now_ms());
        if !outcome.handled {
            return false;
        }

        let current = self.machine.state();
        if current != previous {
            info!("Timer {} -> {} ({})", previous, current, event.name());
        }
        self.runner.run(&outcome.effects);
        true
    }

    fn publish(&self) -> TimerSnapshot {
        let snapshot = TimerSnapshot::capture(&self.machine, self.clock.now_ms());
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}

/// Drive the timer for the lifetime of the runtime
pub async fn timer_event_loop(mut driver: TimerDriver, mut command_rx: mpsc::UnboundedReceiver<Command>) {
    info!(
        "Starting timer event loop in state {}",
        driver.machine().state()
    );

    while let Some(command) = command_rx.recv().await {
        driver.handle(command);
    }

    warn!("Timer command channel closed, event loop exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{KeyValueStore, MemoryStore};
    use crate::services::FixedClock;
    use crate::timer::{MachineFeatures, TimerState};

    struct SilentNotifier;

    impl Notifier for SilentNotifier {
        fn play_start_sound(&self) {}
        fn play_completion_sound(&self) {}
    }

    type Parts = (TimerDriver, mpsc::UnboundedSender<Command>, mpsc::UnboundedReceiver<Command>);

    fn driver(store: Arc<MemoryStore>) -> Parts {
        TimerDriver::new(
            TimerMachine::new(MachineFeatures::default()),
            Arc::new(SilentNotifier),
            Some(SnapshotStore::new(store)),
            Arc::new(FixedClock(0)),
            Duration::from_secs(1),
        )
    }

    fn dispatch(driver: &mut TimerDriver, event: TimerEvent) {
        driver.handle(Command::Dispatch { event, reply: None });
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_to_finished() {
        let store = Arc::new(MemoryStore::new());
        let (driver, commands, command_rx) = driver(store.clone());
        let mut snapshots = driver.subscribe();
        tokio::spawn(timer_event_loop(driver, command_rx));

        commands
            .send(Command::Dispatch { event: TimerEvent::UpdateSeconds(3.0), reply: None })
            .unwrap();
        let (reply_tx, reply_rx) = oneshot::channel();
        commands
            .send(Command::Dispatch { event: TimerEvent::Start, reply: Some(reply_tx) })
            .unwrap();

        let result = reply_rx.await.unwrap();
        assert!(result.handled);
        assert_eq!(result.snapshot.state, TimerState::Working);
        assert_eq!(store.get("durationInMs").unwrap().as_deref(), Some("3000"));

        tokio::time::sleep(Duration::from_millis(3_500)).await;

        let snapshot = snapshots.borrow_and_update().clone();
        assert_eq!(snapshot.state, TimerState::Finished);
        assert_eq!(snapshot.remaining_ms, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn stale_ticks_are_dropped() {
        let (mut driver, _commands, _rx) = driver(Arc::new(MemoryStore::new()));
        dispatch(&mut driver, TimerEvent::UpdateSeconds(10.0));
        dispatch(&mut driver, TimerEvent::Start);
        let first = driver.runner.active_generation().unwrap();

        dispatch(&mut driver, TimerEvent::Stop);
        dispatch(&mut driver, TimerEvent::Continue);
        let second = driver.runner.active_generation().unwrap();
        assert_ne!(first, second);

        driver.handle(Command::Tick { generation: first });
        assert_eq!(driver.machine().context().remaining_ms, 10_000);

        driver.handle(Command::Tick { generation: second });
        assert_eq!(driver.machine().context().remaining_ms, 9_000);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_exits_when_senders_are_dropped() {
        let (driver, commands, command_rx) = driver(Arc::new(MemoryStore::new()));
        let event_loop = tokio::spawn(timer_event_loop(driver, command_rx));

        // A running ticker must not keep the loop alive.
        commands
            .send(Command::Dispatch { event: TimerEvent::UpdateSeconds(30.0), reply: None })
            .unwrap();
        commands
            .send(Command::Dispatch { event: TimerEvent::Start, reply: None })
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        drop(commands);

        tokio::time::timeout(Duration::from_secs(5), event_loop)
            .await
            .expect("event loop should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn ignored_events_still_reply() {
        let (mut driver, _commands, _rx) = driver(Arc::new(MemoryStore::new()));
        let (reply_tx, mut reply_rx) = oneshot::channel();
        driver.handle(Command::Dispatch { event: TimerEvent::Start, reply: Some(reply_tx) });

        let result = reply_rx.try_recv().unwrap();
        assert!(!result.handled);
        assert_eq!(result.snapshot.state, TimerState::Idle);
    }
}
