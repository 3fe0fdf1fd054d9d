//! Executes the effect descriptors produced by the state machine

use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc::WeakUnboundedSender;
use tracing::{debug, warn};

use super::{
    event_loop::Command,
    ticker::{start_ticker, TickerHandle},
};
use crate::{persistence::SnapshotStore, services::Notifier, timer::Effect};

/// Owns every side-effecting collaborator, including the single ticker
pub struct EffectRunner {
    notifier: Arc<dyn Notifier>,
    snapshots: Option<SnapshotStore>,
    tick_interval: Duration,
    commands: WeakUnboundedSender<Command>,
    ticker: Option<TickerHandle>,
    next_generation: u64,
}

impl EffectRunner {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        snapshots: Option<SnapshotStore>,
        tick_interval: Duration,
        commands: WeakUnboundedSender<Command>,
    ) -> Self {
        Self {
            notifier,
            snapshots,
            tick_interval,
            commands,
            ticker: None,
            next_generation: 0,
        }
    }

    pub fn run(&mut self, effects: &[Effect]) {
        for effect in effects {
            self.apply(effect);
        }
    }

    /// Generation of the live ticker, if one is running
    pub fn active_generation(&self) -> Option<u64> {
        self.ticker.as_ref().map(TickerHandle::generation)
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::PlayStartSound => self.notifier.play_start_sound(),
            Effect::PlayCompletionSound => self.notifier.play_completion_sound(),
            Effect::PersistSnapshot(snapshot) => match &self.snapshots {
                Some(store) => store.write(snapshot),
                None => debug!("No snapshot store configured, skipping persist"),
            },
            Effect::EraseSnapshot => {
                if let Some(store) = &self.snapshots {
                    store.erase();
                }
            }
            Effect::StartTicker => {
                if let Some(previous) = self.ticker.take() {
                    warn!("Ticker #{} still running on start, replacing it", previous.generation());
                    previous.stop();
                }
                self.next_generation += 1;
                self.ticker = Some(start_ticker(
                    self.tick_interval,
                    self.next_generation,
                    self.commands.clone(),
                ));
            }
            Effect::StopTicker => {
                if let Some(ticker) = self.ticker.take() {
                    ticker.stop();
                }
            }
        }
    }
}
