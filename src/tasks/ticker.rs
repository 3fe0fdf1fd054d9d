//! Periodic tick source for the working state

use std::time::Duration;
use tokio::{
    sync::mpsc::WeakUnboundedSender,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use super::event_loop::Command;

/// Handle to a running ticker. Dropping it stops the ticker.
#[derive(Debug)]
pub struct TickerHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stop(self) {
        debug!("Stopping ticker #{}", self.generation);
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a task that sends a tagged tick every `period`, first one after a
/// full period has passed
pub fn start_ticker(
    period: Duration,
    generation: u64,
    commands: WeakUnboundedSender<Command>,
) -> TickerHandle {
    debug!("Starting ticker #{} every {:?}", generation, period);

    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let Some(commands) = commands.upgrade() else {
                debug!("Event loop gone, ticker #{} exiting", generation);
                break;
            };
            if commands.send(Command::Tick { generation }).is_err() {
                debug!("Command channel closed, ticker #{} exiting", generation);
                break;
            }
        }
    });

    TickerHandle { generation, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _ticker = start_ticker(Duration::from_secs(1), 7, tx.downgrade());

        tokio::time::sleep(Duration::from_millis(3_500)).await;

        let mut ticks = Vec::new();
        while let Ok(command) = rx.try_recv() {
            ticks.push(command);
        }
        assert_eq!(ticks.len(), 3);
        assert!(ticks
            .iter()
            .all(|command| matches!(command, Command::Tick { generation: 7 })));
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_ends_the_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = start_ticker(Duration::from_secs(1), 1, tx.downgrade());

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        ticker.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 1);
    }
}
