//! Shared application state for the HTTP layer

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use crate::{
    tasks::{Command, DispatchResult},
    timer::{TimerEvent, TimerSnapshot},
};

/// Handle to the timer event loop plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Sender into the timer event loop
    pub commands: mpsc::UnboundedSender<Command>,
    /// Latest snapshot published by the event loop
    pub snapshot_rx: watch::Receiver<TimerSnapshot>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        commands: mpsc::UnboundedSender<Command>,
        snapshot_rx: watch::Receiver<TimerSnapshot>,
    ) -> Self {
        Self {
            commands,
            snapshot_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Send a user event to the timer and wait for the resulting snapshot
    pub async fn dispatch(&self, event: TimerEvent) -> Result<DispatchResult, String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Dispatch { event, reply: Some(reply_tx) })
            .map_err(|_| "Timer event loop is not running".to_string())?;

        let result = reply_rx
            .await
            .map_err(|e| format!("Timer event loop dropped the reply: {}", e))?;

        if result.handled {
            self.record_action(event.name());
        } else {
            debug!("{} ignored in state {}", event.name(), result.snapshot.state);
        }
        Ok(result)
    }

    /// Latest published snapshot, without waiting on the event loop
    pub fn get_snapshot(&self) -> TimerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    fn record_action(&self, action: &str) {
        match self.last_action.lock() {
            Ok(mut last_action) => *last_action = Some(action.to_string()),
            Err(e) => warn!("Failed to lock last action: {}", e),
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
