//! Persistence adapter for in-progress countdowns
//!
//! Restores on startup, writes when a countdown starts, erases when it ends
//! or is cleared. Store failures are logged and swallowed.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::store::KeyValueStore;
use crate::timer::{Hours, Minutes, PersistedSnapshot, Seconds, TimerContext};

pub const HOURS_KEY: &str = "hours";
pub const MINUTES_KEY: &str = "minutes";
pub const SECONDS_KEY: &str = "seconds";
pub const DURATION_KEY: &str = "durationInMs";

const KEYS: [&str; 4] = [HOURS_KEY, MINUTES_KEY, SECONDS_KEY, DURATION_KEY];

/// Snapshot adapter over an injected key-value store
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Rebuild a context from the store, if any snapshot key is present
    pub fn restore(&self) -> Option<TimerContext> {
        let hours = self.read(HOURS_KEY);
        let minutes = self.read(MINUTES_KEY);
        let seconds = self.read(SECONDS_KEY);
        let duration = self.read(DURATION_KEY);

        if hours.is_none() && minutes.is_none() && seconds.is_none() && duration.is_none() {
            debug!("No persisted snapshot found");
            return None;
        }

        let mut context = TimerContext::from_fields(
            Hours::new(parse_field(hours.as_deref())),
            Minutes::new(parse_field(minutes.as_deref())),
            Seconds::new(parse_field(seconds.as_deref())),
        );

        match duration.as_deref().and_then(|raw| raw.trim().parse::<i64>().ok()) {
            Some(ms) => context.remaining_ms = ms.clamp(0, context.total_ms()),
            None => debug!("No usable {} entry, using field total", DURATION_KEY),
        }

        info!(
            "Restored snapshot: {:02}:{:02}:{:02}, {}ms remaining",
            context.hours.value(),
            context.minutes.value(),
            context.seconds.value(),
            context.remaining_ms
        );
        Some(context)
    }

    pub fn write(&self, snapshot: &PersistedSnapshot) {
        debug!("Persisting snapshot {:?}", snapshot);
        let hours = snapshot.hours.to_string();
        let minutes = snapshot.minutes.to_string();
        let seconds = snapshot.seconds.to_string();
        let duration = snapshot.duration_ms.to_string();

        let entries = [
            (HOURS_KEY, hours.as_str()),
            (MINUTES_KEY, minutes.as_str()),
            (SECONDS_KEY, seconds.as_str()),
            (DURATION_KEY, duration.as_str()),
        ];
        if let Err(e) = self.store.set_many(&entries) {
            warn!("Failed to persist snapshot: {}", e);
        }
    }

    pub fn erase(&self) {
        debug!("Erasing persisted snapshot");
        if let Err(e) = self.store.remove_many(&KEYS) {
            warn!("Failed to remove snapshot: {}", e);
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }
}

/// Absent or malformed values behave like malformed user input
fn parse_field(raw: Option<&str>) -> f64 {
    raw.and_then(|raw| raw.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
