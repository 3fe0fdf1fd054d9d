//! Timer context held by the state machine

use serde::{Deserialize, Serialize};

use super::fields::{Hours, Minutes, Seconds};

/// Mutable record the machine carries between transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerContext {
    pub hours: Hours,
    pub minutes: Minutes,
    pub seconds: Seconds,
    /// Remaining countdown time; can dip below zero on the final tick
    pub remaining_ms: i64,
    /// Clock reading taken when the countdown was started
    pub scheduled_at_ms: Option<i64>,
}

impl TimerContext {
    /// Create a context from explicit field values, with remaining time
    /// derived from them
    pub fn from_fields(hours: Hours, minutes: Minutes, seconds: Seconds) -> Self {
        let mut context = Self {
            hours,
            minutes,
            seconds,
            remaining_ms: 0,
            scheduled_at_ms: None,
        };
        context.recompute_remaining();
        context
    }

    /// Sum of the three fields in milliseconds
    pub fn total_ms(&self) -> i64 {
        self.hours.to_milliseconds() + self.minutes.to_milliseconds() + self.seconds.to_milliseconds()
    }

    pub fn recompute_remaining(&mut self) {
        self.remaining_ms = self.total_ms();
    }

    /// True if at least one field is above its minimum
    pub fn has_time(&self) -> bool {
        !(self.hours.is_min() && self.minutes.is_min() && self.seconds.is_min())
    }

    pub fn has_elapsed(&self) -> bool {
        self.remaining_ms <= 0
    }
}

/// Format milliseconds as `HH:MM:SS`, rounding partial seconds up and
/// flooring negative values at zero
pub fn format_clock(ms: i64) -> String {
    let total_seconds = ms.max(0).saturating_add(999) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
