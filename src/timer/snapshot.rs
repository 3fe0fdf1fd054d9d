//! Presentation view of the machine

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::context::format_clock;
use super::machine::{MachineFeatures, TimerMachine, TimerState};

/// Everything a renderer needs to draw the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub remaining_ms: i64,
    /// Remaining time as `HH:MM:SS`
    pub remaining: String,
    pub scheduled_at_ms: Option<i64>,
    /// Local clock time the countdown will end at, if it has time left
    pub estimated_finish: Option<String>,
    /// Window/document title matching the current state
    pub title: String,
    pub features: MachineFeatures,
}

impl TimerSnapshot {
    pub fn capture(machine: &TimerMachine, now_ms: i64) -> Self {
        let state = machine.state();
        let context = machine.context();
        let remaining = format_clock(context.remaining_ms);

        let estimated_finish = if context.remaining_ms > 0 && state != TimerState::Finished {
            DateTime::from_timestamp_millis(now_ms.saturating_add(context.remaining_ms))
                .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
        } else {
            None
        };

        let title = match state {
            TimerState::Idle => "Timer".to_string(),
            TimerState::Working => format!("{} - Timer", remaining),
            TimerState::Stopped => format!("Paused {} - Timer", remaining),
            TimerState::Finished => "Finished - Timer".to_string(),
        };

        Self {
            state,
            hours: context.hours.value(),
            minutes: context.minutes.value(),
            seconds: context.seconds.value(),
            remaining_ms: context.remaining_ms,
            remaining,
            scheduled_at_ms: context.scheduled_at_ms,
            estimated_finish,
            title,
            features: machine.features(),
        }
    }
}
