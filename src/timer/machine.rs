//! Countdown state machine
//!
//! The transition function is pure: it takes the current state, context and
//! event and returns the next state, the next context and a list of effect
//! descriptors. Running the effects (sound, storage, ticker) is the job of
//! the caller, see [`crate::tasks::EffectRunner`].
//!
//! ```text
//! idle --START--> working --STOP--> stopped --CONTINUE--> working
//!                    |                  |
//!                    +--(elapsed)--> finished
//!  any --CLEAR--> idle
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::TimerContext;
use super::fields::{Hours, Minutes, Seconds};

/// Milliseconds removed from the countdown per tick
pub const TICK_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Working,
    Stopped,
    Finished,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Working => "working",
            TimerState::Stopped => "stopped",
            TimerState::Finished => "finished",
        }
    }
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events accepted by the machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    Start,
    Clear,
    Stop,
    Restart,
    Continue,
    UpdateHours(f64),
    UpdateMinutes(f64),
    UpdateSeconds(f64),
    /// Emitted by the ticker while working, never by users
    Tick,
}

impl TimerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Start => "START",
            TimerEvent::Clear => "CLEAR",
            TimerEvent::Stop => "STOP",
            TimerEvent::Restart => "RESTART",
            TimerEvent::Continue => "CONTINUE",
            TimerEvent::UpdateHours(_) => "UPDATE_HOURS",
            TimerEvent::UpdateMinutes(_) => "UPDATE_MINUTES",
            TimerEvent::UpdateSeconds(_) => "UPDATE_SECONDS",
            TimerEvent::Tick => "TICK",
        }
    }
}

/// Values written to the external store while a countdown is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub duration_ms: i64,
}

impl PersistedSnapshot {
    pub fn of(context: &TimerContext) -> Self {
        Self {
            hours: context.hours.value(),
            minutes: context.minutes.value(),
            seconds: context.seconds.value(),
            duration_ms: context.remaining_ms,
        }
    }
}

/// Side effects requested by a transition, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    PlayStartSound,
    PlayCompletionSound,
    PersistSnapshot(PersistedSnapshot),
    EraseSnapshot,
    StartTicker,
    StopTicker,
}

/// Optional behaviours that older, smaller variants of the timer lacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineFeatures {
    /// Mirror the running countdown into the external store
    pub with_persistence: bool,
    /// Accept STOP, CONTINUE and RESTART
    pub with_stop_resume: bool,
}

impl Default for MachineFeatures {
    fn default() -> Self {
        Self {
            with_persistence: true,
            with_stop_resume: true,
        }
    }
}

/// Result of a handled event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TimerState,
    pub context: TimerContext,
    pub effects: Vec<Effect>,
}

/// Compute the next state for `event`.
///
/// Returns `None` when the event has no transition from `state`, or when
/// its guard rejects it. `now_ms` is only read by START.
pub fn transition(
    state: TimerState,
    context: &TimerContext,
    event: &TimerEvent,
    features: MachineFeatures,
    now_ms: i64,
) -> Option<Transition> {
    let mut next = *context;
    let mut effects = Vec::new();

    let target = match (state, event) {
        (TimerState::Idle, TimerEvent::UpdateHours(raw)) => {
            next.hours = Hours::new(*raw);
            next.recompute_remaining();
            TimerState::Idle
        }
        (TimerState::Idle, TimerEvent::UpdateMinutes(raw)) => {
            next.minutes = Minutes::new(*raw);
            next.recompute_remaining();
            TimerState::Idle
        }
        (TimerState::Idle, TimerEvent::UpdateSeconds(raw)) => {
            next.seconds = Seconds::new(*raw);
            next.recompute_remaining();
            TimerState::Idle
        }
        (TimerState::Idle, TimerEvent::Start) => {
            if !can_start(context) {
                return None;
            }
            next.scheduled_at_ms = Some(now_ms);
            effects.push(Effect::PlayStartSound);
            TimerState::Working
        }
        (TimerState::Working, TimerEvent::Tick) => {
            next.remaining_ms -= TICK_MS;
            TimerState::Working
        }
        (TimerState::Working, TimerEvent::Stop) if features.with_stop_resume => {
            effects.push(Effect::StopTicker);
            TimerState::Stopped
        }
        (TimerState::Working, TimerEvent::Restart) if features.with_stop_resume => {
            next.recompute_remaining();
            effects.push(Effect::StopTicker);
            effects.push(Effect::PlayStartSound);
            TimerState::Working
        }
        (TimerState::Stopped, TimerEvent::Continue) if features.with_stop_resume => {
            TimerState::Working
        }
        (_, TimerEvent::Clear) => {
            if state == TimerState::Working {
                effects.push(Effect::StopTicker);
            }
            next = TimerContext::default();
            if features.with_persistence {
                effects.push(Effect::EraseSnapshot);
            }
            TimerState::Idle
        }
        _ => return None,
    };

    let target = if target == TimerState::Working && next.has_elapsed() {
        // Eventless priority transition out of working.
        if state == TimerState::Working && !effects.contains(&Effect::StopTicker) {
            effects.push(Effect::StopTicker);
        }
        effects.push(Effect::PlayCompletionSound);
        if features.with_persistence {
            effects.push(Effect::EraseSnapshot);
        }
        TimerState::Finished
    } else {
        // Entry actions for working; a TICK stays inside the state.
        if target == TimerState::Working && !matches!(event, TimerEvent::Tick) {
            effects.push(Effect::StartTicker);
            if features.with_persistence {
                effects.push(Effect::PersistSnapshot(PersistedSnapshot::of(&next)));
            }
        }
        target
    };

    Some(Transition {
        state: target,
        context: next,
        effects,
    })
}

/// START guard: some time entered and some time left to count
fn can_start(context: &TimerContext) -> bool {
    context.has_time() && context.remaining_ms > 0
}

/// Outcome of [`TimerMachine::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub handled: bool,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn ignored() -> Self {
        Self {
            handled: false,
            effects: Vec::new(),
        }
    }
}

/// Stateful wrapper around [`transition`]
#[derive(Debug, Clone)]
pub struct TimerMachine {
    state: TimerState,
    context: TimerContext,
    features: MachineFeatures,
}

impl TimerMachine {
    /// Create a machine in `idle` with default fields
    pub fn new(features: MachineFeatures) -> Self {
        Self::restored(features, TimerContext::default())
    }

    /// Create a machine in `idle` seeded with a recovered context.
    /// The countdown is never resumed automatically.
    pub fn restored(features: MachineFeatures, context: TimerContext) -> Self {
        Self {
            state: TimerState::Idle,
            context,
            features,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn context(&self) -> &TimerContext {
        &self.context
    }

    pub fn features(&self) -> MachineFeatures {
        self.features
    }

    /// Feed one event through the machine and apply the result
    pub fn send(&mut self, event: TimerEvent, now_ms: i64) -> Outcome {
        match transition(self.state, &self.context, &event, self.features, now_ms) {
            Some(Transition { state, context, effects }) => {
                self.state = state;
                self.context = context;
                Outcome { handled: true, effects }
            }
            None => {
                debug!("Ignoring {} in state {}", event.name(), self.state);
                Outcome::ignored()
            }
        }
    }
}
