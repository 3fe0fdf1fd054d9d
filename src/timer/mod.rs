//! Timer core module
//!
//! Duration fields, the context they accumulate into, and the state machine
//! that drives the countdown.

pub mod context;
pub mod fields;
pub mod machine;
pub mod snapshot;

// Re-export main types
pub use context::TimerContext;
pub use fields::{Hours, Minutes, Seconds};
pub use machine::{
    transition, Effect, MachineFeatures, Outcome, PersistedSnapshot, TimerEvent, TimerMachine,
    TimerState, Transition,
};
pub use snapshot::TimerSnapshot;
