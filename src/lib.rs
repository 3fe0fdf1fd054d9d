//! Countdown Timer - A state-machine driven countdown timer service
//!
//! This library provides the timer state machine, its persistence adapter,
//! the runtime that executes its side effects, and an HTTP surface for
//! presentation clients.

pub mod api;
pub mod config;
pub mod persistence;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use timer::{TimerEvent, TimerMachine, TimerState};
pub use utils::signals::shutdown_signal;
