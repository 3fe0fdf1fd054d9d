//! Background tasks module
//!
//! This module contains the timer event loop and the tasks it spawns.

pub mod effect_runner;
pub mod event_loop;
pub mod ticker;

// Re-export main types and functions
pub use effect_runner::EffectRunner;
pub use event_loop::{timer_event_loop, Command, DispatchResult, TimerDriver};
pub use ticker::{start_ticker, TickerHandle};
