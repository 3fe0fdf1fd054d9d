//! External collaborator module
//!
//! This module contains the clock and the sound notifier the timer talks to.

pub mod clock;
pub mod notifier;

// Re-export main types
pub use clock::{Clock, FixedClock, SystemClock};
pub use notifier::{BellNotifier, CommandNotifier, Notifier};
