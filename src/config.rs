//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::timer::MachineFeatures;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "countdown-timer")]
#[command(about = "A state-machine driven countdown timer service")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File the running countdown is saved to
    #[arg(long, default_value = "countdown-timer.json")]
    pub state_file: PathBuf,

    /// Do not save or restore countdowns
    #[arg(long)]
    pub no_persistence: bool,

    /// Disable stop, continue and restart
    #[arg(long)]
    pub no_stop_resume: bool,

    /// Command played when a countdown starts (terminal bell if unset)
    #[arg(long, value_name = "CMD")]
    pub start_sound: Option<String>,

    /// Command played when a countdown finishes (terminal bell if unset)
    #[arg(long, value_name = "CMD")]
    pub finish_sound: Option<String>,

    /// Milliseconds between ticks
    #[arg(long, default_value = "1000", hide = true)]
    pub tick_interval_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn features(&self) -> MachineFeatures {
        MachineFeatures {
            with_persistence: !self.no_persistence,
            with_stop_resume: !self.no_stop_resume,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
