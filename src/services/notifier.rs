//! Sound notification
//!
//! Playback is fire-and-forget: the machine never waits on it and never
//! learns whether it worked.

use std::io::Write;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Audio side of the timer
pub trait Notifier: Send + Sync {
    fn play_start_sound(&self);
    fn play_completion_sound(&self);
}

/// Rings the terminal bell
#[derive(Debug, Clone, Copy, Default)]
pub struct BellNotifier;

impl BellNotifier {
    fn ring(&self) {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            debug!("Failed to ring terminal bell: {}", e);
        }
    }
}

impl Notifier for BellNotifier {
    fn play_start_sound(&self) {
        info!("Timer started");
        self.ring();
    }

    fn play_completion_sound(&self) {
        info!("Timer finished");
        self.ring();
    }
}

/// Runs an external player command, e.g. `paplay /usr/share/sounds/done.oga`
#[derive(Debug, Clone, Default)]
pub struct CommandNotifier {
    start: Option<Vec<String>>,
    finish: Option<Vec<String>>,
}

impl CommandNotifier {
    pub fn new(start: Option<&str>, finish: Option<&str>) -> Self {
        Self {
            start: start.and_then(split_command),
            finish: finish.and_then(split_command),
        }
    }

    fn spawn(&self, argv: Option<&Vec<String>>, label: &'static str) {
        let Some((program, args)) = argv.and_then(|argv| argv.split_first()) else {
            BellNotifier.ring();
            return;
        };

        let program = program.clone();
        let args = args.to_vec();
        debug!("Playing {} sound with {}", label, program);

        tokio::spawn(async move {
            match Command::new(&program).args(&args).output().await {
                Ok(output) if output.status.success() => {
                    debug!("{} sound played", label);
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("{} sound command failed: {}", label, stderr.trim());
                }
                Err(e) => {
                    warn!("Failed to execute {}: {}", program, e);
                }
            }
        });
    }
}

impl Notifier for CommandNotifier {
    fn play_start_sound(&self) {
        info!("Timer started");
        self.spawn(self.start.as_ref(), "start");
    }

    fn play_completion_sound(&self) {
        info!("Timer finished");
        self.spawn(self.finish.as_ref(), "completion");
    }
}

fn split_command(raw: &str) -> Option<Vec<String>> {
    let argv: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        None
    } else {
        Some(argv)
    }
}
