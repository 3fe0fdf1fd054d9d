//! Countdown Timer - A state-machine driven countdown timer service
//!
//! This is the main entry point for the countdown-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use countdown_timer::{
    api::create_router,
    config::Config,
    persistence::{FileStore, SnapshotStore},
    services::{Clock, CommandNotifier, Notifier, SystemClock},
    state::AppState,
    tasks::{timer_event_loop, TimerDriver},
    timer::TimerMachine,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    let features = config.features();
    info!(
        "Configuration: host={}, port={}, persistence={}, stop_resume={}",
        config.host, config.port, features.with_persistence, features.with_stop_resume
    );

    // Open the snapshot store and recover any saved countdown
    let snapshots = if features.with_persistence {
        match FileStore::open(&config.state_file) {
            Ok(store) => Some(SnapshotStore::new(Arc::new(store))),
            Err(e) => {
                warn!("{}; running without persistence", e);
                None
            }
        }
    } else {
        None
    };

    let machine = match snapshots.as_ref().and_then(SnapshotStore::restore) {
        Some(context) => TimerMachine::restored(features, context),
        None => TimerMachine::new(features),
    };

    let notifier: Arc<dyn Notifier> = Arc::new(CommandNotifier::new(
        config.start_sound.as_deref(),
        config.finish_sound.as_deref(),
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Start the timer event loop
    let (driver, commands, command_rx) = TimerDriver::new(machine, notifier, snapshots, clock, config.tick_interval());
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        commands,
        driver.subscribe(),
    ));
    tokio::spawn(timer_event_loop(driver, command_rx));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start     - Start the countdown");
    info!("  POST /timer/stop      - Pause the countdown");
    info!("  POST /timer/continue  - Resume a paused countdown");
    info!("  POST /timer/restart   - Restart from the entered duration");
    info!("  POST /timer/clear     - Reset the timer");
    info!("  PUT  /timer/{{hours,minutes,seconds}} - Set a duration field");
    info!("  GET  /status          - Current timer snapshot");
    info!("  GET  /health          - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
