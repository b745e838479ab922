//! Jump-rope timer - An interval timer service for jump-rope workouts
//!
//! This is the main entry point for the jumprope-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use jumprope_timer::{
    api::create_router,
    audio::{CuePlayer, RodioCuePlayer, SilentCuePlayer},
    config::Config,
    state::AppState,
    tasks::tick_timer_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("jumprope_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting jumprope-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Workout: jump={}s, rest={}s, sets={}",
          config.jump, config.rest, config.sets);

    // Audio failures are logged per cue and never stop the timer
    let player: Arc<dyn CuePlayer> = if config.mute {
        info!("Audio cues muted");
        Arc::new(SilentCuePlayer)
    } else {
        let player = RodioCuePlayer::new(config.sounds_dir.clone());
        info!("Loading cues from {}", player.sounds_dir().display());
        Arc::new(player)
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.workout_config(),
        player,
    ));

    // Start the tick source
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_timer_task(tick_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start                 - Countdown, then start the workout");
    info!("  POST /stop                  - Pause the workout");
    info!("  POST /toggle                - Start or stop");
    info!("  POST /reset                 - Reset to the first set");
    info!("  PUT  /config/jump-duration  - Set jump duration");
    info!("  PUT  /config/rest-duration  - Set rest duration");
    info!("  PUT  /config/total-sets     - Set number of sets");
    info!("  GET  /status                - Workout state and statistics");
    info!("  GET  /health                - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);
    let shutdown = async {
        match shutdown_signal().await {
            Ok(_) => info!("Shutdown signal received"),
            Err(e) => {
                // Keep serving; the process can still be killed
                tracing::error!("{}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown => {}
    }

    if let Err(e) = state.stop() {
        warn!("Failed to stop workout during shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
