//! Jump-rope timer - An interval timer service for jump-rope workouts
//! 
//! This library provides the workout state machine (jump and rest phases,
//! set counting, derived statistics), the tick source that drives it, audio
//! cues at phase transitions, and an HTTP API for the presentation layer.

pub mod config;
pub mod state;
pub mod audio;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
