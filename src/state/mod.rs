//! State management module
//!
//! This module contains the workout state machine, its configuration and
//! the shared application state that owns it.

pub mod workout_config;
pub mod workout_state;
pub mod stats;
pub mod engine;
pub mod app_state;

// Re-export main types
pub use workout_config::{coerce_count, parse_count, WorkoutConfig};
pub use workout_state::{Phase, WorkoutState};
pub use stats::DerivedStats;
pub use engine::{StartOutcome, WorkoutEngine, WorkoutSnapshot};
pub use app_state::AppState;
