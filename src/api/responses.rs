//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    state::{DerivedStats, Phase, WorkoutConfig, WorkoutSnapshot, WorkoutState},
    utils::{format_clock, percent},
};

/// Remaining seconds at or below which the countdown is in its final stretch
pub const FINAL_SECONDS_THRESHOLD: u32 = 5;

/// Body of a configuration edit. The value may be a number or raw text
/// from an input field; either is normalized before use.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigEdit {
    #[serde(default)]
    pub value: Value,
}

/// Values a client needs to render the timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayValues {
    pub clock: String,
    pub total_workout_clock: String,
    pub phase_progress_percent: f64,
    pub set_progress_percent: f64,
    pub final_seconds: bool,
    pub message: String,
}

impl DisplayValues {
    pub fn from_snapshot(snapshot: &WorkoutSnapshot) -> Self {
        let state = &snapshot.state;
        let phase_duration = if state.is_resting {
            snapshot.config.rest_duration_seconds
        } else {
            snapshot.config.jump_duration_seconds
        };
        let elapsed = phase_duration.saturating_sub(state.remaining_seconds);

        let message = if snapshot.starting {
            "Get ready..."
        } else {
            snapshot.phase.message()
        };

        Self {
            clock: format_clock(u64::from(state.remaining_seconds)),
            total_workout_clock: format_clock(snapshot.stats.total_workout_seconds),
            phase_progress_percent: percent(u64::from(elapsed), u64::from(phase_duration)),
            set_progress_percent: percent(
                u64::from(state.completed_sets),
                u64::from(snapshot.config.total_sets),
            ),
            final_seconds: state.is_running && state.remaining_seconds <= FINAL_SECONDS_THRESHOLD,
            message: message.to_string(),
        }
    }
}

/// Workout as presented to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutView {
    pub config: WorkoutConfig,
    pub state: WorkoutState,
    pub phase: Phase,
    pub starting: bool,
    pub stats: DerivedStats,
    pub display: DisplayValues,
}

impl From<WorkoutSnapshot> for WorkoutView {
    fn from(snapshot: WorkoutSnapshot) -> Self {
        let display = DisplayValues::from_snapshot(&snapshot);
        Self {
            config: snapshot.config,
            state: snapshot.state,
            phase: snapshot.phase,
            starting: snapshot.starting,
            stats: snapshot.stats,
            display,
        }
    }
}

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub workout: WorkoutView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: impl Into<String>, snapshot: WorkoutSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            workout: snapshot.into(),
        }
    }

    /// The command changed the workout
    pub fn ok(message: impl Into<String>, snapshot: WorkoutSnapshot) -> Self {
        Self::new("ok", message, snapshot)
    }

    /// A start countdown is now playing
    pub fn starting(snapshot: WorkoutSnapshot) -> Self {
        Self::new("starting", "Countdown started", snapshot)
    }

    /// The command was valid but had nothing to do
    pub fn unchanged(message: impl Into<String>, snapshot: WorkoutSnapshot) -> Self {
        Self::new("unchanged", message, snapshot)
    }
}

/// Full status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub workout: WorkoutView,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WorkoutEngine;

    #[test]
    fn idle_display_values() {
        let display = DisplayValues::from_snapshot(&WorkoutEngine::default().snapshot());
        assert_eq!(display.clock, "0:40");
        assert_eq!(display.total_workout_clock, "11:10");
        assert_eq!(display.phase_progress_percent, 0.0);
        assert_eq!(display.set_progress_percent, 0.0);
        assert!(!display.final_seconds);
        assert_eq!(display.message, "Ready to start");
    }

    #[test]
    fn running_display_values() {
        let mut snapshot = WorkoutEngine::new(WorkoutConfig::new(10, 5, 4)).snapshot();
        snapshot.state.is_running = true;
        snapshot.state.is_resting = true;
        snapshot.state.remaining_seconds = 4;
        snapshot.state.completed_sets = 1;
        snapshot.phase = Phase::Resting;

        let display = DisplayValues::from_snapshot(&snapshot);
        assert_eq!(display.clock, "0:04");
        assert_eq!(display.phase_progress_percent, 20.0);
        assert_eq!(display.set_progress_percent, 25.0);
        assert!(display.final_seconds);
        assert_eq!(display.message, "Resting, get ready for the next round");
    }

    #[test]
    fn zero_length_phase_has_no_progress() {
        let snapshot = WorkoutEngine::new(WorkoutConfig::new(0, 0, 0)).snapshot();
        let display = DisplayValues::from_snapshot(&snapshot);
        assert_eq!(display.phase_progress_percent, 0.0);
        assert_eq!(display.set_progress_percent, 0.0);
    }
}
