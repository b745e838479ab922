//! Live countdown state and the phase it reports

use serde::{Deserialize, Serialize};

/// Countdown state owned by the workout engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutState {
    /// Countdown remaining in the current phase
    pub remaining_seconds: u32,
    /// Whether the tick source is active
    pub is_running: bool,
    /// Current phase kind, `false` while jumping
    pub is_resting: bool,
    /// Jump phases finished so far
    pub completed_sets: u32,
}

impl WorkoutState {
    /// Create an idle state ready to count down a jump phase
    pub fn new(jump_duration_seconds: u32) -> Self {
        Self {
            remaining_seconds: jump_duration_seconds,
            is_running: false,
            is_resting: false,
            completed_sets: 0,
        }
    }

    /// Phase as seen from outside, given the configured set count
    pub fn phase(&self, total_sets: u32) -> Phase {
        match (self.is_running, self.is_resting) {
            (true, false) => Phase::Jumping,
            (true, true) => Phase::Resting,
            (false, _) if total_sets > 0 && self.completed_sets >= total_sets => Phase::Finished,
            (false, _) => Phase::Idle,
        }
    }
}

/// Externally reported workout phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Jumping,
    Resting,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Jumping => "jumping",
            Phase::Resting => "resting",
            Phase::Finished => "finished",
        }
    }

    /// Short status line for the phase
    pub fn message(&self) -> &'static str {
        match self {
            Phase::Idle => "Ready to start",
            Phase::Jumping => "Jumping, keep going!",
            Phase::Resting => "Resting, get ready for the next round",
            Phase::Finished => "Workout complete",
        }
    }
}
