//! Workout timer state machine
//!
//! The engine is synchronous and owns no clock. The tick source and the
//! countdown sequence drive it from outside; every transition returns the
//! cues the caller should play once it has released the engine.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audio::Cue;
use super::{DerivedStats, Phase, WorkoutConfig, WorkoutState};

/// Result of asking the engine to start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Countdown registered under this generation; commit it when the
    /// countdown completes
    Pending(u64),
    /// Countdown finished and the engine is running
    Started,
    /// A stop or reset arrived during the countdown
    Cancelled,
    AlreadyRunning,
    AlreadyStarting,
    /// Workout already complete (or has no sets); reset first
    NothingToDo,
}

/// Read-only copy of everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSnapshot {
    pub config: WorkoutConfig,
    pub state: WorkoutState,
    pub phase: Phase,
    pub stats: DerivedStats,
    pub starting: bool,
}

#[derive(Debug, Clone)]
pub struct WorkoutEngine {
    config: WorkoutConfig,
    state: WorkoutState,
    stats: DerivedStats,
    /// Incremented on every accepted start request
    generation: u64,
    /// Generation of the countdown currently in flight, if any
    pending_start: Option<u64>,
}

impl WorkoutEngine {
    pub fn new(config: WorkoutConfig) -> Self {
        Self {
            config,
            state: WorkoutState::new(config.jump_duration_seconds),
            stats: DerivedStats::from_config(&config),
            generation: 0,
            pending_start: None,
        }
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    pub fn stats(&self) -> &DerivedStats {
        &self.stats
    }

    pub fn phase(&self) -> Phase {
        self.state.phase(self.config.total_sets)
    }

    /// Whether a countdown is in flight
    pub fn is_starting(&self) -> bool {
        self.pending_start.is_some()
    }

    pub fn snapshot(&self) -> WorkoutSnapshot {
        WorkoutSnapshot {
            config: self.config,
            state: self.state.clone(),
            phase: self.phase(),
            stats: self.stats,
            starting: self.is_starting(),
        }
    }

    /// Register a start request. The caller plays the countdown and then
    /// calls [`commit_start`](Self::commit_start) with the returned generation.
    pub fn begin_start(&mut self) -> StartOutcome {
        if self.state.is_running {
            return StartOutcome::AlreadyRunning;
        }
        if self.pending_start.is_some() {
            return StartOutcome::AlreadyStarting;
        }
        if self.config.total_sets == 0 || self.state.completed_sets >= self.config.total_sets {
            return StartOutcome::NothingToDo;
        }

        self.generation += 1;
        self.pending_start = Some(self.generation);
        debug!("Start requested, countdown generation {}", self.generation);
        StartOutcome::Pending(self.generation)
    }

    /// Flip to running if `generation` is still the pending start.
    /// Returns the cues of any phase boundary that is already due.
    pub fn commit_start(&mut self, generation: u64) -> Option<Vec<Cue>> {
        if self.pending_start != Some(generation) {
            debug!("Dropping stale start for generation {}", generation);
            return None;
        }

        self.pending_start = None;
        self.state.is_running = true;
        info!(
            "Workout running: {} with {}s remaining, {}/{} sets done",
            self.phase().as_str(),
            self.state.remaining_seconds,
            self.state.completed_sets,
            self.config.total_sets
        );
        Some(self.settle())
    }

    /// Pause the countdown and cancel any pending start
    pub fn stop(&mut self) {
        if self.pending_start.take().is_some() {
            debug!("Pending start cancelled");
        }
        self.state.is_running = false;
    }

    pub fn reset(&mut self) {
        self.pending_start = None;
        self.state = WorkoutState::new(self.config.jump_duration_seconds);
    }

    /// Advance one second. Ticks that arrive while stopped are ignored.
    pub fn tick(&mut self) -> Vec<Cue> {
        if !self.state.is_running {
            return Vec::new();
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        self.settle()
    }

    /// Apply every phase boundary that is due at `remaining_seconds == 0`.
    /// Zero-length phases chain within the same call. Each cue kind is
    /// reported at most once, and `Finish` replaces everything else.
    fn settle(&mut self) -> Vec<Cue> {
        let mut cues = Vec::new();

        while self.state.is_running && self.state.remaining_seconds == 0 {
            if self.state.is_resting {
                self.state.is_resting = false;
                self.state.remaining_seconds = self.config.jump_duration_seconds;
                debug!("Rest over, set {} begins", self.state.completed_sets + 1);
                push_cue(&mut cues, Cue::Start);
            } else {
                if self.config.jump_duration_seconds == 0 && self.config.rest_duration_seconds == 0 {
                    // Nothing left to count down, skip to the last set
                    self.state.completed_sets = self.config.total_sets.saturating_sub(1);
                }
                self.state.completed_sets += 1;
                if self.state.completed_sets >= self.config.total_sets {
                    self.state.is_running = false;
                    self.state.is_resting = false;
                    info!("Workout finished after {} sets", self.state.completed_sets);
                    return vec![Cue::Finish];
                } else {
                    self.state.is_resting = true;
                    self.state.remaining_seconds = self.config.rest_duration_seconds;
                    debug!(
                        "Set {}/{} finished, resting {}s",
                        self.state.completed_sets, self.config.total_sets, self.config.rest_duration_seconds
                    );
                    push_cue(&mut cues, Cue::Beep);
                }
            }
        }

        cues
    }

    /// Change the jump duration. The live countdown restarts at the new
    /// value unless a rest phase is counting down.
    pub fn set_jump_duration(&mut self, seconds: u32) {
        self.config.jump_duration_seconds = seconds;
        if !self.state.is_resting {
            self.state.remaining_seconds = seconds;
        }
        self.recompute_stats();
    }

    /// Change the rest duration. A running rest countdown is clamped so it
    /// never exceeds the new length.
    pub fn set_rest_duration(&mut self, seconds: u32) {
        self.config.rest_duration_seconds = seconds;
        if self.state.is_resting && self.state.remaining_seconds > seconds {
            self.state.remaining_seconds = seconds;
        }
        self.recompute_stats();
    }

    /// Change the number of sets. Completed sets are clamped, and a
    /// workout in progress (running, starting or paused) whose remaining
    /// sets disappear ends in the same state a natural finish leaves.
    pub fn set_total_sets(&mut self, sets: u32) {
        let in_progress = self.state.is_running
            || self.pending_start.is_some()
            || self.state.is_resting
            || self.state.completed_sets > 0;

        self.config.total_sets = sets;
        if self.state.completed_sets > sets {
            self.state.completed_sets = sets;
        }
        if in_progress && self.state.completed_sets >= sets {
            info!("Set count lowered to {}, workout complete", sets);
            self.pending_start = None;
            self.state.is_running = false;
            self.state.is_resting = false;
            self.state.remaining_seconds = 0;
        }
        self.recompute_stats();
    }

    fn recompute_stats(&mut self) {
        self.stats = DerivedStats::from_config(&self.config);
    }
}

fn push_cue(cues: &mut Vec<Cue>, cue: Cue) {
    if !cues.contains(&cue) {
        cues.push(cue);
    }
}

impl Default for WorkoutEngine {
    fn default() -> Self {
        Self::new(WorkoutConfig::default())
    }
}
