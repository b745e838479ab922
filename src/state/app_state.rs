//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::audio::{play_countdown_sequence, Cue, CuePlayer};
use super::{StartOutcome, WorkoutConfig, WorkoutEngine, WorkoutSnapshot, WorkoutState};

/// Volume of cues played at phase transitions
pub const TRANSITION_CUE_VOLUME: f32 = 1.0;

/// Main application state: sole owner of the workout engine
#[derive(Debug)]
pub struct AppState {
    /// Workout engine; the lock is never held across an await
    engine: Mutex<WorkoutEngine>,
    /// Audio collaborator for transition cues and the countdown
    player: Arc<dyn CuePlayer>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Publishes the workout state after every change
    state_tx: watch::Sender<WorkoutState>,
}

impl AppState {
    /// Create a new AppState with an idle engine
    pub fn new(port: u16, host: String, config: WorkoutConfig, player: Arc<dyn CuePlayer>) -> Self {
        let engine = WorkoutEngine::new(config);
        let (state_tx, _) = watch::channel(engine.state().clone());

        Self {
            engine: Mutex::new(engine),
            player,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            state_tx,
        }
    }

    /// Subscribe to workout state changes
    pub fn subscribe(&self) -> watch::Receiver<WorkoutState> {
        self.state_tx.subscribe()
    }

    /// Run `updater` against the engine and publish the resulting state
    fn apply<F, R>(&self, updater: F) -> Result<R, String>
    where
        F: FnOnce(&mut WorkoutEngine) -> R,
    {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock workout engine: {}", e))?;

        let result = updater(&mut *engine);
        let new_state = engine.state().clone();
        drop(engine); // Release the lock early

        self.state_tx.send_replace(new_state);
        Ok(result)
    }

    /// Apply a user command and record it as the last action
    fn update_state<F, R>(&self, action: &str, updater: F) -> Result<R, String>
    where
        F: FnOnce(&mut WorkoutEngine) -> R,
    {
        let result = self.apply(updater)?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(result)
    }

    fn play_cues(&self, cues: &[Cue]) {
        for &cue in cues {
            self.player.play_cue(cue, TRANSITION_CUE_VOLUME);
        }
    }

    /// Get a copy of the current workout
    pub fn snapshot(&self) -> Result<WorkoutSnapshot, String> {
        self.engine.lock()
            .map(|engine| engine.snapshot())
            .map_err(|e| format!("Failed to lock workout engine: {}", e))
    }

    /// Register a start request without waiting for the countdown
    pub fn begin_start(&self) -> Result<StartOutcome, String> {
        let outcome = self.update_state("start", |engine| engine.begin_start())?;
        info!("Start requested: {:?}", outcome);
        Ok(outcome)
    }

    /// Play the countdown for `generation` and start running unless a stop
    /// or reset arrived in the meantime
    pub async fn complete_start(&self, generation: u64) -> Result<StartOutcome, String> {
        play_countdown_sequence(self.player.as_ref()).await;

        match self.apply(|engine| engine.commit_start(generation))? {
            Some(cues) => {
                self.play_cues(&cues);
                Ok(StartOutcome::Started)
            }
            None => {
                info!("Countdown {} was superseded, staying stopped", generation);
                Ok(StartOutcome::Cancelled)
            }
        }
    }

    /// Start the workout: countdown first, then running
    pub async fn start(&self) -> Result<StartOutcome, String> {
        match self.begin_start()? {
            StartOutcome::Pending(generation) => self.complete_start(generation).await,
            outcome => Ok(outcome),
        }
    }

    /// Stop the countdown, cancelling a pending start
    pub fn stop(&self) -> Result<WorkoutSnapshot, String> {
        info!("Stopping workout");
        self.update_state("stop", |engine| {
            engine.stop();
            engine.snapshot()
        })
    }

    /// Start if idle, stop otherwise. Returns the start outcome when a
    /// start was requested.
    pub fn toggle(&self) -> Result<Option<StartOutcome>, String> {
        let outcome = self.update_state("toggle", |engine| {
            if engine.state().is_running || engine.is_starting() {
                engine.stop();
                None
            } else {
                Some(engine.begin_start())
            }
        })?;
        info!("Toggle: {:?}", outcome);
        Ok(outcome)
    }

    pub fn reset(&self) -> Result<WorkoutSnapshot, String> {
        info!("Resetting workout");
        self.update_state("reset", |engine| {
            engine.reset();
            engine.snapshot()
        })
    }

    /// Deliver one tick. Returns whether the workout is still running.
    pub fn tick(&self) -> Result<bool, String> {
        let (cues, running) = self.apply(|engine| {
            let cues = engine.tick();
            (cues, engine.state().is_running)
        })?;

        if !cues.is_empty() {
            debug!("Tick produced cues: {:?}", cues);
        }
        self.play_cues(&cues);
        Ok(running)
    }

    pub fn set_jump_duration(&self, seconds: u32) -> Result<WorkoutSnapshot, String> {
        info!("Setting jump duration to: {}s", seconds);
        self.update_state("jump-duration", |engine| {
            engine.set_jump_duration(seconds);
            engine.snapshot()
        })
    }

    pub fn set_rest_duration(&self, seconds: u32) -> Result<WorkoutSnapshot, String> {
        info!("Setting rest duration to: {}s", seconds);
        self.update_state("rest-duration", |engine| {
            engine.set_rest_duration(seconds);
            engine.snapshot()
        })
    }

    pub fn set_total_sets(&self, sets: u32) -> Result<WorkoutSnapshot, String> {
        info!("Setting total sets to: {}", sets);
        self.update_state("total-sets", |engine| {
            engine.set_total_sets(sets);
            engine.snapshot()
        })
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    use crate::audio::recording::RecordingCuePlayer;
    use crate::state::Phase;

    fn app(config: WorkoutConfig) -> (Arc<AppState>, Arc<RecordingCuePlayer>) {
        let player = Arc::new(RecordingCuePlayer::default());
        let state = AppState::new(0, "127.0.0.1".to_string(), config, player.clone());
        (Arc::new(state), player)
    }

    #[tokio::test(start_paused = true)]
    async fn start_waits_for_countdown() {
        let (state, player) = app(WorkoutConfig::new(2, 1, 2));
        let began = tokio::time::Instant::now();

        assert_eq!(state.start().await.unwrap(), StartOutcome::Started);

        let elapsed = began.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_millis(4100));
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Jumping);
        assert_eq!(snapshot.state.remaining_seconds, 2);
        assert_eq!(player.cues(), vec![Cue::Beep, Cue::Beep, Cue::Beep, Cue::Start]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_countdown_wins() {
        let (state, _player) = app(WorkoutConfig::default());

        let starter = Arc::clone(&state);
        let pending = tokio::spawn(async move { starter.start().await });

        sleep(Duration::from_millis(1500)).await;
        assert!(state.snapshot().unwrap().starting);
        state.stop().unwrap();

        assert_eq!(pending.await.unwrap().unwrap(), StartOutcome::Cancelled);
        let snapshot = state.snapshot().unwrap();
        assert!(!snapshot.state.is_running);
        assert!(!snapshot.starting);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_countdown_does_not_hijack_restart() {
        let (state, _player) = app(WorkoutConfig::default());

        let first = Arc::clone(&state);
        let first = tokio::spawn(async move { first.start().await });
        sleep(Duration::from_millis(1500)).await;
        state.stop().unwrap();

        // Restart before the first countdown would have ended
        let StartOutcome::Pending(generation) = state.begin_start().unwrap() else {
            panic!("restart should be accepted");
        };
        let second = Arc::clone(&state);
        let second = tokio::spawn(async move { second.complete_start(generation).await });

        assert_eq!(first.await.unwrap().unwrap(), StartOutcome::Cancelled);
        assert!(!state.snapshot().unwrap().state.is_running);

        assert_eq!(second.await.unwrap().unwrap(), StartOutcome::Started);
        assert!(state.snapshot().unwrap().state.is_running);
    }

    #[tokio::test]
    async fn commands_record_last_action() {
        let (state, _player) = app(WorkoutConfig::default());
        assert_eq!(state.get_last_action(), (None, None));

        state.set_total_sets(4).unwrap();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("total-sets"));
        assert!(time.is_some());
    }

    #[tokio::test]
    async fn changes_are_published() {
        let (state, _player) = app(WorkoutConfig::default());
        let mut rx = state.subscribe();

        state.set_jump_duration(25).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().remaining_seconds, 25);
    }

    #[tokio::test]
    async fn transition_cues_reach_player() {
        let (state, player) = app(WorkoutConfig::new(1, 1, 2));
        let StartOutcome::Pending(generation) = state.begin_start().unwrap() else {
            panic!("start should be accepted");
        };
        state.apply(|engine| engine.commit_start(generation)).unwrap();

        assert!(state.tick().unwrap());
        assert!(state.tick().unwrap());
        assert!(!state.tick().unwrap());
        assert_eq!(player.played(), vec![(Cue::Beep, 1.0), (Cue::Start, 1.0), (Cue::Finish, 1.0)]);
    }

    #[tokio::test]
    async fn toggle_starts_then_stops() {
        let (state, _player) = app(WorkoutConfig::default());
        assert!(matches!(state.toggle().unwrap(), Some(StartOutcome::Pending(_))));
        assert!(state.snapshot().unwrap().starting);
        assert_eq!(state.toggle().unwrap(), None);
        assert!(!state.snapshot().unwrap().starting);
    }
}
