//! One-second tick source for the workout engine

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Time consumed by one tick
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that ticks the workout once per second while it runs.
///
/// The timer is armed whenever the workout starts running and dropped as
/// soon as it stops, so no ticks accumulate while idle. The engine itself
/// ignores ticks that land after a stop.
pub async fn tick_timer_task(state: Arc<AppState>) {
    info!("Starting tick timer task");

    let mut state_rx = state.subscribe();

    loop {
        // Wait until the workout is running
        if state_rx.wait_for(|s| s.is_running).await.is_err() {
            warn!("Workout state channel closed, tick timer exiting");
            return;
        }

        debug!("Workout running, arming tick timer");
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.tick() {
                        Ok(true) => {}
                        Ok(false) => {
                            debug!("Workout no longer running after tick");
                            break;
                        }
                        Err(e) => {
                            error!("Failed to deliver tick: {}", e);
                        }
                    }
                }

                changed = state_rx.changed() => {
                    if changed.is_err() {
                        warn!("Workout state channel closed, tick timer exiting");
                        return;
                    }
                    if !state_rx.borrow_and_update().is_running {
                        debug!("Workout stopped, disarming tick timer");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    use crate::{
        audio::{recording::RecordingCuePlayer, Cue},
        state::{Phase, StartOutcome, WorkoutConfig},
    };

    fn app(config: WorkoutConfig) -> (Arc<AppState>, Arc<RecordingCuePlayer>) {
        let player = Arc::new(RecordingCuePlayer::default());
        let state = AppState::new(0, "127.0.0.1".to_string(), config, player.clone());
        (Arc::new(state), player)
    }

    #[tokio::test(start_paused = true)]
    async fn full_workout_on_paused_clock() {
        let (state, player) = app(WorkoutConfig::new(2, 1, 2));
        let ticker = tokio::spawn(tick_timer_task(Arc::clone(&state)));

        assert_eq!(state.start().await.unwrap(), StartOutcome::Started);

        // Halfway through the first rest phase
        sleep(Duration::from_millis(2500)).await;
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Resting);
        assert_eq!(snapshot.state.completed_sets, 1);

        // Rest (1s) and the second jump (2s) finish the workout
        sleep(Duration::from_secs(3)).await;
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Finished);
        assert_eq!(snapshot.state.completed_sets, 2);
        assert!(!snapshot.state.is_running);
        assert!(!snapshot.state.is_resting);

        assert_eq!(
            player.cues(),
            vec![
                Cue::Beep,
                Cue::Beep,
                Cue::Beep,
                Cue::Start,
                Cue::Beep,
                Cue::Start,
                Cue::Finish,
            ]
        );

        ticker.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_while_stopped() {
        let (state, _player) = app(WorkoutConfig::new(10, 5, 3));
        let ticker = tokio::spawn(tick_timer_task(Arc::clone(&state)));

        state.start().await.unwrap();
        sleep(Duration::from_millis(3500)).await;
        assert_eq!(state.snapshot().unwrap().state.remaining_seconds, 7);

        state.stop().unwrap();
        sleep(Duration::from_secs(30)).await;
        assert_eq!(state.snapshot().unwrap().state.remaining_seconds, 7);

        // Resuming re-arms the timer a full second after the countdown
        state.start().await.unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(state.snapshot().unwrap().state.remaining_seconds, 5);

        ticker.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn reset_mid_run_stops_ticking() {
        let (state, _player) = app(WorkoutConfig::new(10, 5, 3));
        let ticker = tokio::spawn(tick_timer_task(Arc::clone(&state)));

        state.start().await.unwrap();
        sleep(Duration::from_millis(4500)).await;
        state.reset().unwrap();

        sleep(Duration::from_secs(5)).await;
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.state.remaining_seconds, 10);

        ticker.abort();
    }
}
