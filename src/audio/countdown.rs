//! Pre-start countdown sequence

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::{Cue, CuePlayer};

/// Number of short pulses before the start cue
pub const COUNTDOWN_PULSES: u32 = 3;
/// Volume of the countdown pulses
pub const COUNTDOWN_PULSE_VOLUME: f32 = 0.5;
/// Gap between consecutive countdown cues
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// Play three pulses one second apart, then the start cue one second later.
/// Resolves right after the start cue is dispatched.
pub async fn play_countdown_sequence(player: &dyn CuePlayer) {
    for remaining in (1..=COUNTDOWN_PULSES).rev() {
        sleep(COUNTDOWN_STEP).await;
        debug!("Countdown: {}", remaining);
        player.play_cue(Cue::Beep, COUNTDOWN_PULSE_VOLUME);
    }

    sleep(COUNTDOWN_STEP).await;
    player.play_cue(Cue::Start, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::recording::RecordingCuePlayer;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn countdown_plays_pulses_then_start() {
        let player = RecordingCuePlayer::default();
        let began = Instant::now();

        play_countdown_sequence(&player).await;

        let elapsed = began.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_millis(4100));
        assert_eq!(
            player.played(),
            vec![
                (Cue::Beep, 0.5),
                (Cue::Beep, 0.5),
                (Cue::Beep, 0.5),
                (Cue::Start, 1.0),
            ]
        );
    }
}
