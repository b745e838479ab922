//! Audio cue player collaborator
//!
//! The workout engine only names the cue to play; loading, caching and
//! playback live here.

pub mod countdown;
pub mod cue_player;

// Re-export main types
pub use countdown::play_countdown_sequence;
pub use cue_player::{Cue, CuePlayer, RodioCuePlayer, SilentCuePlayer};

#[cfg(test)]
pub(crate) use cue_player::recording;
