//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::state::{
    workout_config::{DEFAULT_JUMP_DURATION_SECONDS, DEFAULT_REST_DURATION_SECONDS, DEFAULT_TOTAL_SETS},
    WorkoutConfig,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "jumprope-timer")]
#[command(about = "A jump-rope interval timer with phase tracking and audio cues")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Length of one jump phase in seconds
    #[arg(short, long, default_value_t = DEFAULT_JUMP_DURATION_SECONDS)]
    pub jump: u32,

    /// Length of one rest phase in seconds
    #[arg(short, long, default_value_t = DEFAULT_REST_DURATION_SECONDS)]
    pub rest: u32,

    /// Number of sets in the workout
    #[arg(short, long, default_value_t = DEFAULT_TOTAL_SETS)]
    pub sets: u32,

    /// Directory holding beep.mp3, start.mp3 and finish.mp3
    #[arg(long, default_value = "sounds")]
    pub sounds_dir: PathBuf,

    /// Disable audio cues
    #[arg(short, long)]
    pub mute: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Initial workout configuration
    pub fn workout_config(&self) -> WorkoutConfig {
        WorkoutConfig::new(self.jump, self.rest, self.sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["jumprope-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.workout_config(), WorkoutConfig::default());
        assert!(!config.mute);
    }

    #[test]
    fn workout_flags() {
        let config = Config::try_parse_from([
            "jumprope-timer", "--jump", "20", "--rest", "15", "--sets", "6", "--mute", "-v",
        ])
        .unwrap();
        assert_eq!(config.workout_config(), WorkoutConfig::new(20, 15, 6));
        assert_eq!(config.log_level(), "debug");
        assert!(config.mute);
    }
}
