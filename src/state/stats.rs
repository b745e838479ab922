//! Statistics derived from the workout configuration

use serde::{Deserialize, Serialize};

use super::WorkoutConfig;

/// Calories burned per minute of jumping
pub const CALORIES_PER_JUMP_MINUTE: f64 = 8.67;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub total_workout_seconds: u64,
    pub estimated_calories: u64,
}

impl DerivedStats {
    pub fn from_config(config: &WorkoutConfig) -> Self {
        let sets = u64::from(config.total_sets);
        let jump_seconds = sets * u64::from(config.jump_duration_seconds);
        let rest_seconds = sets.saturating_sub(1) * u64::from(config.rest_duration_seconds);

        Self {
            total_workout_seconds: jump_seconds + rest_seconds,
            estimated_calories: (jump_seconds as f64 / 60.0 * CALORIES_PER_JUMP_MINUTE).round() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_workout_stats() {
        let stats = DerivedStats::from_config(&WorkoutConfig::default());
        // 10 * 40 + 9 * 30
        assert_eq!(stats.total_workout_seconds, 670);
        // 400s = 6.67 min -> 57.8 kcal
        assert_eq!(stats.estimated_calories, 58);
    }

    #[test]
    fn stats_hold_across_configurations() {
        for sets in 1..=12u32 {
            for jump in [0u32, 1, 15, 40, 59, 60, 61, 300] {
                for rest in [0u32, 10, 45] {
                    let stats = DerivedStats::from_config(&WorkoutConfig::new(jump, rest, sets));
                    let expected_total = u64::from(sets * jump + (sets - 1) * rest);
                    let expected_calories =
                        (f64::from(sets * jump) / 60.0 * 8.67).round() as u64;
                    assert_eq!(stats.total_workout_seconds, expected_total);
                    assert_eq!(stats.estimated_calories, expected_calories);
                }
            }
        }
    }

    #[test]
    fn zero_sets_has_no_rest() {
        let stats = DerivedStats::from_config(&WorkoutConfig::new(40, 30, 0));
        assert_eq!(stats.total_workout_seconds, 0);
        assert_eq!(stats.estimated_calories, 0);
    }
}
