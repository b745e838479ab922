//! Workout configuration and input normalization

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_JUMP_DURATION_SECONDS: u32 = 40;
pub const DEFAULT_REST_DURATION_SECONDS: u32 = 30;
pub const DEFAULT_TOTAL_SETS: u32 = 10;

/// User-editable workout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    /// Length of one jump phase
    pub jump_duration_seconds: u32,
    /// Length of one rest phase
    pub rest_duration_seconds: u32,
    /// Number of jump phases in a full workout
    pub total_sets: u32,
}

impl WorkoutConfig {
    pub fn new(jump_duration_seconds: u32, rest_duration_seconds: u32, total_sets: u32) -> Self {
        Self {
            jump_duration_seconds,
            rest_duration_seconds,
            total_sets,
        }
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_JUMP_DURATION_SECONDS,
            DEFAULT_REST_DURATION_SECONDS,
            DEFAULT_TOTAL_SETS,
        )
    }
}

/// Parse user text the way a numeric form field does: leading whitespace is
/// skipped, the longest integer prefix wins, anything else is zero.
///
/// Negative values are clamped to zero and oversized values saturate.
pub fn parse_count(input: &str) -> u32 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let prefix_len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if prefix_len == 0 || negative {
        return 0;
    }

    digits[..prefix_len]
        .bytes()
        .fold(0u32, |acc, b| acc.saturating_mul(10).saturating_add(u32::from(b - b'0')))
}

/// Normalize a JSON value submitted for a configuration field
pub fn coerce_count(value: &Value) -> u32 {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v.min(u64::from(u32::MAX)) as u32
            } else {
                // Negative integers and floats; `as` saturates and maps NaN to 0
                n.as_f64().map(|f| f.max(0.0).trunc() as u32).unwrap_or(0)
            }
        }
        Value::String(s) => parse_count(s),
        _ => 0,
    }
}
