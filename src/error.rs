//! Motion and gameplay error types.
//!
//! Physics edge cases (aligned axes, degenerate cross products, vanished
//! connected bodies) are never errors: they are guarded numerically and
//! treated as no-ops. The variants here cover configuration preconditions
//! only, which are rejected once, up front, when a joint or helper is built.
//!
//! ## Usage
//!
//! ```rust
//! use ragdoll_arena::error::MotionResult;
//! use ragdoll_arena::joint::{DirectionalJoint, JointConfig};
//!
//! fn build_neck() -> MotionResult<DirectionalJoint> {
//!     DirectionalJoint::new(JointConfig::default(), None)
//! }
//! # build_neck().unwrap();
//! ```

use std::fmt;

/// Top-level error enum for the motion layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A spring-mode joint was configured with `min_length_ratio > max_length_ratio`
    /// or with a negative / non-finite ratio.
    InvalidLengthRatio {
        /// Configured minimum length ratio.
        min: f32,
        /// Configured maximum length ratio.
        max: f32,
    },

    /// An angle clamp range is outside `(-360, 360)` or spans a non-positive
    /// or full-turn interval.
    InvalidAngleRange {
        /// Lower bound in degrees.
        min: f32,
        /// Upper bound in degrees.
        max: f32,
    },

    /// Tunable value is outside its safe operating range.
    UnsafeConstant {
        /// Name of the value (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidLengthRatio { min, max } => write!(
                f,
                "joint length ratios invalid: min {} must be finite, non-negative and ≤ max {}",
                min, max
            ),
            MotionError::InvalidAngleRange { min, max } => write!(
                f,
                "angle range [{}, {}] must lie inside (-360, 360) and span less than a full turn",
                min, max
            ),
            MotionError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for MotionError {}

/// Convenience alias: a `Result` using `MotionError` as the error type.
pub type MotionResult<T> = Result<T, MotionError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `0 <= min <= max` and both are finite.
pub fn validate_length_ratios(min: f32, max: f32) -> MotionResult<()> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
        Err(MotionError::InvalidLengthRatio { min, max })
    } else {
        Ok(())
    }
}

/// Returns an error if the spawner speed-up factor would stall or never ramp.
///
/// Factors at or above 1.0 never shorten the spawn interval; zero or below
/// collapses it to zero after the first spawn.
pub fn validate_spawn_speedup(value: f32) -> MotionResult<()> {
    if value <= 0.0 || value > 1.0 {
        Err(MotionError::UnsafeConstant {
            name: "SPAWN_SPEEDUP",
            value,
            safe_range: "(0.0, 1.0]",
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ratios_are_valid() {
        assert!(validate_length_ratios(1.0, 1.0).is_ok());
        assert!(validate_length_ratios(0.5, 2.0).is_ok());
    }

    #[test]
    fn inverted_ratios_are_rejected() {
        assert_eq!(
            validate_length_ratios(2.0, 1.0),
            Err(MotionError::InvalidLengthRatio { min: 2.0, max: 1.0 })
        );
        assert!(validate_length_ratios(-0.1, 1.0).is_err());
        assert!(validate_length_ratios(f32::NAN, 1.0).is_err());
    }

    #[test]
    fn speedup_range() {
        assert!(validate_spawn_speedup(0.9).is_ok());
        assert!(validate_spawn_speedup(1.5).is_err());
        assert!(validate_spawn_speedup(0.0).is_err());
    }

    #[test]
    fn display_mentions_the_values() {
        let msg = MotionError::InvalidLengthRatio { min: 2.0, max: 1.0 }.to_string();
        assert!(msg.contains('2') && msg.contains('1'));
    }
}
