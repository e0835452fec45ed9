//! Error types for registration and configuration.
//!
//! Runtime failures (missed intersections, stalled tweens, stale handles) are never
//! errors: they are healed by the safety net or ignored. Only malformed options are
//! reported, at registration time.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RevealError {
    /// A duration, delay, stagger or timeout that is negative or not finite.
    #[error("invalid {field}: {value} (expected a finite, non-negative number of seconds)")]
    InvalidTime { field: String, value: f32 },

    /// Intersection thresholds and viewport fractions live in [0, 1].
    #[error("invalid {field}: {value} (expected a value in [0, 1])")]
    InvalidFraction { field: String, value: f32 },

    #[error("invalid parallax speed: {value}")]
    InvalidSpeed { value: f32 },

    #[error("reveal group has no elements")]
    EmptyGroup,

    #[error("element {element:?} is already registered")]
    DuplicateElement { element: String },

    #[error("config parse error: {reason}")]
    Config { reason: String },
}

pub type Result<T> = std::result::Result<T, RevealError>;

pub(crate) fn check_time(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RevealError::InvalidTime {
            field: field.to_string(),
            value,
        })
    }
}

pub(crate) fn check_fraction(field: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RevealError::InvalidFraction {
            field: field.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_checks_reject_nan_and_negative() {
        assert!(check_time("duration", 0.0).is_ok());
        assert!(check_time("duration", f32::NAN).is_err());
        assert_eq!(
            check_time("delay", -1.0),
            Err(RevealError::InvalidTime {
                field: "delay".into(),
                value: -1.0
            })
        );
    }

    #[test]
    fn fraction_bounds_are_inclusive() {
        assert!(check_fraction("threshold", 0.0).is_ok());
        assert!(check_fraction("threshold", 1.0).is_ok());
        assert!(check_fraction("threshold", 1.01).is_err());
        assert!(check_fraction("threshold", f32::NAN).is_err());
    }
}
