//! Error type shared by the engine layers.
//!
//! Only two things can go wrong inside the engine: the caller handed us numbers
//! that do not describe a place or a direction, or the ephemeris provider could
//! not produce a value. "Nothing visible tonight" is not an error; it is an
//! empty `Vec`.

use thiserror::Error;

/// Errors surfaced by engine entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisibilityError {
    /// Malformed coordinates, non-finite numbers or a zero sampling interval
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The ephemeris provider failed to compute a position or event time
    #[error("ephemeris failure: {0}")]
    Ephemeris(String),
}

pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<(), VisibilityError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(VisibilityError::InvalidInput(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

pub(crate) fn ensure_range(
    name: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), VisibilityError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(VisibilityError::InvalidInput(format!(
            "{name} {value} outside [{min}, {max}]"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObserverLocation, TargetCoordinates};

    #[test]
    fn test_observer_validation() {
        assert!(ObserverLocation::new(51.48, 0.0, 46.0).is_ok());
        assert!(ObserverLocation::new(-90.0, 180.0, -400.0).is_ok());

        let err = ObserverLocation::new(90.5, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, VisibilityError::InvalidInput(_)));
        assert!(ObserverLocation::new(0.0, -181.0, 0.0).is_err());
        assert!(ObserverLocation::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(ObserverLocation::new(0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_target_validation() {
        assert!(TargetCoordinates::new(0.0, -90.0).is_ok());
        assert!(TargetCoordinates::new(359.99, 90.0).is_ok());
        assert!(TargetCoordinates::new(360.0, 0.0).is_err());
        assert!(TargetCoordinates::new(-0.1, 0.0).is_err());
        assert!(TargetCoordinates::new(10.0, 90.1).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = VisibilityError::Ephemeris("rise/set search did not converge".to_string());
        assert_eq!(
            err.to_string(),
            "ephemeris failure: rise/set search did not converge"
        );
    }
}
