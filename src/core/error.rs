//! Error types for estimator configuration.
//!
//! Only configuration can fail. Sends, acks and timeout queries are total.

use thiserror::Error;

/// Errors raised when a configuration value violates its bounds.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Mean-deviation filter gain outside `(0, 1)`.
    #[error("filter gain must be in (0, 1), got {0}")]
    GainOutOfRange(f64),

    /// Marking-fraction weight `g` outside `(0, 1)`.
    #[error("marking weight g must be in (0, 1), got {0}")]
    MarkingWeightOutOfRange(f64),

    /// Initial marking fraction outside `[0, 1]`.
    #[error("initial alpha must be in [0, 1], got {0}")]
    AlphaOutOfRange(f64),

    /// Backoff ceiling of zero.
    #[error("max multiplier must be at least 1")]
    ZeroMaxMultiplier,

    /// RFC 6298 smoothing weight outside `(0, 1)`.
    #[error("{name} must be in (0, 1), got {value}")]
    SmoothingWeightOutOfRange {
        /// Which weight was rejected.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// RFC 6298 variance factor `K` of zero.
    #[error("variance factor K must be at least 1")]
    ZeroRtoFactor,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Check that `value` lies strictly between 0 and 1.
pub(crate) fn open_unit(value: f64) -> bool {
    value > 0.0 && value < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_unit_bounds() {
        assert!(open_unit(0.5));
        assert!(!open_unit(0.0));
        assert!(!open_unit(1.0));
        assert!(!open_unit(f64::NAN));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::SmoothingWeightOutOfRange {
            name: "beta",
            value: 1.5,
        };
        assert_eq!(err.to_string(), "beta must be in (0, 1), got 1.5");
        assert_eq!(
            ConfigError::GainOutOfRange(0.0).to_string(),
            "filter gain must be in (0, 1), got 0"
        );
    }
}
