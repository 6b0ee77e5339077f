//! Pluggable RTT smoothing.
//!
//! The estimator core owns matching, backoff and the current estimate; a
//! [`SmoothingAlgorithm`] only decides how a sample moves the estimate and
//! how large the unscaled timeout is. [`Algorithm`] closes the set of
//! variants so one estimator type can be configured at runtime.

use std::fmt;
use std::time::Duration;

use crate::core::{ConfigResult, DEFAULT_MEAN_DEVIATION_GAIN};

use super::mean_deviation::MeanDeviation;
#[cfg(feature = "rfc6298")]
use super::rfc6298::Rfc6298;
#[cfg(feature = "rfc6298")]
use crate::core::{DEFAULT_CLOCK_GRANULARITY, RTO_K, RTTVAR_BETA, SRTT_ALPHA};

/// Smoothing filter driven by the estimator core.
pub trait SmoothingAlgorithm: fmt::Debug + Clone {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fold `sample` into the smoothed estimate and return the new estimate.
    ///
    /// `first` is set for the first sample since construction or reset; the
    /// algorithm must then seed its state from the sample alone.
    fn measurement(&mut self, estimate: Duration, sample: Duration, first: bool) -> Duration;

    /// Timeout for `estimate`, before the RTO floor and backoff multiplier.
    fn timeout(&self, estimate: Duration) -> Duration;

    /// Return algorithm-specific state to its initial value.
    fn reset(&mut self);

    /// Current smoothed deviation.
    fn variance(&self) -> Duration;
}

/// The available smoothing filters.
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    /// Jacobson/Karels mean-deviation filter.
    MeanDeviation(MeanDeviation),
    /// RFC 6298 filter with separate SRTT and RTTVAR weights.
    #[cfg(feature = "rfc6298")]
    Rfc6298(Rfc6298),
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::MeanDeviation(MeanDeviation::default())
    }
}

impl From<MeanDeviation> for Algorithm {
    fn from(inner: MeanDeviation) -> Self {
        Algorithm::MeanDeviation(inner)
    }
}

#[cfg(feature = "rfc6298")]
impl From<Rfc6298> for Algorithm {
    fn from(inner: Rfc6298) -> Self {
        Algorithm::Rfc6298(inner)
    }
}

impl SmoothingAlgorithm for Algorithm {
    fn name(&self) -> &'static str {
        match self {
            Algorithm::MeanDeviation(inner) => inner.name(),
            #[cfg(feature = "rfc6298")]
            Algorithm::Rfc6298(inner) => inner.name(),
        }
    }

    fn measurement(&mut self, estimate: Duration, sample: Duration, first: bool) -> Duration {
        match self {
            Algorithm::MeanDeviation(inner) => inner.measurement(estimate, sample, first),
            #[cfg(feature = "rfc6298")]
            Algorithm::Rfc6298(inner) => inner.measurement(estimate, sample, first),
        }
    }

    fn timeout(&self, estimate: Duration) -> Duration {
        match self {
            Algorithm::MeanDeviation(inner) => inner.timeout(estimate),
            #[cfg(feature = "rfc6298")]
            Algorithm::Rfc6298(inner) => inner.timeout(estimate),
        }
    }

    fn reset(&mut self) {
        match self {
            Algorithm::MeanDeviation(inner) => inner.reset(),
            #[cfg(feature = "rfc6298")]
            Algorithm::Rfc6298(inner) => inner.reset(),
        }
    }

    fn variance(&self) -> Duration {
        match self {
            Algorithm::MeanDeviation(inner) => inner.variance(),
            #[cfg(feature = "rfc6298")]
            Algorithm::Rfc6298(inner) => inner.variance(),
        }
    }
}

/// Selection and tuning of a smoothing filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum AlgorithmConfig {
    /// Jacobson/Karels mean-deviation filter.
    MeanDeviation {
        /// Filter gain, `0 < gain < 1`.
        gain: f64,
    },
    /// RFC 6298 filter.
    #[cfg(feature = "rfc6298")]
    Rfc6298 {
        /// SRTT weight, `0 < alpha < 1`.
        alpha: f64,
        /// RTTVAR weight, `0 < beta < 1`.
        beta: f64,
        /// Variance factor in `srtt + max(G, K * rttvar)`.
        k: u32,
        /// Clock granularity `G`.
        granularity: Duration,
    },
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        AlgorithmConfig::MeanDeviation {
            gain: DEFAULT_MEAN_DEVIATION_GAIN,
        }
    }
}

impl AlgorithmConfig {
    /// RFC 6298 filter with the RFC's recommended constants.
    #[cfg(feature = "rfc6298")]
    pub fn rfc6298() -> Self {
        AlgorithmConfig::Rfc6298 {
            alpha: SRTT_ALPHA,
            beta: RTTVAR_BETA,
            k: RTO_K,
            granularity: DEFAULT_CLOCK_GRANULARITY,
        }
    }

    /// Validate the parameters and build the filter.
    pub fn build(&self) -> ConfigResult<Algorithm> {
        match *self {
            AlgorithmConfig::MeanDeviation { gain } => {
                MeanDeviation::with_gain(gain).map(Algorithm::from)
            }
            #[cfg(feature = "rfc6298")]
            AlgorithmConfig::Rfc6298 {
                alpha,
                beta,
                k,
                granularity,
            } => Rfc6298::with_weights(alpha, beta, k, granularity).map(Algorithm::from),
        }
    }
}

/// Convert fractional seconds to a `Duration`, clamping negatives to zero.
pub(crate) fn duration_from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}
