//! Mean-deviation RTT filter.
//!
//! Van Jacobson and Michael J. Karels, "Congestion Avoidance and Control",
//! SIGCOMM 88, Appendix A:
//!
//! - First sample: `srtt = R`, `mdev = R / 2`
//! - Then, with `delta = R - srtt`:
//!   `srtt += gain * delta`, `mdev += gain * (|delta| - mdev)`
//! - Timeout: `srtt + 4 * mdev`
//!
//! The deviation is an absolute-value average, not a squared variance.

use std::time::Duration;

use crate::core::{
    ConfigError, ConfigResult, DEFAULT_MEAN_DEVIATION_GAIN, DEVIATION_FACTOR, open_unit,
};

use super::algorithm::{SmoothingAlgorithm, duration_from_secs};

/// Jacobson/Karels mean-deviation filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanDeviation {
    /// Filter gain, `0 < gain < 1`.
    gain: f64,
    /// Smoothed mean absolute deviation.
    variance: Duration,
}

impl Default for MeanDeviation {
    fn default() -> Self {
        Self {
            gain: DEFAULT_MEAN_DEVIATION_GAIN,
            variance: Duration::ZERO,
        }
    }
}

impl MeanDeviation {
    /// Create a filter with the given gain.
    pub fn with_gain(gain: f64) -> ConfigResult<Self> {
        let mut filter = Self::default();
        filter.set_gain(gain)?;
        Ok(filter)
    }

    /// Change the filter gain.
    pub fn set_gain(&mut self, gain: f64) -> ConfigResult<()> {
        if !open_unit(gain) {
            return Err(ConfigError::GainOutOfRange(gain));
        }
        self.gain = gain;
        Ok(())
    }

    /// Current filter gain.
    pub fn gain(&self) -> f64 {
        self.gain
    }
}

impl SmoothingAlgorithm for MeanDeviation {
    fn name(&self) -> &'static str {
        "mean-deviation"
    }

    fn measurement(&mut self, estimate: Duration, sample: Duration, first: bool) -> Duration {
        if first {
            self.variance = sample / 2;
            return sample;
        }

        let srtt = estimate.as_secs_f64();
        let delta = sample.as_secs_f64() - srtt;
        let mdev = self.variance.as_secs_f64();

        self.variance = duration_from_secs(mdev + self.gain * (delta.abs() - mdev));
        duration_from_secs(srtt + self.gain * delta)
    }

    fn timeout(&self, estimate: Duration) -> Duration {
        estimate.saturating_add(self.variance.saturating_mul(DEVIATION_FACTOR))
    }

    fn reset(&mut self) {
        self.variance = Duration::ZERO;
    }

    fn variance(&self) -> Duration {
        self.variance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Duration, expected_ms: f64) -> bool {
        (actual.as_secs_f64() * 1000.0 - expected_ms).abs() < 1e-3
    }

    #[test]
    fn test_first_sample_seeds_exactly() {
        let mut filter = MeanDeviation::default();
        let estimate = filter.measurement(Duration::from_secs(1), Duration::from_millis(100), true);

        assert_eq!(estimate, Duration::from_millis(100));
        assert_eq!(filter.variance(), Duration::from_millis(50));
    }

    #[test]
    fn test_subsequent_sample_moves_toward_sample() {
        let mut filter = MeanDeviation::default();
        let srtt = filter.measurement(Duration::ZERO, Duration::from_millis(100), true);

        // delta = 80, srtt = 100 + 10, mdev = 50 + (80 - 50) / 8
        let srtt = filter.measurement(srtt, Duration::from_millis(180), false);
        assert!(approx(srtt, 110.0));
        assert!(approx(filter.variance(), 53.75));

        // delta = -30, srtt = 110 - 3.75, mdev = 53.75 + (30 - 53.75) / 8
        let srtt = filter.measurement(srtt, Duration::from_millis(80), false);
        assert!(approx(srtt, 106.25));
        assert!(approx(filter.variance(), 50.78125));
    }

    #[test]
    fn test_steady_samples_shrink_deviation() {
        let mut filter = MeanDeviation::default();
        let mut srtt = filter.measurement(Duration::ZERO, Duration::from_millis(50), true);
        for _ in 0..200 {
            srtt = filter.measurement(srtt, Duration::from_millis(50), false);
        }
        assert!(approx(srtt, 50.0));
        assert!(filter.variance() < Duration::from_micros(1));
    }

    #[test]
    fn test_timeout_is_srtt_plus_four_deviations() {
        let mut filter = MeanDeviation::default();
        let srtt = filter.measurement(Duration::ZERO, Duration::from_millis(100), true);
        assert_eq!(filter.timeout(srtt), Duration::from_millis(300));
    }

    #[test]
    fn test_gain_bounds() {
        assert!(MeanDeviation::with_gain(0.25).is_ok());
        assert_eq!(
            MeanDeviation::with_gain(0.0),
            Err(ConfigError::GainOutOfRange(0.0))
        );
        let mut filter = MeanDeviation::default();
        assert!(filter.set_gain(-0.5).is_err());
        assert_eq!(filter.gain(), DEFAULT_MEAN_DEVIATION_GAIN);
    }

    #[test]
    fn test_custom_gain() {
        let mut filter = MeanDeviation::with_gain(0.5).unwrap();
        let srtt = filter.measurement(Duration::ZERO, Duration::from_millis(100), true);
        let srtt = filter.measurement(srtt, Duration::from_millis(200), false);
        assert!(approx(srtt, 150.0));
        assert!(approx(filter.variance(), 75.0));
    }

    #[test]
    fn test_reset_clears_variance() {
        let mut filter = MeanDeviation::default();
        filter.measurement(Duration::ZERO, Duration::from_millis(100), true);
        filter.reset();
        assert_eq!(filter.variance(), Duration::ZERO);
        assert_eq!(filter.timeout(Duration::from_millis(10)), Duration::from_millis(10));
    }
}
