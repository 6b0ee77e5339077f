//! Estimator configuration.

use std::time::Duration;

use crate::core::{
    ConfigError, ConfigResult, DEFAULT_INITIAL_ESTIMATED_RTT, DEFAULT_MAX_MULTIPLIER,
    DEFAULT_MIN_RTO, SeqNum,
};

use super::marking::{MarkingConfig, MarkingInterval};

/// Tunables shared by every smoothing algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EstimatorConfig {
    /// Floor on every retransmission timeout.
    pub min_rto: Duration,
    /// Estimate before the first sample and after a reset.
    pub initial_estimated_rtt: Duration,
    /// Ceiling on the backoff multiplier.
    pub max_multiplier: u16,
    /// First sequence number the sender will use.
    pub initial_seq: SeqNum,
    /// Marking-fraction filter.
    pub marking: MarkingConfig,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_rto: DEFAULT_MIN_RTO,
            initial_estimated_rtt: DEFAULT_INITIAL_ESTIMATED_RTT,
            max_multiplier: DEFAULT_MAX_MULTIPLIER,
            initial_seq: SeqNum::default(),
            marking: MarkingConfig::default(),
        }
    }
}

impl EstimatorConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> EstimatorConfigBuilder {
        EstimatorConfigBuilder::new()
    }

    /// Check every value against its bounds.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_multiplier == 0 {
            return Err(ConfigError::ZeroMaxMultiplier);
        }
        self.marking.validate()
    }
}

/// Builder for [`EstimatorConfig`].
#[derive(Debug, Clone, Default)]
pub struct EstimatorConfigBuilder {
    config: EstimatorConfig,
}

impl EstimatorConfigBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the RTO floor.
    pub fn min_rto(mut self, min_rto: Duration) -> Self {
        self.config.min_rto = min_rto;
        self
    }

    /// Set the estimate used before the first sample.
    pub fn initial_estimated_rtt(mut self, rtt: Duration) -> Self {
        self.config.initial_estimated_rtt = rtt;
        self
    }

    /// Set the backoff ceiling.
    pub fn max_multiplier(mut self, max: u16) -> Self {
        self.config.max_multiplier = max;
        self
    }

    /// Set the first sequence number.
    pub fn initial_seq(mut self, seq: SeqNum) -> Self {
        self.config.initial_seq = seq;
        self
    }

    /// Set the marking-fraction weight `g`.
    pub fn marking_weight(mut self, g: f64) -> Self {
        self.config.marking.g = g;
        self
    }

    /// Set the marking fraction before the first interval.
    pub fn initial_alpha(mut self, alpha: f64) -> Self {
        self.config.marking.initial_alpha = alpha;
        self
    }

    /// Set how acks are grouped into marking intervals.
    pub fn marking_interval(mut self, interval: MarkingInterval) -> Self {
        self.config.marking.interval = interval;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> ConfigResult<EstimatorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
