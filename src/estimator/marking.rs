//! Smoothed congestion-marking fraction (DCTCP alpha).
//!
//! Counts marked and unmarked acknowledgments and folds the marked share of
//! each interval into `alpha = (1 - g) * alpha + g * fraction`. The value
//! runs parallel to RTT estimation and is read by congestion control.

use tracing::trace;

use crate::core::{
    ConfigError, ConfigResult, DEFAULT_INITIAL_ALPHA, DEFAULT_MARKING_WEIGHT, SeqNum, open_unit,
};

/// How acknowledgments are grouped into marking intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MarkingInterval {
    /// Every acknowledgment closes an interval.
    #[default]
    PerAck,
    /// An interval closes once the cumulative ack reaches the send sequence
    /// that was outstanding when the previous interval closed, i.e. about
    /// once per round trip.
    PerWindow,
}

/// Marking filter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarkingConfig {
    /// Weight of the newest interval, `0 < g < 1`.
    pub g: f64,
    /// Alpha before any interval has closed, `0 <= alpha <= 1`.
    pub initial_alpha: f64,
    /// Interval boundaries.
    pub interval: MarkingInterval,
}

impl Default for MarkingConfig {
    fn default() -> Self {
        Self {
            g: DEFAULT_MARKING_WEIGHT,
            initial_alpha: DEFAULT_INITIAL_ALPHA,
            interval: MarkingInterval::PerAck,
        }
    }
}

impl MarkingConfig {
    /// Check `g` and `initial_alpha` against their bounds.
    pub fn validate(&self) -> ConfigResult<()> {
        if !open_unit(self.g) {
            return Err(ConfigError::MarkingWeightOutOfRange(self.g));
        }
        if !(0.0..=1.0).contains(&self.initial_alpha) {
            return Err(ConfigError::AlphaOutOfRange(self.initial_alpha));
        }
        Ok(())
    }
}

/// Exponentially weighted fraction of marked acknowledgments.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkingFraction {
    config: MarkingConfig,
    g: f64,
    alpha: f64,
    marked: u64,
    unmarked: u64,
    delta_marked: u64,
    delta_unmarked: u64,
    /// Marked share of the last closed interval.
    fraction: f64,
    /// Ack that closes the current window in [`MarkingInterval::PerWindow`].
    window_end: Option<SeqNum>,
}

impl Default for MarkingFraction {
    fn default() -> Self {
        Self::from_config(MarkingConfig::default())
    }
}

impl MarkingFraction {
    /// Create a filter after validating `config`.
    pub fn new(config: MarkingConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: MarkingConfig) -> Self {
        Self {
            config,
            g: config.g,
            alpha: config.initial_alpha,
            marked: 0,
            unmarked: 0,
            delta_marked: 0,
            delta_unmarked: 0,
            fraction: config.initial_alpha,
            window_end: None,
        }
    }

    /// Count one acknowledgment and close the interval if it ended.
    ///
    /// `snd_next` is the next sequence the sender will use; it becomes the
    /// end of the following window.
    pub fn on_ack(&mut self, marked: bool, ack: SeqNum, snd_next: SeqNum) {
        if marked {
            self.marked += 1;
            self.delta_marked += 1;
        } else {
            self.unmarked += 1;
            self.delta_unmarked += 1;
        }

        match self.config.interval {
            MarkingInterval::PerAck => self.update_alpha(),
            MarkingInterval::PerWindow => match self.window_end {
                Some(end) if ack >= end => {
                    self.update_alpha();
                    self.window_end = Some(snd_next);
                }
                Some(_) => {}
                None => self.window_end = Some(snd_next),
            },
        }
    }

    /// Fold the open interval into alpha.
    ///
    /// An interval with no acknowledgments leaves alpha untouched.
    pub fn update_alpha(&mut self) {
        let total = self.delta_marked + self.delta_unmarked;
        if total == 0 {
            return;
        }

        self.fraction = self.delta_marked as f64 / total as f64;
        self.alpha = ((1.0 - self.g) * self.alpha + self.g * self.fraction).clamp(0.0, 1.0);
        trace!(
            marked = self.delta_marked,
            unmarked = self.delta_unmarked,
            fraction = self.fraction,
            alpha = self.alpha,
            "marking fraction updated"
        );

        self.delta_marked = 0;
        self.delta_unmarked = 0;
    }

    /// Current smoothed marking fraction.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Weight of the newest interval.
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Change the weight of the newest interval.
    pub fn set_g(&mut self, g: f64) -> ConfigResult<()> {
        if !open_unit(g) {
            return Err(ConfigError::MarkingWeightOutOfRange(g));
        }
        self.g = g;
        Ok(())
    }

    /// Marked share of the last closed interval.
    pub fn last_fraction(&self) -> f64 {
        self.fraction
    }

    /// Cumulative `(marked, unmarked)` acknowledgment counts.
    pub fn counts(&self) -> (u64, u64) {
        (self.marked, self.unmarked)
    }

    /// `(marked, unmarked)` counts of the interval still open.
    pub fn pending(&self) -> (u64, u64) {
        (self.delta_marked, self.delta_unmarked)
    }

    /// Return to the configured initial state, keeping the current `g`.
    pub fn reset(&mut self) {
        let g = self.g;
        *self = Self::from_config(self.config);
        self.g = g;
    }
}
