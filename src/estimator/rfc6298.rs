//! RFC 6298 RTT filter.
//!
//! - First measurement: `SRTT = R`, `RTTVAR = R / 2`
//! - Subsequent: `RTTVAR = (1 - beta) * RTTVAR + beta * |SRTT - R|`,
//!   then `SRTT = (1 - alpha) * SRTT + alpha * R`
//! - Timeout: `SRTT + max(G, K * RTTVAR)`
//!
//! RTTVAR is updated with the SRTT from before this sample, as the RFC
//! requires.

use std::time::Duration;

use crate::core::{
    ConfigError, ConfigResult, DEFAULT_CLOCK_GRANULARITY, RTO_K, RTTVAR_BETA, SRTT_ALPHA,
    open_unit,
};

use super::algorithm::{SmoothingAlgorithm, duration_from_secs};

/// RFC 6298 filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct Rfc6298 {
    alpha: f64,
    beta: f64,
    k: u32,
    granularity: Duration,
    rttvar: Duration,
}

impl Default for Rfc6298 {
    fn default() -> Self {
        Self {
            alpha: SRTT_ALPHA,
            beta: RTTVAR_BETA,
            k: RTO_K,
            granularity: DEFAULT_CLOCK_GRANULARITY,
            rttvar: Duration::ZERO,
        }
    }
}

impl Rfc6298 {
    /// Create a filter with explicit weights.
    pub fn with_weights(
        alpha: f64,
        beta: f64,
        k: u32,
        granularity: Duration,
    ) -> ConfigResult<Self> {
        if !open_unit(alpha) {
            return Err(ConfigError::SmoothingWeightOutOfRange {
                name: "alpha",
                value: alpha,
            });
        }
        if !open_unit(beta) {
            return Err(ConfigError::SmoothingWeightOutOfRange {
                name: "beta",
                value: beta,
            });
        }
        if k == 0 {
            return Err(ConfigError::ZeroRtoFactor);
        }

        Ok(Self {
            alpha,
            beta,
            k,
            granularity,
            rttvar: Duration::ZERO,
        })
    }

    /// SRTT weight.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// RTTVAR weight.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Clock granularity `G`.
    pub fn granularity(&self) -> Duration {
        self.granularity
    }
}

impl SmoothingAlgorithm for Rfc6298 {
    fn name(&self) -> &'static str {
        "rfc6298"
    }

    fn measurement(&mut self, estimate: Duration, sample: Duration, first: bool) -> Duration {
        if first {
            self.rttvar = sample / 2;
            return sample;
        }

        let srtt = estimate.as_secs_f64();
        let r = sample.as_secs_f64();

        self.rttvar = duration_from_secs(
            (1.0 - self.beta) * self.rttvar.as_secs_f64() + self.beta * (srtt - r).abs(),
        );
        duration_from_secs((1.0 - self.alpha) * srtt + self.alpha * r)
    }

    fn timeout(&self, estimate: Duration) -> Duration {
        estimate.saturating_add(self.granularity.max(self.rttvar.saturating_mul(self.k)))
    }

    fn reset(&mut self) {
        self.rttvar = Duration::ZERO;
    }

    fn variance(&self) -> Duration {
        self.rttvar
    }
}
