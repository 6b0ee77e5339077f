//! Default configuration values.
//!
//! Each value is only a default; every one of them can be overridden through
//! [`EstimatorConfig`](crate::estimator::EstimatorConfig) or
//! [`AlgorithmConfig`](crate::estimator::AlgorithmConfig).

use std::time::Duration;

// =============================================================================
// ESTIMATOR CORE
// =============================================================================

/// Floor applied to every retransmission timeout.
pub const DEFAULT_MIN_RTO: Duration = Duration::from_millis(200);

/// RTT estimate used before the first sample (and after a reset).
pub const DEFAULT_INITIAL_ESTIMATED_RTT: Duration = Duration::from_secs(1);

/// Ceiling on the exponential backoff multiplier.
pub const DEFAULT_MAX_MULTIPLIER: u16 = 64;

/// Factor applied to the multiplier on each timeout.
pub const BACKOFF_FACTOR: u16 = 2;

// =============================================================================
// MEAN-DEVIATION FILTER (Jacobson/Karels, SIGCOMM 88)
// =============================================================================

/// Filter gain for both the smoothed RTT and the mean deviation (1/8).
pub const DEFAULT_MEAN_DEVIATION_GAIN: f64 = 0.125;

/// Deviation multiplier in `srtt + 4 * variance`.
pub const DEVIATION_FACTOR: u32 = 4;

// =============================================================================
// RFC 6298 FILTER
// =============================================================================

/// Alpha for SRTT smoothing (0.125 = 1/8).
pub const SRTT_ALPHA: f64 = 0.125;

/// Beta for RTTVAR smoothing (0.25 = 1/4).
pub const RTTVAR_BETA: f64 = 0.25;

/// K multiplier for RTO calculation (4 per RFC 6298).
pub const RTO_K: u32 = 4;

/// Clock granularity `G` in `srtt + max(G, K * rttvar)`.
pub const DEFAULT_CLOCK_GRANULARITY: Duration = Duration::from_millis(1);

// =============================================================================
// MARKING FRACTION (DCTCP)
// =============================================================================

/// Weight given to the newest marking fraction (1/16).
pub const DEFAULT_MARKING_WEIGHT: f64 = 0.0625;

/// Marking fraction before any acknowledgment has been seen.
pub const DEFAULT_INITIAL_ALPHA: f64 = 0.0;
