//! # rtt-estimator
//!
//! Round-trip time estimation and retransmission timeout derivation for
//! reliable transports.
//!
//! A transport reports every segment it sends and every cumulative ack it
//! receives. The estimator matches acks back to the segments that produced
//! them, folds unambiguous samples into a smoothed RTT, and answers two
//! questions:
//!
//! - **What RTO should be armed now?** `max(min_rto, srtt + 4 * mdev)`,
//!   scaled by an exponential backoff multiplier
//! - **What share of traffic is congestion-marked?** A DCTCP-style smoothed
//!   marking fraction
//!
//! The estimator never keeps time itself: every timing call takes `now`, and
//! deciding that a timeout fired is left to the caller.
//!
//! ## Feature Flags
//!
//! - `rfc6298` (default): RFC 6298 smoothing variant
//! - `serde`: `Serialize`/`Deserialize` for configuration types
//!
//! ## Modules
//!
//! - [`core`]: Sequence numbers, defaults and error types
//! - [`estimator`]: Ledger, estimator core, smoothing and marking
//!
//! ## Example Usage
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use rtt_estimator::prelude::*;
//!
//! let mut rtt = RttMeanDeviation::default();
//! let t0 = Instant::now();
//!
//! rtt.on_segment_sent(SeqNum::new(0), 1000, t0);
//! let sample = rtt.on_ack_received(SeqNum::new(1000), false, t0 + Duration::from_millis(80));
//!
//! assert_eq!(sample, Some(Duration::from_millis(80)));
//! assert_eq!(rtt.current_estimate(), Duration::from_millis(80));
//! assert_eq!(rtt.retransmit_timeout(), Duration::from_millis(240));
//!
//! // The caller decided the next segment timed out
//! rtt.increase_multiplier();
//! rtt.clear_sent();
//! assert_eq!(rtt.retransmit_timeout(), Duration::from_millis(480));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

pub mod estimator;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    pub use crate::estimator::{
        Algorithm, AlgorithmConfig, EstimatorConfig, MarkingConfig, MarkingFraction,
        MarkingInterval, MeanDeviation, RttEstimator, RttMeanDeviation, SmoothingAlgorithm,
    };

    #[cfg(feature = "rfc6298")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rfc6298")))]
    pub use crate::estimator::Rfc6298;
}

// Re-export commonly used items at crate root
pub use crate::core::{ConfigError, ConfigResult, SeqNum};
pub use crate::estimator::{
    AlgorithmConfig, EstimatorConfig, RttEstimator, RttMeanDeviation, SentLedger, SentRecord,
};
