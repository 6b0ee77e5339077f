//! RTT/RTO estimation engine.
//!
//! - **Sent-segment ledger**: [`SentLedger`] matches cumulative acks to the
//!   segments that produced them, honouring Karn's algorithm
//! - **Estimator core**: [`RttEstimator`] with backoff, reset and copy
//! - **Smoothing**: [`MeanDeviation`] (Jacobson/Karels) and [`Rfc6298`]
//!   behind [`SmoothingAlgorithm`]
//! - **Marking fraction**: [`MarkingFraction`], DCTCP-style alpha
//!
//! ```text
//!  segment sent ──▶ SentLedger ◀── ack received
//!                       │ sample
//!                       ▼
//!              SmoothingAlgorithm ──▶ srtt, variance ──▶ RTO × multiplier
//!
//!  ack received (marked?) ──▶ MarkingFraction ──▶ alpha
//! ```

mod algorithm;
mod config;
#[allow(clippy::module_inception)]
mod estimator;
mod ledger;
mod marking;
mod mean_deviation;
#[cfg(feature = "rfc6298")]
#[cfg_attr(docsrs, doc(cfg(feature = "rfc6298")))]
mod rfc6298;

pub use algorithm::{Algorithm, AlgorithmConfig, SmoothingAlgorithm};
pub use config::{EstimatorConfig, EstimatorConfigBuilder};
pub use estimator::{RttEstimator, RttMeanDeviation};
pub use ledger::{SendKind, SentLedger, SentRecord};
pub use marking::{MarkingConfig, MarkingFraction, MarkingInterval};
pub use mean_deviation::MeanDeviation;
#[cfg(feature = "rfc6298")]
#[cfg_attr(docsrs, doc(cfg(feature = "rfc6298")))]
pub use rfc6298::Rfc6298;
