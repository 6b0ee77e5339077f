//! Estimator core.
//!
//! [`RttEstimator`] ties the sent-segment ledger, a smoothing algorithm, the
//! backoff multiplier and the marking-fraction filter together. A transport
//! calls [`on_segment_sent`](RttEstimator::on_segment_sent) for every
//! transmission and [`on_ack_received`](RttEstimator::on_ack_received) for
//! every acknowledgment, and asks for
//! [`retransmit_timeout`](RttEstimator::retransmit_timeout) when arming its
//! timer. Deciding that a timeout fired is the transport's job; it then
//! calls [`increase_multiplier`](RttEstimator::increase_multiplier) followed
//! by [`clear_sent`](RttEstimator::clear_sent).

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::core::{BACKOFF_FACTOR, ConfigResult, SeqNum};

use super::algorithm::{Algorithm, AlgorithmConfig, SmoothingAlgorithm};
use super::config::EstimatorConfig;
use super::ledger::{SendKind, SentLedger};
use super::marking::MarkingFraction;
use super::mean_deviation::MeanDeviation;

/// Estimator fixed to the mean-deviation filter.
pub type RttMeanDeviation = RttEstimator<MeanDeviation>;

/// RTT and RTO estimator for one connection.
#[derive(Debug)]
pub struct RttEstimator<A: SmoothingAlgorithm = Algorithm> {
    config: EstimatorConfig,
    algorithm: A,
    ledger: SentLedger,
    /// Smoothed RTT.
    current_estimate: Duration,
    min_rto: Duration,
    /// Backoff factor in `[1, max_multiplier]`.
    multiplier: u16,
    /// Samples folded in since construction or the last reset.
    n_samples: u32,
    marking: MarkingFraction,
}

impl<A: SmoothingAlgorithm + Default> Default for RttEstimator<A> {
    fn default() -> Self {
        Self::build(EstimatorConfig::default(), A::default(), MarkingFraction::default())
    }
}

impl RttEstimator<Algorithm> {
    /// Create an estimator with the algorithm selected by `algorithm`.
    pub fn from_config(config: EstimatorConfig, algorithm: &AlgorithmConfig) -> ConfigResult<Self> {
        Self::new(config, algorithm.build()?)
    }
}

impl<A: SmoothingAlgorithm> RttEstimator<A> {
    /// Create an estimator after validating `config`.
    pub fn new(config: EstimatorConfig, algorithm: A) -> ConfigResult<Self> {
        config.validate()?;
        let marking = MarkingFraction::new(config.marking)?;
        Ok(Self::build(config, algorithm, marking))
    }

    fn build(config: EstimatorConfig, algorithm: A, marking: MarkingFraction) -> Self {
        Self {
            config,
            algorithm,
            ledger: SentLedger::new(config.initial_seq),
            current_estimate: config.initial_estimated_rtt,
            min_rto: config.min_rto,
            multiplier: 1,
            n_samples: 0,
            marking,
        }
    }

    /// Note that `size` bytes starting at `seq` were sent at `now`.
    ///
    /// Sends below the next expected sequence are retransmissions: they flag
    /// the overlapping in-flight records so those are never timed.
    pub fn on_segment_sent(&mut self, seq: SeqNum, size: u32, now: Instant) {
        let kind = self.ledger.record(seq, size, now);
        match kind {
            SendKind::Fresh => trace!(%seq, size, "segment sent"),
            SendKind::Retransmission => trace!(%seq, size, "segment retransmitted"),
            SendKind::Untracked => trace!(
                %seq,
                size,
                next = %self.ledger.next_expected(),
                "untracked send"
            ),
        }
    }

    /// Note that a cumulative ack for `ack_seq` arrived at `now`.
    ///
    /// Returns the measured RTT if the ack completed the oldest in-flight
    /// record and that record was never retransmitted. A sample is folded
    /// into the estimate and resets the backoff multiplier. The marking
    /// filter counts every ack, sample or not.
    pub fn on_ack_received(
        &mut self,
        ack_seq: SeqNum,
        marked: bool,
        now: Instant,
    ) -> Option<Duration> {
        self.ledger.note_mark(marked);
        let sample = self.ledger.match_and_consume(ack_seq, now);

        if let Some(rtt) = sample {
            self.measurement(rtt);
            self.reset_multiplier();
        }
        trace!(ack = %ack_seq, marked, sample = ?sample, "ack received");

        self.marking.on_ack(marked, ack_seq, self.ledger.next_expected());
        sample
    }

    /// Fold one RTT sample into the estimate.
    pub fn measurement(&mut self, sample: Duration) {
        let first = self.n_samples == 0;
        self.current_estimate = self.algorithm.measurement(self.current_estimate, sample, first);
        self.n_samples = self.n_samples.saturating_add(1);
        trace!(
            algorithm = self.algorithm.name(),
            ?sample,
            srtt = ?self.current_estimate,
            variance = ?self.algorithm.variance(),
            "rtt sample"
        );
    }

    /// Current retransmission timeout.
    ///
    /// `max(min_rto, timeout) * multiplier`, where `timeout` comes from the
    /// smoothing algorithm. Never below `min_rto`.
    pub fn retransmit_timeout(&self) -> Duration {
        let base = self.algorithm.timeout(self.current_estimate);
        base.max(self.min_rto).saturating_mul(u32::from(self.multiplier))
    }

    /// Double the backoff multiplier, up to the configured ceiling.
    pub fn increase_multiplier(&mut self) {
        let max = self.config.max_multiplier;
        self.multiplier = self.multiplier.saturating_mul(BACKOFF_FACTOR).min(max);
        debug!(multiplier = self.multiplier, max, "backoff increased");
    }

    /// Return the backoff multiplier to 1.
    pub fn reset_multiplier(&mut self) {
        if self.multiplier != 1 {
            debug!(from = self.multiplier, "backoff reset");
        }
        self.multiplier = 1;
    }

    /// Forget every in-flight record.
    pub fn clear_sent(&mut self) {
        debug!(records = self.ledger.len(), "sent history cleared");
        self.ledger.clear();
    }

    /// Return the estimate to its configured initial state.
    ///
    /// Clears the ledger, the sample count and algorithm state, and resets
    /// the multiplier. The next expected sequence never rewinds, so sends
    /// after a reset are timed as usual. Configuration and the marking filter
    /// are untouched.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.current_estimate = self.config.initial_estimated_rtt;
        self.algorithm.reset();
        self.n_samples = 0;
        self.multiplier = 1;
        debug!(
            algorithm = self.algorithm.name(),
            estimate = ?self.current_estimate,
            "estimator reset"
        );
    }

    /// Independent estimator with the same state and an empty ledger.
    pub fn copy(&self) -> Self {
        Self {
            config: self.config,
            algorithm: self.algorithm.clone(),
            ledger: SentLedger::new(self.ledger.next_expected()),
            current_estimate: self.current_estimate,
            min_rto: self.min_rto,
            multiplier: self.multiplier,
            n_samples: self.n_samples,
            marking: self.marking.clone(),
        }
    }

    /// Set the next sequence number expected to be sent.
    pub fn init_sequence(&mut self, seq: SeqNum) {
        self.ledger.set_next_expected(seq);
    }

    /// Next sequence number expected to be sent.
    pub fn next_expected(&self) -> SeqNum {
        self.ledger.next_expected()
    }

    /// Current smoothed RTT.
    pub fn current_estimate(&self) -> Duration {
        self.current_estimate
    }

    /// Overwrite the current smoothed RTT.
    pub fn set_current_estimate(&mut self, estimate: Duration) {
        debug!(?estimate, "estimate forced");
        self.current_estimate = estimate;
    }

    /// Current smoothed deviation from the algorithm.
    pub fn variance(&self) -> Duration {
        self.algorithm.variance()
    }

    /// RTO floor.
    pub fn min_rto(&self) -> Duration {
        self.min_rto
    }

    /// Change the RTO floor.
    pub fn set_min_rto(&mut self, min_rto: Duration) {
        debug!(?min_rto, "min rto changed");
        self.min_rto = min_rto;
    }

    /// Current backoff multiplier.
    pub fn multiplier(&self) -> u16 {
        self.multiplier
    }

    /// Backoff ceiling.
    pub fn max_multiplier(&self) -> u16 {
        self.config.max_multiplier
    }

    /// Samples folded in since construction or the last reset.
    pub fn sample_count(&self) -> u32 {
        self.n_samples
    }

    /// Smoothed marking fraction.
    pub fn alpha(&self) -> f64 {
        self.marking.alpha()
    }

    /// Marking-fraction weight.
    pub fn g(&self) -> f64 {
        self.marking.g()
    }

    /// Change the marking-fraction weight, `0 < g < 1`.
    pub fn set_g(&mut self, g: f64) -> ConfigResult<()> {
        self.marking.set_g(g)?;
        debug!(g, "marking weight changed");
        Ok(())
    }

    /// Return the marking filter to its configured initial state.
    pub fn reset_marking(&mut self) {
        self.marking.reset();
    }

    /// Marking-fraction filter.
    pub fn marking(&self) -> &MarkingFraction {
        &self.marking
    }

    /// In-flight records.
    pub fn ledger(&self) -> &SentLedger {
        &self.ledger
    }

    /// Smoothing algorithm.
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Smoothing algorithm, for retuning.
    pub fn algorithm_mut(&mut self) -> &mut A {
        &mut self.algorithm
    }

    /// Configuration the estimator was built with.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }
}
