//! Go-back-N sender and cumulative-ack receiver over a [`Link`].
//!
//! Time is virtual: the loop jumps from event to event, so a run takes
//! microseconds no matter how long the simulated transfer is.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};
use std::time::{Duration, Instant};

use rtt_estimator::estimator::SmoothingAlgorithm;
use rtt_estimator::{RttEstimator, SeqNum};
use tracing::{debug, info};

use crate::link::{Link, Transit};

/// Bytes per segment.
pub const MSS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Event {
    /// Data segment reaches the receiver.
    Arrive { seq: u32, marked: bool },
    /// Cumulative ack reaches the sender.
    Ack { ack: u32, marked: bool },
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Report {
    /// Virtual time the transfer took.
    pub elapsed: Duration,
    /// Segments put on the wire, retransmissions included.
    pub transmissions: u64,
    /// RTT samples the estimator accepted.
    pub samples: u64,
    /// Retransmission timeouts.
    pub timeouts: u64,
}

/// Simulation state.
pub struct Simulation {
    rtt: RttEstimator,
    link: Link,
    total: u32,
    window: u32,
    start: Instant,
    clock: Duration,
    queue: BinaryHeap<Reverse<(Duration, u64, Event)>>,
    next_id: u64,
    snd_una: u32,
    snd_nxt: u32,
    timer: Option<Duration>,
    rcv_nxt: u32,
    out_of_order: BTreeSet<u32>,
    report: Report,
}

impl Simulation {
    /// Prepare a transfer of `segments` segments with at most `window` in flight.
    pub fn new(rtt: RttEstimator, link: Link, segments: u32, window: u32) -> Self {
        let first = rtt.next_expected().value();
        Self {
            rtt,
            link,
            total: segments.saturating_mul(MSS),
            window: window.max(1),
            start: Instant::now(),
            clock: Duration::ZERO,
            queue: BinaryHeap::new(),
            next_id: 0,
            snd_una: first,
            snd_nxt: first,
            timer: None,
            rcv_nxt: first,
            out_of_order: BTreeSet::new(),
            report: Report::default(),
        }
    }

    /// Estimator driving the sender.
    pub fn estimator(&self) -> &RttEstimator {
        &self.rtt
    }

    fn now(&self) -> Instant {
        self.start + self.clock
    }

    fn acked(&self) -> u32 {
        self.snd_una.wrapping_sub(self.rtt.config().initial_seq.value())
    }

    fn sent(&self) -> u32 {
        self.snd_nxt.wrapping_sub(self.rtt.config().initial_seq.value())
    }

    fn schedule(&mut self, after: Duration, event: Event) {
        self.queue.push(Reverse((self.clock + after, self.next_id, event)));
        self.next_id += 1;
    }

    /// Run until every byte is acknowledged or `limit` of virtual time passes.
    pub fn run(&mut self, limit: Duration) -> Report {
        while self.acked() < self.total && self.clock < limit {
            self.fill_window();

            let next_event = self.queue.peek().map(|Reverse((at, _, _))| *at);
            match (next_event, self.timer) {
                (Some(at), Some(deadline)) if deadline < at => self.on_timeout(deadline),
                (None, Some(deadline)) => self.on_timeout(deadline),
                (Some(_), _) => {
                    if let Some(Reverse((at, _, event))) = self.queue.pop() {
                        self.clock = at;
                        self.dispatch(event);
                    }
                }
                (None, None) => break,
            }
        }

        self.report.elapsed = self.clock;
        self.report
    }

    fn fill_window(&mut self) {
        while self.sent() < self.total
            && self.snd_nxt.wrapping_sub(self.snd_una) < self.window * MSS
        {
            self.transmit(self.snd_nxt);
            self.snd_nxt = self.snd_nxt.wrapping_add(MSS);
        }
    }

    fn transmit(&mut self, seq: u32) {
        self.rtt.on_segment_sent(SeqNum::new(seq), MSS, self.now());
        self.report.transmissions += 1;
        if self.timer.is_none() {
            self.timer = Some(self.clock + self.rtt.retransmit_timeout());
        }

        if let Transit::Delivered { delay, marked } = self.link.data() {
            self.schedule(delay, Event::Arrive { seq, marked });
        }
    }

    fn on_timeout(&mut self, deadline: Duration) {
        self.clock = deadline;
        self.report.timeouts += 1;
        self.rtt.increase_multiplier();
        self.rtt.clear_sent();
        debug!(
            una = self.snd_una,
            rto = ?self.rtt.retransmit_timeout(),
            "retransmission timeout"
        );

        // Go back N: resend everything from the first unacked byte
        self.timer = None;
        self.snd_nxt = self.snd_una;
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::Arrive { seq, marked } => {
                if seq == self.rcv_nxt {
                    self.rcv_nxt = self.rcv_nxt.wrapping_add(MSS);
                    while self.out_of_order.remove(&self.rcv_nxt) {
                        self.rcv_nxt = self.rcv_nxt.wrapping_add(MSS);
                    }
                } else if SeqNum::new(seq) > SeqNum::new(self.rcv_nxt) {
                    self.out_of_order.insert(seq);
                }
                let delay = self.link.ack_delay();
                self.schedule(delay, Event::Ack { ack: self.rcv_nxt, marked });
            }
            Event::Ack { ack, marked } => {
                let now = self.now();
                if self.rtt.on_ack_received(SeqNum::new(ack), marked, now).is_some() {
                    self.report.samples += 1;
                }

                if SeqNum::new(ack) > SeqNum::new(self.snd_una) {
                    self.snd_una = ack;
                    if SeqNum::new(self.snd_nxt) < SeqNum::new(ack) {
                        self.snd_nxt = ack;
                    }
                    self.timer = (self.snd_una != self.snd_nxt)
                        .then(|| self.clock + self.rtt.retransmit_timeout());
                }
            }
        }
    }
}

/// Log a finished run.
pub fn log_report(rtt: &RttEstimator, report: &Report) {
    info!(
        elapsed = ?report.elapsed,
        transmissions = report.transmissions,
        samples = report.samples,
        timeouts = report.timeouts,
        "transfer finished"
    );
    info!(
        algorithm = rtt.algorithm().name(),
        srtt = ?rtt.current_estimate(),
        variance = ?rtt.variance(),
        rto = ?rtt.retransmit_timeout(),
        alpha = rtt.alpha(),
        "estimator state"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkConfig;

    #[test]
    fn test_clean_link_completes_without_timeouts() {
        let link = Link::new(LinkConfig {
            jitter_ms: 0,
            ..LinkConfig::default()
        });
        let mut sim = Simulation::new(RttEstimator::default(), link, 100, 4);

        let report = sim.run(Duration::from_secs(600));

        assert_eq!(report.timeouts, 0);
        assert_eq!(report.transmissions, 100);
        assert!(report.samples > 0);
        let srtt = sim.estimator().current_estimate().as_secs_f64();
        assert!((srtt - 0.100).abs() < 1e-6);
    }

    #[test]
    fn test_lossy_link_recovers() {
        let link = Link::new(LinkConfig {
            loss: 0.1,
            mark: 0.2,
            seed: 42,
            ..LinkConfig::default()
        });
        let mut sim = Simulation::new(RttEstimator::default(), link, 200, 8);

        let report = sim.run(Duration::from_secs(3600));

        assert!(report.timeouts > 0);
        assert!(report.transmissions > 200);
        let alpha = sim.estimator().alpha();
        assert!(alpha > 0.0 && alpha < 1.0);
    }
}
