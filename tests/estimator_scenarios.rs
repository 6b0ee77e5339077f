//! End-to-end estimator scenarios driven through the public API.

use std::time::{Duration, Instant};

use rtt_estimator::prelude::*;

fn seq(value: u32) -> SeqNum {
    SeqNum::new(value)
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn test_first_measurement_seeds_estimate_and_variance() {
    for sample in [ms(1), ms(37), ms(250), Duration::from_micros(1_234_566)] {
        let mut rtt = RttMeanDeviation::default();
        rtt.measurement(sample);
        assert_eq!(rtt.current_estimate(), sample);
        assert_eq!(rtt.variance(), sample / 2);
        assert_eq!(rtt.sample_count(), 1);
    }
}

#[test]
fn test_consecutive_timeouts_back_off_monotonically() {
    for max in [1u16, 3, 8, 64] {
        let config = EstimatorConfig::builder().max_multiplier(max).build().unwrap();
        let mut rtt = RttEstimator::new(config, MeanDeviation::default()).unwrap();

        for n in 1..=10u32 {
            rtt.increase_multiplier();
            let expected = 2u32.pow(n).min(u32::from(max));
            assert_eq!(u32::from(rtt.multiplier()), expected, "max={max} n={n}");
        }
    }
}

#[test]
fn test_sampled_ack_resets_backoff() {
    let t0 = Instant::now();
    let mut rtt = RttMeanDeviation::default();
    rtt.on_segment_sent(seq(0), 10, t0);
    rtt.increase_multiplier();
    rtt.increase_multiplier();
    rtt.increase_multiplier();
    assert_eq!(rtt.multiplier(), 8);

    rtt.on_segment_sent(seq(10), 10, t0 + ms(10));
    let sample = rtt.on_ack_received(seq(10), false, t0 + ms(90));

    assert_eq!(sample, Some(ms(90)));
    assert_eq!(rtt.multiplier(), 1);
}

#[test]
fn test_karn_ambiguous_retransmission_is_not_timed() {
    let t0 = Instant::now();
    let mut rtt = RttMeanDeviation::default();

    rtt.on_segment_sent(seq(0), 10, t0);
    rtt.on_segment_sent(seq(0), 10, t0 + ms(1000));
    let sample = rtt.on_ack_received(seq(10), false, t0 + ms(1200));

    assert_eq!(sample, None);
    assert_eq!(rtt.sample_count(), 0);
    assert_eq!(rtt.current_estimate(), ms(1000));
    assert!(rtt.ledger().is_empty());
}

#[test]
fn test_cumulative_ack_retires_everything_covered() {
    let t0 = Instant::now();
    let mut rtt = RttMeanDeviation::default();

    rtt.on_segment_sent(seq(0), 10, t0);
    rtt.on_segment_sent(seq(10), 10, t0 + ms(1));
    rtt.on_segment_sent(seq(20), 10, t0 + ms(2));
    assert_eq!(rtt.ledger().len(), 3);

    let sample = rtt.on_ack_received(seq(30), false, t0 + ms(50));

    assert_eq!(sample, Some(ms(50)));
    assert_eq!(rtt.sample_count(), 1);
    assert!(rtt.ledger().is_empty());

    // The same ack again has nothing left to match
    assert_eq!(rtt.on_ack_received(seq(30), false, t0 + ms(60)), None);
    assert_eq!(rtt.sample_count(), 1);
}

#[test]
fn test_rto_never_below_floor() {
    let config = EstimatorConfig::builder()
        .initial_estimated_rtt(Duration::ZERO)
        .min_rto(ms(200))
        .build()
        .unwrap();
    let mut rtt = RttEstimator::new(config, MeanDeviation::default()).unwrap();
    assert_eq!(rtt.retransmit_timeout(), ms(200));

    let t0 = Instant::now();
    for i in 0..50u32 {
        let at = t0 + ms(u64::from(i));
        rtt.on_segment_sent(seq(i * 10), 10, at);
        rtt.on_ack_received(seq(i * 10 + 10), false, at + Duration::from_micros(10));
        assert!(rtt.retransmit_timeout() >= ms(200));
    }
}

#[test]
fn test_alpha_stays_in_unit_interval() {
    let mut rtt = RttMeanDeviation::default();
    rtt.set_g(0.3).unwrap();
    let t0 = Instant::now();

    // Irregular marking pattern
    let pattern = [true, true, false, true, false, false, false, true, true, true];
    for (i, marked) in pattern.iter().cycle().take(300).enumerate() {
        let now = t0 + ms(i as u64);
        let start = (i as u32) * 100;
        rtt.on_segment_sent(seq(start), 100, now);
        rtt.on_ack_received(seq(start + 100), *marked, now + ms(5));
        let alpha = rtt.alpha();
        assert!((0.0..=1.0).contains(&alpha), "alpha {alpha} out of range");
    }
}

#[test]
fn test_alpha_tracks_marking_direction() {
    let t0 = Instant::now();
    let mut rtt = RttMeanDeviation::default();

    for _ in 0..200 {
        rtt.on_ack_received(seq(0), true, t0);
    }
    let high = rtt.alpha();
    assert!(high > 0.99);

    for _ in 0..200 {
        rtt.on_ack_received(seq(0), false, t0);
    }
    assert!(rtt.alpha() < 0.01);
}

#[test]
fn test_smaller_g_moves_alpha_slower() {
    let t0 = Instant::now();
    let mut slow = RttMeanDeviation::default();
    let mut fast = RttMeanDeviation::default();
    slow.set_g(0.05).unwrap();
    fast.set_g(0.5).unwrap();

    for _ in 0..5 {
        slow.on_ack_received(seq(0), true, t0);
        fast.on_ack_received(seq(0), true, t0);
    }
    assert!(slow.alpha() < fast.alpha());
}

#[test]
fn test_reset_twice_equals_reset_once() {
    let t0 = Instant::now();
    let mut rtt = RttMeanDeviation::default();
    rtt.on_segment_sent(seq(0), 10, t0);
    rtt.on_ack_received(seq(10), false, t0 + ms(20));
    rtt.on_segment_sent(seq(10), 10, t0 + ms(20));

    rtt.reset();
    let snapshot = (
        rtt.current_estimate(),
        rtt.variance(),
        rtt.ledger().len(),
        rtt.sample_count(),
    );
    rtt.reset();

    assert_eq!(
        snapshot,
        (
            rtt.current_estimate(),
            rtt.variance(),
            rtt.ledger().len(),
            rtt.sample_count()
        )
    );
    assert_eq!(snapshot, (ms(1000), Duration::ZERO, 0, 0));
}

#[test]
fn test_timeout_then_recovery() {
    let t0 = Instant::now();
    let mut rtt = RttMeanDeviation::default();

    rtt.on_segment_sent(seq(0), 100, t0);
    rtt.on_ack_received(seq(100), false, t0 + ms(100));
    assert_eq!(rtt.retransmit_timeout(), ms(300));

    // Segment 100 is lost; the caller times out twice
    rtt.on_segment_sent(seq(100), 100, t0 + ms(100));
    rtt.increase_multiplier();
    rtt.clear_sent();
    rtt.on_segment_sent(seq(100), 100, t0 + ms(400));
    rtt.increase_multiplier();
    rtt.clear_sent();
    rtt.on_segment_sent(seq(100), 100, t0 + ms(1000));
    assert_eq!(rtt.retransmit_timeout(), ms(1200));

    // Its ack carries no sample and backoff holds
    assert_eq!(rtt.on_ack_received(seq(200), false, t0 + ms(1100)), None);
    assert_eq!(rtt.multiplier(), 4);

    // Fresh data gets timed again and clears the backoff
    rtt.on_segment_sent(seq(200), 100, t0 + ms(1100));
    assert_eq!(rtt.on_ack_received(seq(300), false, t0 + ms(1200)), Some(ms(100)));
    assert_eq!(rtt.multiplier(), 1);
}

#[test]
fn test_copy_forks_connection_state() {
    let t0 = Instant::now();
    let mut parent = RttEstimator::from_config(
        EstimatorConfig::default(),
        &AlgorithmConfig::MeanDeviation { gain: 0.25 },
    )
    .unwrap();
    parent.on_segment_sent(seq(0), 10, t0);
    parent.on_ack_received(seq(10), true, t0 + ms(70));
    parent.on_segment_sent(seq(10), 10, t0 + ms(70));

    let mut child = parent.copy();
    assert!(child.ledger().is_empty());
    assert_eq!(child.current_estimate(), ms(70));
    assert_eq!(child.alpha(), parent.alpha());

    // The child does not see the parent's in-flight segment
    assert_eq!(child.on_ack_received(seq(20), false, t0 + ms(140)), None);
    assert_eq!(parent.on_ack_received(seq(20), false, t0 + ms(140)), Some(ms(70)));
}

#[cfg(feature = "rfc6298")]
#[test]
fn test_rfc6298_variant_shares_core_rules() {
    let t0 = Instant::now();
    let mut rtt =
        RttEstimator::from_config(EstimatorConfig::default(), &AlgorithmConfig::rfc6298()).unwrap();

    rtt.on_segment_sent(seq(0), 10, t0);
    rtt.on_segment_sent(seq(0), 10, t0 + ms(500));
    assert_eq!(rtt.on_ack_received(seq(10), false, t0 + ms(600)), None);

    rtt.on_segment_sent(seq(10), 10, t0 + ms(600));
    assert_eq!(rtt.on_ack_received(seq(20), false, t0 + ms(700)), Some(ms(100)));
    assert_eq!(rtt.variance(), ms(50));
    assert_eq!(rtt.retransmit_timeout(), ms(300));
}
