//! Property-based invariants that must hold for every algorithm: bounds,
//! the 100_000 rounding grain, fixed-bounds exactness, and determinism.
//! Grounded on spec.md §8's invariants 1-4.

use ceracoder_abr::{Config, Runner, Sample};
use proptest::prelude::*;

fn arb_algorithm() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("adaptive"), Just("aimd"), Just("fixed")]
}

fn base_config(min: i64, max: i64) -> Config {
    Config {
        min_bitrate_bps: min,
        max_bitrate_bps: max,
        srt_latency_ms: 2000,
        ..Config::default()
    }
}

fn arb_sample(t: i64) -> impl Strategy<Value = Sample> {
    (0i64..2000, 0.0f64..1500.0, 0.1f64..20.0, 0i64..200, 0i64..100).prop_map(
        move |(buffer_size, rtt_ms, send_rate_mbps, loss, retrans)| Sample {
            buffer_size,
            rtt_ms,
            send_rate_mbps,
            timestamp_ms: t,
            pkt_loss_total: loss,
            pkt_retrans_total: retrans,
        },
    )
}

proptest! {
    #[test]
    fn decisions_stay_within_bounds(
        algo in arb_algorithm(),
        samples in prop::collection::vec(arb_sample(0), 1..30),
    ) {
        let cfg = base_config(500_000, 6_000_000);
        let mut runner = Runner::init(cfg, Some(algo), "adaptive").unwrap();
        let mut t = 1000i64;
        let mut loss = 0i64;
        let mut retrans = 0i64;
        for mut sample in samples {
            sample.timestamp_ms = t;
            loss += sample.pkt_loss_total;
            retrans += sample.pkt_retrans_total;
            sample.pkt_loss_total = loss;
            sample.pkt_retrans_total = retrans;
            let decision = runner.step(&sample);
            prop_assert!(decision.new_bitrate_bps >= cfg.min_bitrate_bps);
            prop_assert!(decision.new_bitrate_bps <= cfg.max_bitrate_bps);
            prop_assert_eq!(decision.new_bitrate_bps % 100_000, 0);
            t += 250;
        }
    }

    #[test]
    fn fixed_bounds_pin_every_decision(
        algo in arb_algorithm(),
        samples in prop::collection::vec(arb_sample(0), 1..15),
    ) {
        let cfg = base_config(2_000_000, 2_000_000);
        let mut runner = Runner::init(cfg, Some(algo), "adaptive").unwrap();
        let mut t = 1000i64;
        for mut sample in samples {
            sample.timestamp_ms = t;
            let decision = runner.step(&sample);
            prop_assert_eq!(decision.new_bitrate_bps, 2_000_000);
            t += 500;
        }
    }

    #[test]
    fn step_is_pure_given_identical_inputs(
        algo in arb_algorithm(),
        samples in prop::collection::vec(arb_sample(0), 1..20),
    ) {
        let cfg = base_config(500_000, 6_000_000);
        let mut a = Runner::init(cfg, Some(algo), "adaptive").unwrap();
        let mut b = Runner::init(cfg, Some(algo), "adaptive").unwrap();
        let mut t = 1000i64;
        for mut sample in samples {
            sample.timestamp_ms = t;
            let da = a.step(&sample);
            let db = b.step(&sample);
            prop_assert_eq!(da, db);
            t += 500;
        }
    }
}
