//! The `Runner` façade: owns the selected algorithm's state, routes
//! samples to it, and supports bounds reconfiguration.
//!
//! There is no shared state and no locking here — a `Runner` is meant to
//! be driven from a single logical execution context (spec.md §5); nothing
//! prevents multiple independent `Runner`s from coexisting.

use crate::algorithms::{self, AlgorithmState};
use crate::config::Config;
use crate::decision::Decision;
use crate::error::RunnerError;
use crate::sample::Sample;

pub struct Runner {
    config: Config,
    algorithm_name: &'static str,
    state: AlgorithmState,
    last_timestamp_ms: Option<i64>,
}

impl Runner {
    /// Select an algorithm (override takes precedence over `config_balancer`,
    /// which falls back to the registry default), compose the algorithm
    /// `Config`, and construct its state.
    pub fn init(
        config: Config,
        name_override: Option<&str>,
        config_balancer: &str,
    ) -> Result<Runner, RunnerError> {
        let info = if let Some(name) = name_override {
            algorithms::find(name).ok_or_else(|| RunnerError::UnknownAlgorithm {
                requested: name.to_string(),
                available: algorithms::list().iter().map(|a| a.name).collect(),
            })?
        } else if !config_balancer.is_empty() {
            algorithms::find(config_balancer).unwrap_or_else(algorithms::default_algorithm)
        } else {
            algorithms::default_algorithm()
        };

        let state = AlgorithmState::init(info.name, &config);
        Ok(Runner {
            config,
            algorithm_name: info.name,
            state,
            last_timestamp_ms: None,
        })
    }

    /// Delegate a telemetry tick to the selected algorithm.
    ///
    /// Debug builds assert `sample.timestamp_ms` is non-decreasing across
    /// calls, per the contract samples are required to uphold; release
    /// builds trust the caller and skip the check.
    pub fn step(&mut self, sample: &Sample) -> Decision {
        if let Some(last) = self.last_timestamp_ms {
            debug_assert!(
                sample.timestamp_ms >= last,
                "timestamp_ms went backwards: {} then {}",
                last,
                sample.timestamp_ms
            );
        }
        self.last_timestamp_ms = Some(sample.timestamp_ms);
        self.state.step(&self.config, sample)
    }

    /// Replace the bitrate bounds, destroying and rebuilding algorithm
    /// state. This is an intentional contract (spec.md §9): filter
    /// time-constants are tuned against an expected bitrate range and
    /// become miscalibrated after a large bound change, so the next
    /// decision starts optimistic again.
    pub fn update_bounds(&mut self, min_bps: i64, max_bps: i64) -> Result<(), RunnerError> {
        if min_bps > max_bps {
            return Err(RunnerError::InvalidBounds {
                min: min_bps,
                max: max_bps,
            });
        }
        self.config.min_bitrate_bps = min_bps;
        self.config.max_bitrate_bps = max_bps;
        self.state = AlgorithmState::init(self.algorithm_name, &self.config);
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.algorithm_name
    }

    /// No resources to release beyond dropping the state; present for
    /// parity with the init/step/cleanup lifecycle spec.md §9 describes.
    pub fn cleanup(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: i64, bs: i64, rtt: f64) -> Sample {
        Sample {
            buffer_size: bs,
            rtt_ms: rtt,
            send_rate_mbps: 5.0,
            timestamp_ms: t,
            pkt_loss_total: 0,
            pkt_retrans_total: 0,
        }
    }

    #[test]
    fn unknown_algorithm_override_is_reported() {
        let err = Runner::init(Config::default(), Some("quantum"), "adaptive").unwrap_err();
        match err {
            RunnerError::UnknownAlgorithm { requested, available } => {
                assert_eq!(requested, "quantum");
                assert!(available.contains(&"adaptive"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn name_override_beats_config_balancer() {
        let runner = Runner::init(Config::default(), Some("aimd"), "fixed").unwrap();
        assert_eq!(runner.name(), "aimd");
    }

    #[test]
    fn empty_config_balancer_falls_back_to_default() {
        let runner = Runner::init(Config::default(), None, "").unwrap();
        assert_eq!(runner.name(), "adaptive");
    }

    #[test]
    fn invalid_bounds_rejected_without_mutating_state() {
        let mut runner = Runner::init(Config::default(), Some("fixed"), "fixed").unwrap();
        let before = runner.step(&sample(1000, 5, 10.0));
        let err = runner.update_bounds(5_000_000, 1_000_000).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidBounds { .. }));
        // The rejected call must not have reinitialized state against the
        // swapped (min > max) bounds.
        let after = runner.step(&sample(2000, 5, 10.0));
        assert_eq!(before, after);
        assert_eq!(before.new_bitrate_bps, 6_000_000);
    }

    #[test]
    fn decisions_are_deterministic_given_identical_inputs() {
        let samples = [sample(1000, 5, 20.0), sample(1500, 600, 900.0), sample(2000, 20, 25.0)];
        let mut a = Runner::init(Config::default(), None, "adaptive").unwrap();
        let mut b = Runner::init(Config::default(), None, "adaptive").unwrap();
        let decisions_a: Vec<_> = samples.iter().map(|s| a.step(s)).collect();
        let decisions_b: Vec<_> = samples.iter().map(|s| b.step(s)).collect();
        assert_eq!(decisions_a, decisions_b);
    }
}
