//! Constant-rate passthrough algorithm: always emits the configured
//! maximum, ignoring telemetry entirely. Useful for A/B comparison
//! against the adaptive algorithms and for stable links that don't need
//! adaptation.

use crate::config::{round_bitrate, Config};
use crate::decision::Decision;
use crate::sample::Sample;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedState {
    fixed_bitrate: i64,
}

impl FixedState {
    pub fn init(config: &Config) -> FixedState {
        FixedState {
            fixed_bitrate: round_bitrate(config.max_bitrate_bps),
        }
    }

    pub fn step(&mut self, sample: &Sample) -> Decision {
        Decision {
            new_bitrate_bps: self.fixed_bitrate,
            throughput: 0.0,
            rtt_ms: sample.rtt_ms.trunc() as i64,
            rtt_th_min: 0,
            rtt_th_max: 0,
            bs: sample.buffer_size,
            bs_th1: 0,
            bs_th2: 0,
            bs_th3: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_returns_rounded_max() {
        let cfg = Config {
            max_bitrate_bps: 4_000_000,
            ..Config::default()
        };
        let mut state = FixedState::init(&cfg);
        let samples = [
            Sample {
                buffer_size: 5,
                rtt_ms: 20.0,
                send_rate_mbps: 4.0,
                timestamp_ms: 1000,
                pkt_loss_total: 0,
                pkt_retrans_total: 0,
            },
            Sample {
                buffer_size: 200,
                rtt_ms: 600.0,
                send_rate_mbps: 1.0,
                timestamp_ms: 2000,
                pkt_loss_total: 0,
                pkt_retrans_total: 0,
            },
        ];
        for sample in samples {
            assert_eq!(state.step(&sample).new_bitrate_bps, 4_000_000);
        }
    }
}
