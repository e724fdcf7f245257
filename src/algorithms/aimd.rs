//! TCP-style additive-increase/multiplicative-decrease algorithm.
//!
//! Simpler and slower to adapt than the default adaptive algorithm, but
//! converges more predictably and shares bandwidth more fairly against
//! other AIMD-governed flows.

use crate::config::{clamp, or_default_f64, or_default_i64, round_bitrate, Config};
use crate::decision::Decision;
use crate::sample::Sample;

const INCR_STEP_DEFAULT: i64 = 50_000;
const DECR_MULT_DEFAULT: f64 = 0.75;
const INCR_INTERVAL_DEFAULT: i64 = 500;
const DECR_INTERVAL_DEFAULT: i64 = 200;

const RTT_MULT: f64 = 1.5;
const RTT_BASELINE_EMA: f64 = 0.95;
const BS_THRESHOLD: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimdState {
    min_bitrate_bps: i64,
    max_bitrate_bps: i64,
    srt_latency_ms: i64,

    incr_step: i64,
    decr_mult: f64,
    incr_interval: i64,
    decr_interval: i64,

    cur_bitrate: i64,
    rtt_baseline: f64,
    next_incr_ts: i64,
    next_decr_ts: i64,
}

impl AimdState {
    pub fn init(config: &Config) -> AimdState {
        AimdState {
            min_bitrate_bps: config.min_bitrate_bps,
            max_bitrate_bps: config.max_bitrate_bps,
            srt_latency_ms: config.srt_latency_ms,
            incr_step: or_default_i64(config.aimd_incr_step_bps, INCR_STEP_DEFAULT),
            decr_mult: or_default_f64(config.aimd_decr_mult, DECR_MULT_DEFAULT),
            incr_interval: or_default_i64(config.aimd_incr_interval_ms, INCR_INTERVAL_DEFAULT),
            decr_interval: or_default_i64(config.aimd_decr_interval_ms, DECR_INTERVAL_DEFAULT),
            cur_bitrate: config.max_bitrate_bps,
            rtt_baseline: 0.0,
            next_incr_ts: 0,
            next_decr_ts: 0,
        }
    }

    pub fn step(&mut self, _config: &Config, sample: &Sample) -> Decision {
        let rtt = sample.rtt_ms;
        let rtt_int = rtt.trunc() as i64;
        let t = sample.timestamp_ms;

        if self.rtt_baseline == 0.0 {
            self.rtt_baseline = rtt;
        } else if rtt < self.rtt_baseline {
            self.rtt_baseline = rtt;
        } else {
            self.rtt_baseline = self.rtt_baseline * RTT_BASELINE_EMA + rtt * (1.0 - RTT_BASELINE_EMA);
        }

        let rtt_threshold = (self.rtt_baseline * RTT_MULT) as i64;

        let mut congested = false;
        if rtt >= (self.srt_latency_ms / 3) as f64 {
            self.cur_bitrate = self.min_bitrate_bps;
            self.next_decr_ts = t + self.decr_interval;
            congested = true;
        } else if rtt > rtt_threshold as f64 || sample.buffer_size > BS_THRESHOLD {
            congested = true;
        }

        if congested && t > self.next_decr_ts {
            self.cur_bitrate = (self.cur_bitrate as f64 * self.decr_mult) as i64;
            self.next_decr_ts = t + self.decr_interval;
        } else if !congested && t > self.next_incr_ts {
            self.cur_bitrate += self.incr_step;
            self.next_incr_ts = t + self.incr_interval;
        }

        self.cur_bitrate = clamp(self.cur_bitrate, self.min_bitrate_bps, self.max_bitrate_bps);

        Decision {
            new_bitrate_bps: round_bitrate(self.cur_bitrate),
            throughput: 0.0,
            rtt_ms: rtt_int,
            rtt_th_min: self.rtt_baseline as i64,
            rtt_th_max: rtt_threshold,
            bs: sample.buffer_size,
            bs_th1: BS_THRESHOLD,
            bs_th2: BS_THRESHOLD,
            bs_th3: BS_THRESHOLD,
        }
    }
}
