//! The adaptive algorithm: a multi-threshold buffer/RTT/loss heuristic
//! with graduated responses, ported from belacoder/ceracoder's
//! `bitrate_control.c`. This is the default algorithm and the hardest
//! part of the controller — its correctness rests on the exact EMA/jitter
//! filter constants and the exact order of the decision ladder below.

use crate::config::{clamp, or_default_f64, or_default_i64, round_bitrate, Config};
use crate::decision::Decision;
use crate::filters::{DriftingMin, Ema, Jitter};
use crate::sample::Sample;

// Tunable defaults (spec.md §4.1). Config values of 0/negative fall back
// to these.
const INCR_STEP_DEFAULT: i64 = 30_000;
const INCR_SCALE: i64 = 30;
const DECR_STEP_DEFAULT: i64 = 100_000;
const DECR_SCALE: i64 = 10;
const INCR_INTERVAL_DEFAULT: i64 = 500;
const DECR_INTERVAL_DEFAULT: i64 = 200;
const DECR_FAST_INTERVAL: i64 = 250;

const EMA_SLOW: f64 = 0.99;
const EMA_RTT_DELTA: f64 = 0.80;
const EMA_THROUGHPUT: f64 = 0.97;
const EMA_LOSS: f64 = 0.90;

const RTT_MIN_DRIFT: f64 = 1.001;
const RTT_IGNORE: i64 = 100;
const RTT_INITIAL: i64 = 300;
const RTT_MIN_INITIAL: f64 = 200.0;

const BS_TH3_MULT: f64 = 4.0;
const BS_TH2_JITTER_MULT: f64 = 3.0;
const BS_TH1_JITTER_MULT: f64 = 2.5;
const BS_TH_MIN: f64 = 50.0;
const RTT_JITTER_MULT: f64 = 4.0;
const RTT_AVG_PCT: f64 = 0.15;
const RTT_STABLE_DELTA: f64 = 0.01;
const RTT_MIN_JITTER: f64 = 1.0;
const LOSS_RATE_THRESHOLD_DEFAULT: f64 = 0.5;

/// Owned mutable state for one adaptive-algorithm instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveState {
    min_bitrate_bps: i64,
    max_bitrate_bps: i64,
    srt_latency_ms: i64,
    srt_pkt_size_bytes: i64,

    incr_step: i64,
    decr_step: i64,
    incr_interval: i64,
    decr_interval: i64,
    loss_rate_threshold: f64,

    bs_avg: Ema,
    bs_jitter: Jitter,
    prev_bs: i64,

    rtt_avg: Ema,
    rtt_min: DriftingMin,
    rtt_jitter: Jitter,
    rtt_avg_delta: f64,
    prev_rtt: i64,

    throughput: f64,

    prev_loss: i64,
    prev_retrans: i64,
    loss_rate: f64,

    cur_bitrate: i64,
    next_incr_ts: i64,
    next_decr_ts: i64,
}

impl AdaptiveState {
    pub fn init(config: &Config) -> AdaptiveState {
        AdaptiveState {
            min_bitrate_bps: config.min_bitrate_bps,
            max_bitrate_bps: config.max_bitrate_bps,
            srt_latency_ms: config.srt_latency_ms,
            srt_pkt_size_bytes: config.srt_pkt_size_bytes.max(1),

            incr_step: or_default_i64(config.adaptive_incr_step_bps, INCR_STEP_DEFAULT),
            decr_step: or_default_i64(config.adaptive_decr_step_bps, DECR_STEP_DEFAULT),
            incr_interval: or_default_i64(config.adaptive_incr_interval_ms, INCR_INTERVAL_DEFAULT),
            decr_interval: or_default_i64(config.adaptive_decr_interval_ms, DECR_INTERVAL_DEFAULT),
            loss_rate_threshold: or_default_f64(
                config.adaptive_loss_threshold,
                LOSS_RATE_THRESHOLD_DEFAULT,
            ),

            bs_avg: Ema::default(),
            bs_jitter: Jitter::default(),
            prev_bs: 0,

            rtt_avg: Ema::default(),
            rtt_min: DriftingMin::new(RTT_MIN_INITIAL),
            rtt_jitter: Jitter::default(),
            rtt_avg_delta: 0.0,
            prev_rtt: RTT_INITIAL,

            throughput: 0.0,

            prev_loss: 0,
            prev_retrans: 0,
            loss_rate: 0.0,

            cur_bitrate: config.max_bitrate_bps,
            next_incr_ts: 0,
            next_decr_ts: 0,
        }
    }

    pub fn step(&mut self, _config: &Config, sample: &Sample) -> Decision {
        let bs = sample.buffer_size;
        let rtt = sample.rtt_ms;
        let rtt_int = rtt.trunc() as i64;
        let t = sample.timestamp_ms;

        // 1. Loss tracking.
        let delta_loss = sample.pkt_loss_total - self.prev_loss;
        let delta_retrans = sample.pkt_retrans_total - self.prev_retrans;
        self.prev_loss = sample.pkt_loss_total;
        self.prev_retrans = sample.pkt_retrans_total;
        if delta_loss > 0 || delta_retrans > 0 {
            let new_loss = (delta_loss + delta_retrans) as f64;
            self.loss_rate = EMA_LOSS * self.loss_rate + (1.0 - EMA_LOSS) * new_loss;
        } else {
            self.loss_rate *= EMA_LOSS;
        }
        let loss_congested = self.loss_rate > self.loss_rate_threshold;

        // 2. Buffer filter.
        self.bs_avg.update(EMA_SLOW, bs as f64);
        let delta_bs = (bs - self.prev_bs) as f64;
        self.bs_jitter.update(EMA_SLOW, delta_bs);
        self.prev_bs = bs;

        // 3. RTT filter.
        self.rtt_avg.update_seeded(EMA_SLOW, rtt);
        let delta_rtt = rtt - self.prev_rtt as f64;
        self.rtt_avg_delta = EMA_RTT_DELTA * self.rtt_avg_delta + (1.0 - EMA_RTT_DELTA) * delta_rtt;
        self.prev_rtt = rtt_int;
        let accept_min = rtt_int != RTT_IGNORE && self.rtt_avg_delta < 1.0;
        self.rtt_min.drift_and_maybe_update(RTT_MIN_DRIFT, rtt, accept_min);
        self.rtt_jitter.update(EMA_SLOW, delta_rtt);

        // 4. Throughput filter. The /1024 divisor is preserved verbatim
        // from the reference overlay (see spec.md §9 open questions).
        self.throughput = EMA_THROUGHPUT * self.throughput
            + (1.0 - EMA_THROUGHPUT) * (sample.send_rate_mbps * 1_000_000.0 / 1024.0);

        // 5. Thresholds.
        let bs_avg = self.bs_avg.value;
        let bs_jitter = self.bs_jitter.value;
        // Thresholds are truncated to integers here (as in the reference
        // implementation, where they are plain `int`s) so the ladder below
        // compares like-for-like against the truncated RTT/int buffer size.
        let bs_th3 = ((bs_avg + bs_jitter) * BS_TH3_MULT) as i64;
        let half_latency_bs =
            (self.throughput / 8.0) * (self.srt_latency_ms as f64 / 2.0) / self.srt_pkt_size_bytes as f64;
        let bs_th2 = (BS_TH_MIN.max(bs_avg + (bs_jitter * BS_TH2_JITTER_MULT).max(bs_avg)))
            .min(half_latency_bs) as i64;
        let bs_th1 = (BS_TH_MIN.max(bs_avg + bs_jitter * BS_TH1_JITTER_MULT)) as i64;
        let rtt_avg = self.rtt_avg.value;
        let rtt_th_max =
            (rtt_avg + (self.rtt_jitter.value * RTT_JITTER_MULT).max(rtt_avg * RTT_AVG_PCT)) as i64;
        let rtt_th_min = (self.rtt_min.value + RTT_MIN_JITTER.max(self.rtt_jitter.value * 2.0)) as i64;

        // 6. Decision ladder, first match wins.
        let mut br = self.cur_bitrate;
        if br > self.min_bitrate_bps && (rtt_int >= self.srt_latency_ms / 3 || bs > bs_th3) {
            // Emergency.
            br = self.min_bitrate_bps;
            self.next_decr_ts = t + self.decr_interval;
        } else if t > self.next_decr_ts
            && (rtt_int > self.srt_latency_ms / 5 || bs > bs_th2 || loss_congested)
        {
            // Heavy congestion.
            br -= self.decr_step + br / DECR_SCALE;
            self.next_decr_ts = t + DECR_FAST_INTERVAL;
        } else if t > self.next_decr_ts && (rtt_int > rtt_th_max || bs > bs_th1) {
            // Light congestion.
            br -= self.decr_step;
            self.next_decr_ts = t + self.decr_interval;
        } else if t > self.next_incr_ts
            && rtt_int < rtt_th_min
            && self.rtt_avg_delta < RTT_STABLE_DELTA
            && !loss_congested
        {
            // Grow.
            br += self.incr_step + br / INCR_SCALE;
            self.next_incr_ts = t + self.incr_interval;
        }

        // 7. Commit.
        br = clamp(br, self.min_bitrate_bps, self.max_bitrate_bps);
        self.cur_bitrate = br;

        Decision {
            new_bitrate_bps: round_bitrate(self.cur_bitrate),
            throughput: self.throughput,
            rtt_ms: rtt_int,
            rtt_th_min,
            rtt_th_max,
            bs,
            bs_th1,
            bs_th2,
            bs_th3,
        }
    }
}
