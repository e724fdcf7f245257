//! Per-tick ABR output.

use serde::{Deserialize, Serialize};

/// The algorithm's set-point plus diagnostic fields for the overlay.
///
/// The diagnostic fields have no semantic contract beyond being
/// monotone-meaningful for the operator glancing at the overlay; only
/// `new_bitrate_bps` is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// The new encoder target, rounded down to a multiple of 100_000 and
    /// clamped to `[min_bitrate_bps, max_bitrate_bps]`.
    pub new_bitrate_bps: i64,
    /// Smoothed throughput estimate (same units the original overlay used:
    /// Mbps converted via `* 1_000_000 / 1024`, preserved verbatim).
    pub throughput: f64,
    /// Current RTT, truncated to an integer millisecond.
    pub rtt_ms: i64,
    /// Lower RTT threshold below which the algorithm considers growing.
    pub rtt_th_min: i64,
    /// Upper RTT threshold above which the algorithm considers shedding.
    pub rtt_th_max: i64,
    /// Current buffer occupancy, packets.
    pub bs: i64,
    /// Light-congestion buffer threshold.
    pub bs_th1: i64,
    /// Medium-congestion buffer threshold.
    pub bs_th2: i64,
    /// Heavy-congestion buffer threshold.
    pub bs_th3: i64,
}
