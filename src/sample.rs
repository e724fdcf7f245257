//! Per-tick telemetry input to the ABR.

use serde::{Deserialize, Serialize};

/// One telemetry tick from the reliable-UDP transport.
///
/// All fields are trusted as-is — spec invariants (non-negative buffer,
/// finite RTT, non-decreasing counters and timestamp) are the host's
/// responsibility to uphold; violating them is undefined behavior for the
/// algorithms, not a safety issue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Current send-side queue depth, in packets.
    pub buffer_size: i64,
    /// Most recent round-trip time, milliseconds. The sentinel value
    /// `100.0` means "no measurement" to the minimum-RTT tracker.
    pub rtt_ms: f64,
    /// Transport-reported instantaneous send rate, Mbps.
    pub send_rate_mbps: f64,
    /// Monotonic milliseconds; must be non-decreasing across calls to the
    /// same `Runner`.
    pub timestamp_ms: i64,
    /// Cumulative lost-packet counter (monotonic non-decreasing).
    pub pkt_loss_total: i64,
    /// Cumulative retransmitted-packet counter (monotonic non-decreasing).
    pub pkt_retrans_total: i64,
}
