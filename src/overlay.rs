//! Observability string formatting for the on-screen overlay.
//!
//! The layout is reproduced byte-exactly from the reference
//! implementation's `overlay_ui_update` for compatibility with existing
//! viewers; do not reformat it even if the column widths look odd.

use crate::decision::Decision;

pub fn format(decision: &Decision) -> String {
    format!(
        "  b: {:5}/{:5.0} rtt: {:3}/{:3}/{:3} bs: {:3}/{:3}/{:3}/{:3}",
        decision.new_bitrate_bps / 1000,
        decision.throughput,
        decision.rtt_ms,
        decision.rtt_th_min,
        decision.rtt_th_max,
        decision.bs,
        decision.bs_th1,
        decision.bs_th2,
        decision.bs_th3,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_layout_byte_exactly() {
        let decision = Decision {
            new_bitrate_bps: 4_200_000,
            throughput: 512.0,
            rtt_ms: 42,
            rtt_th_min: 10,
            rtt_th_max: 90,
            bs: 7,
            bs_th1: 50,
            bs_th2: 80,
            bs_th3: 200,
        };
        assert_eq!(
            format(&decision),
            "  b:  4200/  512 rtt:  42/ 10/ 90 bs:   7/ 50/ 80/200"
        );
    }
}
