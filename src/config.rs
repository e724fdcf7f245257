//! The `Config` carrier the `Runner` composes and hands to algorithm
//! `init`, plus the INI-file loader that produces one from the on-disk
//! configuration format described in spec.md §6.
//!
//! Every numeric tunable follows the "0 or negative means use the
//! algorithm's own default" convention from the reference implementation —
//! algorithms apply their defaults internally rather than `Config` baking
//! them in, so a freshly-`Default`-ed `Config` round-trips through JSON
//! without surprises.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Round a bitrate down to the nearest multiple of 100_000 bps.
pub fn round_bitrate(bps: i64) -> i64 {
    (bps / 100_000) * 100_000
}

/// Clamp `value` into `[lo, hi]`.
pub fn clamp(value: i64, lo: i64, hi: i64) -> i64 {
    value.max(lo).min(hi)
}

/// Bounds and per-algorithm tunables handed to `Runner::init` and, through
/// it, to each algorithm's `init`. Immutable for the lifetime of a
/// `Runner` except via `Runner::update_bounds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub min_bitrate_bps: i64,
    pub max_bitrate_bps: i64,
    pub srt_latency_ms: i64,
    pub srt_pkt_size_bytes: i64,

    // Adaptive tunables (bps / ms / ratio). 0 or negative = algorithm default.
    pub adaptive_incr_step_bps: i64,
    pub adaptive_decr_step_bps: i64,
    pub adaptive_incr_interval_ms: i64,
    pub adaptive_decr_interval_ms: i64,
    pub adaptive_loss_threshold: f64,

    // AIMD tunables.
    pub aimd_incr_step_bps: i64,
    pub aimd_decr_mult: f64,
    pub aimd_incr_interval_ms: i64,
    pub aimd_decr_interval_ms: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_bitrate_bps: 300_000,
            max_bitrate_bps: 6_000_000,
            srt_latency_ms: 2000,
            srt_pkt_size_bytes: 1316,
            adaptive_incr_step_bps: 0,
            adaptive_decr_step_bps: 0,
            adaptive_incr_interval_ms: 0,
            adaptive_decr_interval_ms: 0,
            adaptive_loss_threshold: 0.0,
            aimd_incr_step_bps: 0,
            aimd_decr_mult: 0.0,
            aimd_incr_interval_ms: 0,
            aimd_decr_interval_ms: 0,
        }
    }
}

/// `if value > 0 { value } else { default }`, the convention the reference
/// implementation uses for every overridable tunable.
pub(crate) fn or_default_i64(value: i64, default: i64) -> i64 {
    if value > 0 {
        value
    } else {
        default
    }
}

pub(crate) fn or_default_f64(value: f64, default: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        default
    }
}

/// The on-disk representation: `[general]`, `[srt]`, `[adaptive]`, `[aimd]`
/// sections with kbps/ms tunables, matching spec.md §6 verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct IniConfig {
    pub min_bitrate_kbps: i64,
    pub max_bitrate_kbps: i64,
    pub balancer: String,
    pub srt_latency_ms: i64,
    pub adaptive_incr_step_kbps: i64,
    pub adaptive_decr_step_kbps: i64,
    pub adaptive_incr_interval_ms: i64,
    pub adaptive_decr_interval_ms: i64,
    pub adaptive_loss_threshold: f64,
    pub aimd_incr_step_kbps: i64,
    pub aimd_decr_mult: f64,
    pub aimd_incr_interval_ms: i64,
    pub aimd_decr_interval_ms: i64,
}

impl Default for IniConfig {
    fn default() -> Self {
        IniConfig {
            min_bitrate_kbps: 300,
            max_bitrate_kbps: 6000,
            balancer: "adaptive".to_string(),
            srt_latency_ms: 2000,
            adaptive_incr_step_kbps: 30,
            adaptive_decr_step_kbps: 100,
            adaptive_incr_interval_ms: 500,
            adaptive_decr_interval_ms: 200,
            adaptive_loss_threshold: 0.5,
            aimd_incr_step_kbps: 50,
            aimd_decr_mult: 0.75,
            aimd_incr_interval_ms: 500,
            aimd_decr_interval_ms: 200,
        }
    }
}

impl IniConfig {
    /// Parse an INI-style file per spec.md §6's lexical rules: `#`/`;`
    /// comments, blank lines ignored, `[section]` headers on their own
    /// line, `key = value` split on the first `=` with both sides
    /// trimmed, unknown sections/keys silently ignored. The default
    /// section before any header is `general`.
    pub fn load(path: impl AsRef<Path>) -> Result<IniConfig, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> IniConfig {
        let mut cfg = IniConfig::default();
        let mut section = "general".to_string();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(stripped) = line.strip_prefix('[') {
                if let Some(end) = stripped.find(']') {
                    section = stripped[..end].to_string();
                }
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            apply_key(&mut cfg, &section, key, value);
        }

        cfg
    }

    /// Compose the algorithm-facing `Config`, converting kbps→bps the way
    /// `Runner::init` is specified to.
    pub fn into_runner_config(self, srt_latency_ms: i64, srt_pkt_size_bytes: i64) -> Config {
        Config {
            min_bitrate_bps: self.min_bitrate_kbps * 1000,
            max_bitrate_bps: self.max_bitrate_kbps * 1000,
            srt_latency_ms,
            srt_pkt_size_bytes,
            adaptive_incr_step_bps: self.adaptive_incr_step_kbps * 1000,
            adaptive_decr_step_bps: self.adaptive_decr_step_kbps * 1000,
            adaptive_incr_interval_ms: self.adaptive_incr_interval_ms,
            adaptive_decr_interval_ms: self.adaptive_decr_interval_ms,
            adaptive_loss_threshold: self.adaptive_loss_threshold,
            aimd_incr_step_bps: self.aimd_incr_step_kbps * 1000,
            aimd_decr_mult: self.aimd_decr_mult,
            aimd_incr_interval_ms: self.aimd_incr_interval_ms,
            aimd_decr_interval_ms: self.aimd_decr_interval_ms,
        }
    }
}

fn apply_key(cfg: &mut IniConfig, section: &str, key: &str, value: &str) {
    match (section, key) {
        ("general", "min_bitrate") => cfg.min_bitrate_kbps = value.parse().unwrap_or(cfg.min_bitrate_kbps),
        ("general", "max_bitrate") => cfg.max_bitrate_kbps = value.parse().unwrap_or(cfg.max_bitrate_kbps),
        ("general", "balancer") => cfg.balancer = value.to_string(),
        ("srt", "latency") => cfg.srt_latency_ms = value.parse().unwrap_or(cfg.srt_latency_ms),
        ("adaptive", "incr_step") => {
            cfg.adaptive_incr_step_kbps = value.parse().unwrap_or(cfg.adaptive_incr_step_kbps)
        }
        ("adaptive", "decr_step") => {
            cfg.adaptive_decr_step_kbps = value.parse().unwrap_or(cfg.adaptive_decr_step_kbps)
        }
        ("adaptive", "incr_interval") => {
            cfg.adaptive_incr_interval_ms = value.parse().unwrap_or(cfg.adaptive_incr_interval_ms)
        }
        ("adaptive", "decr_interval") => {
            cfg.adaptive_decr_interval_ms = value.parse().unwrap_or(cfg.adaptive_decr_interval_ms)
        }
        ("adaptive", "loss_threshold") => {
            cfg.adaptive_loss_threshold = value.parse().unwrap_or(cfg.adaptive_loss_threshold)
        }
        ("aimd", "incr_step") => cfg.aimd_incr_step_kbps = value.parse().unwrap_or(cfg.aimd_incr_step_kbps),
        ("aimd", "decr_mult") => cfg.aimd_decr_mult = value.parse().unwrap_or(cfg.aimd_decr_mult),
        ("aimd", "incr_interval") => {
            cfg.aimd_incr_interval_ms = value.parse().unwrap_or(cfg.aimd_incr_interval_ms)
        }
        ("aimd", "decr_interval") => {
            cfg.aimd_decr_interval_ms = value.parse().unwrap_or(cfg.aimd_decr_interval_ms)
        }
        _ => {} // unknown section/key: silently ignored
    }
}

/// Legacy two-line bitrate file: decimal bps, `min\nmax\n`, each bounded
/// to `[300_000, 30_000_000]`.
pub fn read_bitrate_file(path: impl AsRef<Path>) -> Result<(i64, i64), ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut lines = text.lines();
    let min_line = lines.next().ok_or(ConfigError::BitrateFileTruncated)?;
    let max_line = lines.next().ok_or(ConfigError::BitrateFileTruncated)?;
    let min = parse_bitrate_line(min_line)?;
    let max = parse_bitrate_line(max_line)?;
    Ok((min, max))
}

fn parse_bitrate_line(line: &str) -> Result<i64, ConfigError> {
    let value: i64 = line
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidBitrate {
            line: line.to_string(),
        })?;
    if !(300_000..=30_000_000).contains(&value) {
        return Err(ConfigError::BitrateOutOfRange { value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_bitrate_floors_to_100kbps_multiple() {
        assert_eq!(round_bitrate(4_567_890), 4_500_000);
        assert_eq!(round_bitrate(4_000_000), 4_000_000);
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = Config::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let reloaded: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, reloaded);
    }

    #[test]
    fn ini_parser_honors_comments_sections_and_unknown_keys() {
        let text = "\
# top-level comment
[general]
min_bitrate = 500    ; inline-ish comment on its own line above
max_bitrate = 8000
balancer = aimd
unknown_key = ignored

[srt]
latency = 3000

[bogus_section]
whatever = 1

[adaptive]
incr_step = 40
loss_threshold = 0.3
";
        let cfg = IniConfig::parse(text);
        assert_eq!(cfg.min_bitrate_kbps, 500);
        assert_eq!(cfg.max_bitrate_kbps, 8000);
        assert_eq!(cfg.balancer, "aimd");
        assert_eq!(cfg.srt_latency_ms, 3000);
        assert_eq!(cfg.adaptive_incr_step_kbps, 40);
        assert_eq!(cfg.adaptive_loss_threshold, 0.3);
        // untouched defaults
        assert_eq!(cfg.aimd_incr_step_kbps, 50);
    }

    #[test]
    fn into_runner_config_converts_kbps_to_bps() {
        let ini = IniConfig {
            min_bitrate_kbps: 500,
            max_bitrate_kbps: 6000,
            ..IniConfig::default()
        };
        let cfg = ini.into_runner_config(2000, 1316);
        assert_eq!(cfg.min_bitrate_bps, 500_000);
        assert_eq!(cfg.max_bitrate_bps, 6_000_000);
        assert_eq!(cfg.srt_latency_ms, 2000);
    }

    #[test]
    fn legacy_bitrate_file_rejects_out_of_range_values() {
        assert!(matches!(
            parse_bitrate_line("299999"),
            Err(ConfigError::BitrateOutOfRange { value: 299_999 })
        ));
        assert!(matches!(
            parse_bitrate_line("30000001"),
            Err(ConfigError::BitrateOutOfRange { value: 30_000_001 })
        ));
        assert!(parse_bitrate_line("300000").is_ok());
        assert!(parse_bitrate_line("30000000").is_ok());
    }

    #[test]
    fn legacy_bitrate_file_rejects_garbage() {
        assert!(matches!(
            parse_bitrate_line("not-a-number"),
            Err(ConfigError::InvalidBitrate { .. })
        ));
    }
}
