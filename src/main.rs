//! ceracoder-abr — host shell around the adaptive bitrate controller.
//!
//! This binary stands in for the "host" spec.md assigns real I/O to: it
//! loads an INI config file (and optionally a legacy two-line bitrate
//! file), parses CLI flags, builds a [`ceracoder_abr::Runner`], and drives
//! it from either a recorded-sample file or a synthetic `--simulate`
//! generator — there being no real GStreamer pipeline or SRT client
//! available to this crate. It logs the overlay string and applies the
//! resulting bitrate to a stand-in "encoder handle" only when it changes.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ceracoder_abr::config::{self, Config, IniConfig};
use ceracoder_abr::overlay;
use ceracoder_abr::sample::Sample;
use ceracoder_abr::Runner;

/// Adaptive bitrate controller for a latency-bounded reliable UDP video
/// transport.
#[derive(Parser, Debug)]
#[command(name = "ceracoder-abr", about = "Adaptive bitrate controller host shell")]
struct Cli {
    /// INI-style configuration file. Defaults are used if absent.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Balancer algorithm override (bypasses the config file's `balancer` key).
    #[arg(short = 'a', long = "algorithm")]
    algorithm: Option<String>,

    /// Legacy two-line bitrate file (decimal bps, `min\nmax\n`). Overrides
    /// the config file's bitrate bounds when present.
    #[arg(short = 'b', long = "bitrate-file")]
    bitrate_file: Option<PathBuf>,

    /// SRT latency override, milliseconds, 100-10000.
    #[arg(short = 'l', long = "latency")]
    latency: Option<i64>,

    /// SRT packet size, bytes.
    #[arg(long = "pkt-size", default_value_t = 1316)]
    pkt_size: i64,

    /// Drive the runner from a synthetic sample generator instead of a
    /// recorded-sample file.
    #[arg(long)]
    simulate: bool,

    /// JSON-lines file of recorded `Sample`s to replay.
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Number of synthetic ticks to generate in `--simulate` mode.
    #[arg(long, default_value_t = 50)]
    ticks: u32,

    /// Re-read the config file and call `update_bounds` every N ticks
    /// (0 disables). Models the reload-on-SIGHUP contract without a real
    /// signal handler: the reload is triggered from this loop, never from
    /// a signal handler itself.
    #[arg(long, default_value_t = 0)]
    reload_every: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let ini = match &cli.config {
        Some(path) => IniConfig::load(path)?,
        None => IniConfig::default(),
    };

    let srt_latency_ms = cli.latency.unwrap_or(ini.srt_latency_ms);
    if !(100..=10_000).contains(&srt_latency_ms) {
        anyhow::bail!("invalid latency {srt_latency_ms}ms, must be between 100 and 10000");
    }

    let mut runner_config = ini.clone().into_runner_config(srt_latency_ms, cli.pkt_size);
    apply_bitrate_file_override(&cli, &mut runner_config)?;

    let mut runner = Runner::init(runner_config, cli.algorithm.as_deref(), &ini.balancer)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to initialize balancer");
            e
        })?;
    tracing::info!(
        algorithm = runner.name(),
        min_bps = runner_config.min_bitrate_bps,
        max_bps = runner_config.max_bitrate_bps,
        "ceracoder-abr starting"
    );

    let samples = load_samples(&cli)?;

    let mut last_applied: Option<i64> = None;
    for (tick, sample) in samples.iter().enumerate() {
        let decision = runner.step(sample);
        tracing::debug!(overlay = %overlay::format(&decision), "tick");

        if last_applied != Some(decision.new_bitrate_bps) {
            tracing::info!(
                old_bps = last_applied.unwrap_or(decision.new_bitrate_bps),
                new_bps = decision.new_bitrate_bps,
                "applying bitrate to encoder"
            );
            last_applied = Some(decision.new_bitrate_bps);
        }

        if cli.reload_every > 0 && (tick as u32 + 1) % cli.reload_every == 0 {
            if let Some(path) = &cli.config {
                match IniConfig::load(path) {
                    Ok(reloaded) => {
                        let min = reloaded.min_bitrate_kbps * 1000;
                        let max = reloaded.max_bitrate_kbps * 1000;
                        if let Err(e) = runner.update_bounds(min, max) {
                            tracing::warn!(error = %e, "reload rejected invalid bounds");
                        } else {
                            tracing::info!(min, max, "reloaded bounds from config");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to reload config"),
                }
            }
        }
    }

    runner.cleanup();
    Ok(())
}

fn apply_bitrate_file_override(cli: &Cli, config: &mut Config) -> anyhow::Result<()> {
    if let Some(path) = &cli.bitrate_file {
        let (min, max) = config::read_bitrate_file(path)?;
        config.min_bitrate_bps = min;
        config.max_bitrate_bps = max;
    }
    Ok(())
}

fn load_samples(cli: &Cli) -> anyhow::Result<Vec<Sample>> {
    if let Some(path) = &cli.samples {
        let text = std::fs::read_to_string(path)?;
        let samples = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str::<Sample>(l).map_err(anyhow::Error::from))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(samples)
    } else if cli.simulate {
        Ok(simulate_samples(cli.ticks))
    } else {
        anyhow::bail!("either --samples <file> or --simulate must be given")
    }
}

/// Synthetic samples for local smoke-testing: good conditions with small
/// jitter, occasionally interrupted by a burst of congestion, matching the
/// kind of trace a real bonded modem or cellular uplink would produce.
fn simulate_samples(ticks: u32) -> Vec<Sample> {
    use rand::Rng;
    let mut rng = rand::rng();

    let mut samples = Vec::with_capacity(ticks as usize);
    let mut t: i64 = 1000;
    let mut loss_total: i64 = 0;
    let mut retrans_total: i64 = 0;

    for i in 0..ticks {
        let congested_burst = i > 0 && i % 20 == 0;
        let (buffer_size, rtt_ms, send_rate_mbps) = if congested_burst {
            loss_total += rng.random_range(3..8);
            retrans_total += rng.random_range(1..4);
            (
                rng.random_range(150..400),
                rng.random_range(400.0..900.0),
                rng.random_range(0.5..2.0),
            )
        } else {
            (
                rng.random_range(2..15),
                rng.random_range(10.0..35.0),
                rng.random_range(4.0..6.0),
            )
        };

        samples.push(Sample {
            buffer_size,
            rtt_ms,
            send_rate_mbps,
            timestamp_ms: t,
            pkt_loss_total: loss_total,
            pkt_retrans_total: retrans_total,
        });
        t += 500;
    }

    samples
}
