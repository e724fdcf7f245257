//! Typed error surfaces for the ABR library.
//!
//! Kept separate from `anyhow`, which the binary uses at the process
//! boundary — library callers match on these variants (e.g. to print the
//! registry listing on an unknown algorithm name).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid bitrate line: {line:?}")]
    InvalidBitrate { line: String },
    #[error("bitrate {value} out of range [300000, 30000000]")]
    BitrateOutOfRange { value: i64 },
    #[error("bitrate file must contain exactly two lines (min, max)")]
    BitrateFileTruncated,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("unknown algorithm {requested:?}, available: {}", available.join(", "))]
    UnknownAlgorithm {
        requested: String,
        available: Vec<&'static str>,
    },
    #[error("invalid bounds: min ({min}) > max ({max})")]
    InvalidBounds { min: i64, max: i64 },
}
