//! Error types for sxcorr-core.

use thiserror::Error;

/// Result type alias for correction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for correction operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Detector index outside the instrument's 0..32 range.
    #[error("invalid detector index: {0}")]
    InvalidDetectorIndex(usize),

    /// Background product does not cover the signal's valid energy range.
    #[error("background energy range does not cover signal energy range (channel {channel})")]
    IncompatibleEnergyRange {
        /// First energy channel valid in the signal but not in the background.
        channel: usize,
    },

    /// Array axis lengths inconsistent with the instrument geometry.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Dead-time inversion produced a zero or non-finite live-time ratio.
    #[error("dead-time inversion failed: {0}")]
    DeadTimeInversion(String),

    /// Requested time window has its start after its end.
    #[error("invalid time window: start {start} s is after end {end} s")]
    InvalidTimeWindow {
        /// Window start, seconds relative to the product epoch.
        start: f64,
        /// Window end, seconds relative to the product epoch.
        end: f64,
    },

    /// Timestamp string that cannot be parsed as UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Detector pairing violating the partition or involution invariants.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
