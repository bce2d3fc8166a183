//! sxcorr-algorithms: Detector-effect correction algorithms.
//!
//! This crate provides the two correction stages for L1 pixel count data:
//!
//! - [`BackgroundSubtraction`] - subtract an independently measured
//!   background count rate and propagate uncertainties
//! - [`LiveTimeCorrection`] - invert trigger dead-time effects to recover
//!   true incident count rates
//!
//! The stages operate on the same count-array shape and are independent;
//! composition order is a caller decision.
#![warn(missing_docs)]

mod background;
mod livetime;

pub use background::BackgroundSubtraction;
pub use livetime::{LiveTimeCorrection, LiveTimeResult};

// Re-export core types for convenience
pub use sxcorr_core::{CorrectionConfig, CountArray, DetectorTopology, Error, L1Product, Result};
