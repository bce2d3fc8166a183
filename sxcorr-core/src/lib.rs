//! sxcorr-core: Core types for solar X-ray spectrometer count correction.
//!
//! This crate provides the foundational types for detector-effect
//! correction: the L1 science product data model, the fixed detector
//! pairing topology, correction configuration, and UTC/Unix time helpers.
//!

pub mod config;
pub mod error;
pub mod product;
pub mod time;
pub mod topology;

pub use config::{CorrectionConfig, TRIGGER_DEAD_TIME_LEGACY_S, TRIGGER_DEAD_TIME_S};
pub use error::{Error, Result};
pub use product::{CountArray, L1Product};
pub use topology::{DetectorGroup, DetectorTopology, TRIGGER_GROUPS};

/// Number of detectors in the imaging array.
pub const N_DETECTORS: usize = 32;

/// Number of pixels per detector.
pub const N_PIXELS: usize = 12;

/// Number of nominal energy channels.
pub const N_ENERGY_BINS: usize = 32;

/// Number of two-detector trigger groups.
pub const N_TRIGGER_GROUPS: usize = 16;
