//! Correction configuration.
//!
//! The dead-time constant and the trigger-group order are instrument
//! properties that have changed between ground-software revisions, so both
//! are explicit configuration rather than embedded literals.

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::topology::{DetectorGroup, DetectorTopology};

/// Per-event trigger dead time in seconds used by the current ground software.
pub const TRIGGER_DEAD_TIME_S: f64 = 14e-6;

/// Superseded dead-time value from the early calibration pipeline.
pub const TRIGGER_DEAD_TIME_LEGACY_S: f64 = 3.96e-6;

/// Configuration for detector-effect correction.
#[derive(Clone, Debug)]
pub struct CorrectionConfig {
    /// Non-paralyzable per-event dead time tau in seconds.
    pub trigger_dead_time_s: f64,
    /// Detector pairing mapping trigger-group indices to detector pairs.
    pub topology: DetectorTopology,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self::flight_defaults()
    }
}

// Intermediate structs for the JSON schema
#[derive(Deserialize)]
struct JsonConfig {
    correction: JsonCorrection,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonCorrection {
    trigger_dead_time_s: Option<f64>,
    trigger_groups: Option<Vec<[usize; 2]>>,
}

impl CorrectionConfig {
    /// Current dead-time constant and the flight detector pairing.
    #[must_use]
    pub fn flight_defaults() -> Self {
        Self {
            trigger_dead_time_s: TRIGGER_DEAD_TIME_S,
            topology: DetectorTopology::flight(),
        }
    }

    /// Set the dead-time constant.
    #[must_use]
    pub fn with_dead_time(mut self, tau_s: f64) -> Self {
        self.trigger_dead_time_s = tau_s;
        self
    }

    /// Set the detector pairing.
    #[must_use]
    pub fn with_topology(mut self, topology: DetectorTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Load configuration from a JSON file.
    ///
    /// Fields absent from the file fall back to the flight defaults; a
    /// custom pairing is validated at load time.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the JSON is malformed,
    /// or a custom pairing violates the topology invariants.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let json: JsonConfig =
            serde_json::from_reader(reader).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Self::from_json_config(json)
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a custom pairing
    /// violates the topology invariants.
    pub fn from_json(json: &str) -> Result<Self> {
        let json: JsonConfig =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Self::from_json_config(json)
    }

    fn from_json_config(config: JsonConfig) -> Result<Self> {
        let correction = config.correction;

        // Validate a custom pairing once at load time (not per operation)
        let topology = match correction.trigger_groups {
            Some(groups) => {
                let pairs: Vec<DetectorGroup> = groups.iter().map(|g| (g[0], g[1])).collect();
                DetectorTopology::new(&pairs)?
            }
            None => DetectorTopology::flight(),
        };

        Ok(Self {
            trigger_dead_time_s: correction
                .trigger_dead_time_s
                .unwrap_or(TRIGGER_DEAD_TIME_S),
            topology,
        })
    }
}
