//! Trigger dead-time / live-time correction.
//!
//! The instrument accumulates trigger counts per two-detector group. A
//! non-paralyzable dead-time model recovers the true incident photon rate
//! from the observed triggers, and the resulting per-group live-time ratio
//! scales the observed count rates of both sibling detectors.

use ndarray::{s, Array1, Array2, Array4, Zip};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sxcorr_core::{
    CorrectionConfig, CountArray, Error, Result, N_DETECTORS, N_ENERGY_BINS, N_PIXELS,
};

/// Result of a live-time correction pass.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiveTimeResult {
    /// Live-time ratio per (time bin, detector). Sibling detectors share
    /// one trigger line and therefore one ratio.
    pub live_time_ratio: Array2<f64>,
    /// Dead-time corrected count rate in counts/s.
    pub corrected_count_rate: CountArray,
    /// Observed count rate with no dead-time correction, counts/s.
    pub raw_count_rate: CountArray,
}

/// Live-time correction using a non-paralyzable dead-time model.
#[derive(Clone, Debug, Default)]
pub struct LiveTimeCorrection {
    config: CorrectionConfig,
}

impl LiveTimeCorrection {
    /// Create with a custom configuration.
    #[must_use]
    pub fn new(config: CorrectionConfig) -> Self {
        Self { config }
    }

    /// Create with the current dead-time constant and the flight pairing.
    #[must_use]
    pub fn with_flight_defaults() -> Self {
        Self::new(CorrectionConfig::flight_defaults())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    /// Correct observed count rates for trigger dead time.
    ///
    /// `triggers` holds per-group trigger counts (time bin x group) in the
    /// same group order as the configured topology; `counts` is the 4-D
    /// count array and `time_bins` the per-bin integration durations.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if the axis lengths disagree, and
    /// [`Error::DeadTimeInversion`] if a bin's trigger count implies the
    /// detector pair was dead for the entire bin or a live-time ratio comes
    /// out zero or non-finite. No `inf`/`NaN` is ever propagated into the
    /// corrected rates.
    pub fn correct(
        &self,
        triggers: &Array2<f64>,
        counts: &CountArray,
        time_bins: &Array1<f64>,
    ) -> Result<LiveTimeResult> {
        let topology = &self.config.topology;
        let tau = self.config.trigger_dead_time_s;
        let n_groups = topology.n_groups();
        let n_t = time_bins.len();

        let (c_t, c_d, c_p, c_e) = counts.dim();
        if c_t != n_t || c_d != N_DETECTORS || c_p != N_PIXELS || c_e != N_ENERGY_BINS {
            return Err(Error::ShapeMismatch(format!(
                "counts axes ({c_t}, {c_d}, {c_p}, {c_e}) do not match {n_t} time bins x \
                 {N_DETECTORS} detectors x {N_PIXELS} pixels x {N_ENERGY_BINS} channels"
            )));
        }
        let (g_t, g_g) = triggers.dim();
        if g_t != n_t || g_g != n_groups {
            return Err(Error::ShapeMismatch(format!(
                "trigger axes ({g_t}, {g_g}) do not match {n_t} time bins x {n_groups} groups"
            )));
        }

        // True incident rate per trigger group. A non-positive live time
        // means the pair was dead for the whole bin.
        let mut photons_in = Array2::<f64>::zeros((n_t, n_groups));
        for t in 0..n_t {
            for g in 0..n_groups {
                let live = time_bins[t] - tau * triggers[[t, g]];
                if live <= 0.0 {
                    return Err(Error::DeadTimeInversion(format!(
                        "trigger count {} saturates the {} s bin {t} for group {g}",
                        triggers[[t, g]],
                        time_bins[t]
                    )));
                }
                photons_in[[t, g]] = triggers[[t, g]] / live;
            }
        }

        // Observed rate, no dead-time correction.
        let mut raw_count_rate = Array4::<f64>::zeros(counts.raw_dim());
        Zip::indexed(raw_count_rate.outer_iter_mut())
            .and(counts.outer_iter())
            .par_for_each(|t, mut raw, observed| {
                let dt = time_bins[t];
                raw.assign(&observed.mapv(|c| c / dt));
            });

        // One ratio column per group; groups are independent.
        let ratio_columns = topology
            .groups()
            .par_iter()
            .enumerate()
            .map(|(g, &(det1, det2))| {
                let mut column = vec![0.0; n_t];
                for (t, value) in column.iter_mut().enumerate() {
                    let group_counts = counts.slice(s![t, det1, .., ..]).sum()
                        + counts.slice(s![t, det2, .., ..]).sum();
                    let ratio = group_counts / photons_in[[t, g]];
                    if !ratio.is_finite() || ratio <= 0.0 {
                        return Err(Error::DeadTimeInversion(format!(
                            "live-time ratio {ratio} for group {g} in bin {t}"
                        )));
                    }
                    *value = ratio;
                }
                Ok((g, column))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut live_time_ratio = Array2::<f64>::zeros((n_t, N_DETECTORS));
        for (g, column) in ratio_columns {
            let (det1, det2) = topology.groups()[g];
            for (t, &ratio) in column.iter().enumerate() {
                live_time_ratio[[t, det1]] = ratio;
                live_time_ratio[[t, det2]] = ratio;
            }
        }

        // Broadcast the per-detector ratio over the pixel and energy axes.
        // Ratios are already validated finite and positive.
        let mut corrected_count_rate = Array4::<f64>::zeros(counts.raw_dim());
        Zip::indexed(corrected_count_rate.outer_iter_mut())
            .and(raw_count_rate.outer_iter())
            .par_for_each(|t, mut corrected, raw| {
                for d in 0..N_DETECTORS {
                    let ratio = live_time_ratio[[t, d]];
                    for p in 0..N_PIXELS {
                        for e in 0..N_ENERGY_BINS {
                            corrected[[d, p, e]] = raw[[d, p, e]] / ratio;
                        }
                    }
                }
            });

        Ok(LiveTimeResult {
            live_time_ratio,
            corrected_count_rate,
            raw_count_rate,
        })
    }
}
