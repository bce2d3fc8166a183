//! L1 science product interface types.
//!
//! An [`L1Product`] is produced by the data-retrieval layer and consumed
//! read-only by the correction algorithms. Counts are stored as `f64`
//! because rate and ratio divisions leave the integer domain.

use ndarray::{Array1, Array2, Array4};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{N_DETECTORS, N_ENERGY_BINS, N_PIXELS};

/// 4-D photon count array indexed by (time bin, detector, pixel, energy channel).
pub type CountArray = Array4<f64>;

/// One L1 science data product, time-ordered and aligned to the nominal
/// 32-channel energy grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct L1Product {
    /// Photon counts per (time bin, detector, pixel, energy channel).
    pub counts: CountArray,
    /// Integration duration of each time bin in seconds.
    pub timedel: Array1<f64>,
    /// Bin-center offsets from `t0_unix` in seconds.
    pub time: Array1<f64>,
    /// Channels validly measured by this product.
    pub energy_bin_mask: Array1<bool>,
    /// Mean background count rate per (pixel, energy channel) in counts/s.
    /// Detector-independent by construction of the background product.
    pub mean_pixel_rate_spectra: Array2<f64>,
    /// 1-sigma uncertainty of `mean_pixel_rate_spectra`.
    pub mean_pixel_rate_spectra_err: Array2<f64>,
    /// Reference epoch as Unix seconds.
    pub t0_unix: f64,
    /// Total time span covered by the product in seconds.
    pub duration: f64,
}

impl L1Product {
    /// Number of time bins in the product.
    #[must_use]
    pub fn n_time_bins(&self) -> usize {
        self.counts.shape()[0]
    }

    /// 0/1 weight vector that zeroes channels outside the valid energy range
    /// when multiplied onto a spectrum.
    #[must_use]
    pub fn inverse_energy_bin_mask(&self) -> Array1<f64> {
        self.energy_bin_mask
            .mapv(|valid| if valid { 1.0 } else { 0.0 })
    }

    /// Check every axis length against the instrument geometry.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] naming the first inconsistent axis.
    pub fn validate(&self) -> Result<()> {
        let (n_t, n_d, n_p, n_e) = self.counts.dim();
        if n_t == 0 {
            return Err(Error::ShapeMismatch(
                "product has no time bins".to_string(),
            ));
        }
        if n_d != N_DETECTORS || n_p != N_PIXELS || n_e != N_ENERGY_BINS {
            return Err(Error::ShapeMismatch(format!(
                "counts axes ({n_t}, {n_d}, {n_p}, {n_e}) do not match \
                 {N_DETECTORS} detectors x {N_PIXELS} pixels x {N_ENERGY_BINS} channels"
            )));
        }
        if self.timedel.len() != n_t {
            return Err(Error::ShapeMismatch(format!(
                "timedel has {} entries for {n_t} time bins",
                self.timedel.len()
            )));
        }
        if self.time.len() != n_t {
            return Err(Error::ShapeMismatch(format!(
                "time has {} entries for {n_t} time bins",
                self.time.len()
            )));
        }
        if self.energy_bin_mask.len() != N_ENERGY_BINS {
            return Err(Error::ShapeMismatch(format!(
                "energy bin mask has {} entries for {N_ENERGY_BINS} channels",
                self.energy_bin_mask.len()
            )));
        }
        for (name, spectra) in [
            ("mean pixel rate spectra", &self.mean_pixel_rate_spectra),
            (
                "mean pixel rate spectra error",
                &self.mean_pixel_rate_spectra_err,
            ),
        ] {
            if spectra.dim() != (N_PIXELS, N_ENERGY_BINS) {
                return Err(Error::ShapeMismatch(format!(
                    "{name} axes {:?} do not match {N_PIXELS} pixels x {N_ENERGY_BINS} channels",
                    spectra.dim()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(n_t: usize) -> L1Product {
        L1Product {
            counts: Array4::zeros((n_t, N_DETECTORS, N_PIXELS, N_ENERGY_BINS)),
            timedel: Array1::from_elem(n_t, 1.0),
            time: Array1::from_iter((0..n_t).map(|t| t as f64 + 0.5)),
            energy_bin_mask: Array1::from_elem(N_ENERGY_BINS, true),
            mean_pixel_rate_spectra: Array2::zeros((N_PIXELS, N_ENERGY_BINS)),
            mean_pixel_rate_spectra_err: Array2::zeros((N_PIXELS, N_ENERGY_BINS)),
            t0_unix: 0.0,
            duration: n_t as f64,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_product() {
        assert!(product(3).validate().is_ok());
        assert_eq!(product(3).n_time_bins(), 3);
    }

    #[test]
    fn test_validate_rejects_wrong_detector_axis() {
        let mut bad = product(2);
        bad.counts = Array4::zeros((2, 30, N_PIXELS, N_ENERGY_BINS));
        assert!(matches!(bad.validate(), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_validate_rejects_timedel_length_mismatch() {
        let mut bad = product(2);
        bad.timedel = Array1::from_elem(3, 1.0);
        assert!(matches!(bad.validate(), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_validate_rejects_wrong_rate_spectra_shape() {
        let mut bad = product(2);
        bad.mean_pixel_rate_spectra = Array2::zeros((N_PIXELS, 16));
        assert!(matches!(bad.validate(), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_inverse_energy_bin_mask() {
        let mut p = product(1);
        p.energy_bin_mask[5] = false;
        let inverse = p.inverse_energy_bin_mask();
        assert!((inverse[0] - 1.0).abs() < f64::EPSILON);
        assert!(inverse[5].abs() < f64::EPSILON);
    }
}
