//! Background subtraction for L1 pixel count data.
//!
//! The expected background counts in each time bin are the background
//! product's mean per-pixel count rate scaled by the bin's integration
//! duration, identical across all detectors. Channels outside the signal's
//! valid energy range are forced to exactly zero, not merely left
//! uncorrected.

use ndarray::{s, Array1, Array2, Array4, Axis, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sxcorr_core::time::utc2unix;
use sxcorr_core::{Error, L1Product, Result, N_DETECTORS, N_ENERGY_BINS, N_PIXELS};

/// Background-subtracted counts with propagated uncertainties.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BackgroundSubtraction {
    /// Signal counts minus scaled background counts, energy-masked.
    pub subtracted_counts: Array4<f64>,
    /// Propagated 1-sigma uncertainty of `subtracted_counts`.
    pub subtracted_counts_err: Array4<f64>,
    /// `subtracted_counts` reduced over the detector and pixel axes
    /// (time bin x energy channel).
    pub bkg_subtracted_spectrogram: Array2<f64>,
    time: Array1<f64>,
    timedel: Array1<f64>,
    t0_unix: f64,
    duration: f64,
}

impl BackgroundSubtraction {
    /// Subtract the expected background counts from a signal product.
    ///
    /// The uncertainty combines the Poisson error on the raw signal counts
    /// with the background-rate uncertainty scaled by the integration
    /// duration. Detector dead time is not folded into this model.
    ///
    /// # Errors
    /// Returns [`Error::IncompatibleEnergyRange`] if the background's valid
    /// energy range does not cover the signal's, or
    /// [`Error::ShapeMismatch`] if either product is malformed. Both checks
    /// run before any computation.
    pub fn new(signal: &L1Product, background: &L1Product) -> Result<Self> {
        signal.validate()?;
        background.validate()?;
        for channel in 0..N_ENERGY_BINS {
            if signal.energy_bin_mask[channel] && !background.energy_bin_mask[channel] {
                return Err(Error::IncompatibleEnergyRange { channel });
            }
        }

        let dim = signal.counts.raw_dim();
        let mut subtracted_counts = Array4::<f64>::zeros(dim);
        let mut subtracted_counts_err = Array4::<f64>::zeros(dim);

        let rate = &background.mean_pixel_rate_spectra;
        let rate_err = &background.mean_pixel_rate_spectra_err;
        let mask = &signal.energy_bin_mask;
        let timedel = &signal.timedel;

        // Time bins are independent; process them in parallel.
        Zip::indexed(subtracted_counts.outer_iter_mut())
            .and(subtracted_counts_err.outer_iter_mut())
            .and(signal.counts.outer_iter())
            .par_for_each(|t, mut sub, mut err, sig| {
                let dt = timedel[t];
                for d in 0..N_DETECTORS {
                    for p in 0..N_PIXELS {
                        for e in 0..N_ENERGY_BINS {
                            if !mask[e] {
                                // channel outside the signal range stays exactly zero
                                continue;
                            }
                            sub[[d, p, e]] = sig[[d, p, e]] - dt * rate[[p, e]];
                            let bkg_err = dt * rate_err[[p, e]];
                            err[[d, p, e]] = (sig[[d, p, e]] + bkg_err * bkg_err).sqrt();
                        }
                    }
                }
            });

        let bkg_subtracted_spectrogram = subtracted_counts.sum_axis(Axis(1)).sum_axis(Axis(1));

        Ok(Self {
            subtracted_counts,
            subtracted_counts_err,
            bkg_subtracted_spectrogram,
            time: signal.time.clone(),
            timedel: signal.timedel.clone(),
            t0_unix: signal.t0_unix,
            duration: signal.duration,
        })
    }

    /// Mean background-subtracted spectrum over a UTC time window.
    ///
    /// Returns the window-summed counts divided by the window's time span
    /// and the window errors combined in quadrature, both length-32
    /// spectra. The span is measured between the centers of the boundary
    /// bins plus half of each boundary bin's duration, so variable-width
    /// bins are handled exactly.
    ///
    /// Endpoints outside the product's time range select the first or last
    /// bin respectively; a window enclosing the whole product therefore
    /// reproduces the unwindowed mean. A window narrower than one bin snaps
    /// to the bin following its start.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTimeWindow`] when `start_utc` is after
    /// `end_utc`, or [`Error::InvalidTimestamp`] when an endpoint cannot be
    /// parsed.
    pub fn background_subtracted_spectrum(
        &self,
        start_utc: &str,
        end_utc: &str,
    ) -> Result<(Array1<f64>, Array1<f64>)> {
        let start_time = utc2unix(start_utc)? - self.t0_unix;
        let end_time = utc2unix(end_utc)? - self.t0_unix;
        if start_time > end_time {
            return Err(Error::InvalidTimeWindow {
                start: start_time,
                end: end_time,
            });
        }

        let n_bins = self.time.len();
        let start_i = if (0.0..=self.duration).contains(&start_time) {
            (0..n_bins)
                .find(|&i| self.time[i] - 0.5 * self.timedel[i] >= start_time)
                .unwrap_or(0)
        } else {
            0
        };
        let end_i = if (start_time..=self.duration).contains(&end_time) {
            (0..n_bins)
                .rev()
                .find(|&i| self.time[i] + 0.5 * self.timedel[i] <= end_time)
                .unwrap_or(start_i)
                .max(start_i)
        } else {
            n_bins - 1
        };

        let time_span = self.time[end_i] - self.time[start_i]
            + 0.5 * (self.timedel[start_i] + self.timedel[end_i]);

        let window = self.subtracted_counts.slice(s![start_i..=end_i, .., .., ..]);
        let spectrum = window.sum_axis(Axis(0)).sum_axis(Axis(0)).sum_axis(Axis(0)) / time_span;

        let window_err = self
            .subtracted_counts_err
            .slice(s![start_i..=end_i, .., .., ..]);
        let spectrum_err = window_err
            .mapv(|v| v * v)
            .sum_axis(Axis(0))
            .sum_axis(Axis(0))
            .sum_axis(Axis(0))
            .mapv(f64::sqrt)
            / time_span;

        Ok((spectrum, spectrum_err))
    }
}
