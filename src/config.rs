//! Analysis and preprocessing configuration.
//!
//! [`AnalysisConfig`] holds the binning used by the response/resolution
//! analysis and the 1-D distributions.  [`PreprocessConfig`] holds the
//! candidate-tensor settings used before the model is run.  All fields
//! have defaults that match the values used for the published comparison.
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Binning for the response and resolution analysis.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use meteval::AnalysisConfig;
///
/// let cfg = AnalysisConfig {
///     nbins:   10,      // 40 GeV bins
///     ..AnalysisConfig::default()
/// };
/// assert_eq!(cfg.bin_width(), 40.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of equal-width truth-magnitude bins over `[0, met_max]`.
    ///
    /// Default: `20`.
    pub nbins: usize,

    /// Upper edge of the truth-magnitude domain, in GeV.
    ///
    /// Events whose truth magnitude exceeds this value are left out of the
    /// per-bin statistics but still take the last bin's response correction.
    ///
    /// Default: `400.0`.
    pub met_max: f64,

    /// Number of bins of each 1-D distribution histogram.
    ///
    /// Default: `40`.
    pub hist_bins: usize,

    /// Half-range of the MET X / MET Y histograms, i.e. `[-r, r]`.
    /// The magnitude histogram uses `[0, met_max]`.
    ///
    /// Default: `400.0`.
    pub hist_xy_range: f64,
}

impl Default for AnalysisConfig {
    /// 20 bins over [0, 400] GeV, 40-bin histograms.
    fn default() -> Self {
        Self {
            nbins: 20,
            met_max: 400.0,
            hist_bins: 40,
            hist_xy_range: 400.0,
        }
    }
}

impl AnalysisConfig {
    /// Width of a single truth-magnitude bin.
    pub fn bin_width(&self) -> f64 {
        self.met_max / self.nbins as f64
    }

    /// The `nbins + 1` bin edges, `linspace(0, met_max, nbins + 1)`.
    ///
    /// ```
    /// use meteval::AnalysisConfig;
    /// let edges = AnalysisConfig::default().bin_edges();
    /// assert_eq!(edges.len(), 21);
    /// assert_eq!(edges[1], 20.0);
    /// assert_eq!(edges[20], 400.0);
    /// ```
    pub fn bin_edges(&self) -> Array1<f64> {
        crate::stats::linspace(0.0, self.met_max, self.nbins)
    }

    /// Reject configurations that cannot define a binning.
    pub fn validate(&self) -> Result<()> {
        if self.nbins == 0 || self.hist_bins == 0 {
            return Err(Error::InvalidParameter(format!(
                "bin counts must be positive (nbins={}, hist_bins={})",
                self.nbins, self.hist_bins
            )));
        }
        if !(self.met_max.is_finite() && self.met_max > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "met_max must be finite and > 0, got {}",
                self.met_max
            )));
        }
        if !(self.hist_xy_range.is_finite() && self.hist_xy_range > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "hist_xy_range must be finite and > 0, got {}",
                self.hist_xy_range
            )));
        }
        Ok(())
    }
}

/// Settings for turning raw candidate lists into model inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Divisor applied to the candidate momentum channels (pT, px, py).
    ///
    /// Must be finite and strictly positive.
    ///
    /// Default: `1.0` (no scaling).
    pub norm_fac: f32,

    /// Number of candidate slots per event.  Shorter events are padded,
    /// longer ones keep their first `max_candidates` candidates.
    ///
    /// Default: `100`.
    pub max_candidates: usize,

    /// Value written into empty candidate slots.
    ///
    /// Default: `0.0`.
    pub pad_value: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            norm_fac: 1.0,
            max_candidates: 100,
            pad_value: 0.0,
        }
    }
}

impl PreprocessConfig {
    /// Reject a non-positive or non-finite `norm_fac` and zero slots.
    pub fn validate(&self) -> Result<()> {
        if !(self.norm_fac.is_finite() && self.norm_fac > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "norm_fac must be finite and > 0, got {}",
                self.norm_fac
            )));
        }
        if self.max_candidates == 0 {
            return Err(Error::InvalidParameter("max_candidates must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_edges_are_20_gev_apart() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.bin_width(), 20.0);
        let edges = cfg.bin_edges();
        for (i, &e) in edges.iter().enumerate() {
            approx::assert_abs_diff_eq!(e, 20.0 * i as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_bins_rejected() {
        let cfg = AnalysisConfig { nbins: 0, ..AnalysisConfig::default() };
        assert!(matches!(cfg.validate(), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn non_positive_norm_fac_rejected() {
        for bad in [0.0_f32, -2.0, f32::NAN, f32::INFINITY] {
            let cfg = PreprocessConfig { norm_fac: bad, ..PreprocessConfig::default() };
            assert!(cfg.validate().is_err(), "norm_fac={bad} accepted");
        }
        assert!(PreprocessConfig::default().validate().is_ok());
    }
}
