//! Response and response-corrected resolution of two MET estimators.
//!
//! Given truth, estimator-under-test ("ml") and reference ("puppi") vectors,
//! all `[N, 2]` (x, y) and aligned by event:
//!
//!   1. Bin events by truth magnitude over `[0, met_max]` (`nbins` bins,
//!      last bin closed, out-of-domain events excluded from bin statistics).
//!   2. response[b] = ⟨|estimator|⟩_b / ⟨|truth|⟩_b
//!   3. Each event takes the response of its bin, clipping out-of-domain
//!      events to the nearest edge bin.
//!   4. residual_axis = truth_axis − estimator_axis · response
//!   5. resolution = (p84 − p16) / 2 of the residuals, per bin and over all
//!      events; error bar = resolution / √count.
//!
//! Empty bins yield NaN means, responses, resolutions and errors.  Those NaNs
//! are kept as-is, and an out-of-domain event that clips into an empty edge
//! bin carries NaN into the one-bin resolution too.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::coords::xy_to_pt_phi;
use crate::error::{expect_cols, Error, Result};
use crate::serde_utils::as_seq;
use crate::stats::{self, bin_index_clip, Binning};

/// Per-event response correction factor: the response of the bin holding
/// each event's truth magnitude, with clip-to-edge lookup.
///
/// # Errors
///
/// [`Error::Shape`] unless `edges` has at least two entries and `response`
/// holds one value per bin (`edges.len() - 1`).
pub fn response_correction(
    edges: ArrayView1<f64>,
    response: ArrayView1<f64>,
    truth_pt: ArrayView1<f64>,
) -> Result<Array1<f64>> {
    if edges.len() < 2 {
        return Err(Error::Shape {
            what: "bin edges",
            expected: "[nbins + 1] with nbins >= 1".into(),
            got: format!("{:?}", edges.shape()),
        });
    }
    if response.len() + 1 != edges.len() {
        return Err(Error::Shape {
            what: "response",
            expected: format!("[{}]", edges.len() - 1),
            got: format!("{:?}", response.shape()),
        });
    }
    Ok(truth_pt.mapv(|pt| response[bin_index_clip(edges, pt)]))
}

/// `truth − estimator · correction` on both axes, `[N, 2]`.
///
/// # Errors
///
/// [`Error::Shape`] if either vector series is not `[N, 2]`,
/// [`Error::LengthMismatch`] if the series or the correction differ in `N`.
pub fn corrected_residuals(
    truth_xy: ArrayView2<f64>,
    est_xy: ArrayView2<f64>,
    correction: ArrayView1<f64>,
) -> Result<Array2<f64>> {
    expect_cols("truth", &truth_xy, 2)?;
    expect_cols("estimator", &est_xy, 2)?;
    let n = truth_xy.nrows();
    for (what, rows) in [("truth / estimator", est_xy.nrows()), ("truth / correction", correction.len())] {
        if rows != n {
            return Err(Error::LengthMismatch { what, left: n, right: rows });
        }
    }
    let mut out = Array2::<f64>::zeros(truth_xy.raw_dim());
    Zip::from(out.rows_mut())
        .and(truth_xy.rows())
        .and(est_xy.rows())
        .and(&correction)
        .for_each(|mut o, t, e, &c| {
            o[0] = t[0] - e[0] * c;
            o[1] = t[1] - e[1] * c;
        });
    Ok(out)
}

/// Pair of per-axis quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XY {
    pub x: f64,
    pub y: f64,
}

/// Binned statistics of one estimator.
#[derive(Debug, Clone, Serialize)]
pub struct EstimatorBins {
    /// Mean estimator magnitude per bin.
    #[serde(serialize_with = "as_seq")]
    pub mean: Array1<f64>,
    /// `mean / truth_mean` per bin.
    #[serde(serialize_with = "as_seq")]
    pub response: Array1<f64>,
    /// Response-corrected resolution of the x residual.
    #[serde(serialize_with = "as_seq")]
    pub resol_x: Array1<f64>,
    /// Response-corrected resolution of the y residual.
    #[serde(serialize_with = "as_seq")]
    pub resol_y: Array1<f64>,
    /// `resol_x / √count`.
    #[serde(serialize_with = "as_seq")]
    pub resol_x_err: Array1<f64>,
    /// `resol_y / √count`.
    #[serde(serialize_with = "as_seq")]
    pub resol_y_err: Array1<f64>,
}

/// Per-bin table shared by both estimators.
#[derive(Debug, Clone, Serialize)]
pub struct BinTable {
    /// `nbins + 1` truth-magnitude edges.
    #[serde(serialize_with = "as_seq")]
    pub edges: Array1<f64>,
    /// In-domain events per bin.
    #[serde(serialize_with = "as_seq")]
    pub counts: Array1<usize>,
    /// Mean truth magnitude per bin.
    #[serde(serialize_with = "as_seq")]
    pub truth_mean: Array1<f64>,
    pub ml: EstimatorBins,
    pub puppi: EstimatorBins,
    /// `puppi.resol_x − ml.resol_x`; positive means the ML estimate is sharper.
    #[serde(serialize_with = "as_seq")]
    pub resol_x_dif: Array1<f64>,
    /// `puppi.resol_y − ml.resol_y`.
    #[serde(serialize_with = "as_seq")]
    pub resol_y_dif: Array1<f64>,
}

impl BinTable {
    pub fn nbins(&self) -> usize {
        self.counts.len()
    }

    pub fn lower_edges(&self) -> ArrayView1<'_, f64> {
        self.edges.slice(ndarray::s![..-1])
    }

    pub fn upper_edges(&self) -> ArrayView1<'_, f64> {
        self.edges.slice(ndarray::s![1..])
    }

    pub fn centers(&self) -> Array1<f64> {
        (&self.lower_edges() + &self.upper_edges()) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    /// `truth_mean / truth_mean`: 1 for populated bins, NaN for empty ones.
    pub fn truth_response(&self) -> Array1<f64> {
        &self.truth_mean / &self.truth_mean
    }
}

/// One-bin (whole-sample) resolutions and the headline differences.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionSummary {
    pub ml: XY,
    pub puppi: XY,
    /// `puppi.x − ml.x`
    pub x_res_avg_dif: f64,
    /// `puppi.y − ml.y`
    pub y_res_avg_dif: f64,
}

/// 1-D distributions of truth, ML and PUPPI.
#[derive(Debug, Clone, Serialize)]
pub struct Hist3 {
    pub lo: f64,
    pub hi: f64,
    #[serde(serialize_with = "as_seq")]
    pub truth: Array1<u64>,
    #[serde(serialize_with = "as_seq")]
    pub ml: Array1<u64>,
    #[serde(serialize_with = "as_seq")]
    pub puppi: Array1<u64>,
}

impl Hist3 {
    fn new(lo: f64, hi: f64, nbins: usize, t: ArrayView1<f64>, m: ArrayView1<f64>, p: ArrayView1<f64>) -> Self {
        Self {
            lo,
            hi,
            truth: stats::histogram(t, lo, hi, nbins),
            ml: stats::histogram(m, lo, hi, nbins),
            puppi: stats::histogram(p, lo, hi, nbins),
        }
    }
}

/// MET x, MET y and MET magnitude distributions.
#[derive(Debug, Clone, Serialize)]
pub struct Distributions {
    pub met_x: Hist3,
    pub met_y: Hist3,
    pub met_pt: Hist3,
}

/// Everything one analysis call produces.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub config: AnalysisConfig,
    pub n_events: usize,
    pub bins: BinTable,
    pub summary: ResolutionSummary,
    pub distributions: Distributions,
}

fn estimator_bins(
    binning: &Binning,
    truth_mean: &Array1<f64>,
    truth_xy: ArrayView2<f64>,
    truth_pt: ArrayView1<f64>,
    est_xy: ArrayView2<f64>,
    est_pt: ArrayView1<f64>,
) -> Result<(EstimatorBins, XY)> {
    let mean = binning.mean(est_pt);
    let response = &mean / truth_mean;
    let corr = response_correction(binning.edges(), response.view(), truth_pt)?;
    let resid = corrected_residuals(truth_xy, est_xy, corr.view())?;
    let (rx, ry) = (resid.column(0), resid.column(1));

    let resol_x = binning.apply(rx, stats::resolution);
    let resol_y = binning.apply(ry, stats::resolution);
    let root_n = binning.counts().mapv(|c| (c as f64).sqrt());
    let resol_x_err = &resol_x / &root_n;
    let resol_y_err = &resol_y / &root_n;

    let one_bin = XY {
        x: stats::resolution(&rx.to_vec()),
        y: stats::resolution(&ry.to_vec()),
    };
    let bins = EstimatorBins { mean, response, resol_x, resol_y, resol_x_err, resol_y_err };
    Ok((bins, one_bin))
}

/// Run the response / resolution comparison.
///
/// # Errors
///
/// * [`Error::Shape`] if any input is not `[N, 2]`.
/// * [`Error::LengthMismatch`] if the three inputs differ in `N`.
/// * [`Error::InvalidParameter`] if `cfg` fails [`AnalysisConfig::validate`].
///
/// # Examples
///
/// ```
/// use meteval::{analyze, AnalysisConfig};
/// use ndarray::array;
///
/// let cfg = AnalysisConfig { nbins: 1, ..AnalysisConfig::default() };
/// let r = analyze(
///     array![[100.0, 0.0]].view(),
///     array![[110.0, 0.0]].view(),
///     array![[90.0, 0.0]].view(),
///     &cfg,
/// ).unwrap();
/// assert!((r.bins.ml.response[0] - 1.1).abs() < 1e-12);
/// assert!((r.bins.puppi.response[0] - 0.9).abs() < 1e-12);
/// assert_eq!(r.bins.ml.resol_x[0], 0.0);
/// ```
pub fn analyze(
    truth_xy: ArrayView2<f64>,
    ml_xy: ArrayView2<f64>,
    puppi_xy: ArrayView2<f64>,
    cfg: &AnalysisConfig,
) -> Result<ResolutionReport> {
    cfg.validate()?;
    expect_cols("truth", &truth_xy, 2)?;
    expect_cols("ml", &ml_xy, 2)?;
    expect_cols("puppi", &puppi_xy, 2)?;
    let n = truth_xy.nrows();
    for (what, rows) in [("truth / ml", ml_xy.nrows()), ("truth / puppi", puppi_xy.nrows())] {
        if rows != n {
            return Err(Error::LengthMismatch { what, left: n, right: rows });
        }
    }

    let truth_pp = xy_to_pt_phi(truth_xy)?;
    let ml_pp = xy_to_pt_phi(ml_xy)?;
    let puppi_pp = xy_to_pt_phi(puppi_xy)?;
    let truth_pt = truth_pp.column(0);

    let binning = Binning::new(cfg.bin_edges(), truth_pt);
    let n_empty = binning.counts().iter().filter(|&&c| c == 0).count();
    debug!(events = n, nbins = binning.nbins(), met_max = cfg.met_max, "binning truth MET");
    if n_empty > 0 {
        warn!(n_empty, nbins = cfg.nbins, "empty truth-MET bins; their statistics are NaN");
    }
    if binning.n_outside() > 0 {
        warn!(
            n_outside = binning.n_outside(),
            met_max = cfg.met_max,
            "events outside the binning domain use the edge-bin response"
        );
    }

    let truth_mean = binning.mean(truth_pt);
    let (ml, ml_one) = estimator_bins(&binning, &truth_mean, truth_xy, truth_pt, ml_xy, ml_pp.column(0))?;
    let (puppi, puppi_one) =
        estimator_bins(&binning, &truth_mean, truth_xy, truth_pt, puppi_xy, puppi_pp.column(0))?;

    let summary = ResolutionSummary {
        ml: ml_one,
        puppi: puppi_one,
        x_res_avg_dif: puppi_one.x - ml_one.x,
        y_res_avg_dif: puppi_one.y - ml_one.y,
    };
    debug!(
        x_dif = summary.x_res_avg_dif,
        y_dif = summary.y_res_avg_dif,
        "one-bin resolution difference (puppi - ml)"
    );

    let bins = BinTable {
        edges: binning.edges().to_owned(),
        counts: binning.counts().to_owned(),
        truth_mean,
        resol_x_dif: &puppi.resol_x - &ml.resol_x,
        resol_y_dif: &puppi.resol_y - &ml.resol_y,
        ml,
        puppi,
    };

    let (r, nh) = (cfg.hist_xy_range, cfg.hist_bins);
    let distributions = Distributions {
        met_x: Hist3::new(-r, r, nh, truth_xy.column(0), ml_xy.column(0), puppi_xy.column(0)),
        met_y: Hist3::new(-r, r, nh, truth_xy.column(1), ml_xy.column(1), puppi_xy.column(1)),
        met_pt: Hist3::new(0.0, cfg.met_max, nh, truth_pt, ml_pp.column(0), puppi_pp.column(0)),
    };

    Ok(ResolutionReport {
        config: cfg.clone(),
        n_events: n,
        bins,
        summary,
        distributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn single_event_scenario() {
        let cfg = AnalysisConfig { nbins: 1, ..AnalysisConfig::default() };
        let truth = array![[100.0, 0.0]];
        let ml = array![[110.0, 0.0]];
        let puppi = array![[90.0, 0.0]];
        let r = analyze(truth.view(), ml.view(), puppi.view(), &cfg).unwrap();

        approx::assert_abs_diff_eq!(r.bins.ml.response[0], 1.1, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(r.bins.puppi.response[0], 0.9, epsilon = 1e-12);

        let corr = response_correction(r.bins.edges.view(), r.bins.ml.response.view(), array![100.0].view()).unwrap();
        let resid = corrected_residuals(truth.view(), ml.view(), corr.view()).unwrap();
        approx::assert_abs_diff_eq!(resid[[0, 0]], -21.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(resid[[0, 1]], 0.0);

        assert_eq!(r.bins.ml.resol_x[0], 0.0);
        assert_eq!(r.summary.ml.x, 0.0);
        assert_eq!(r.summary.x_res_avg_dif, 0.0);
        assert_eq!(r.bins.counts[0], 1);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let cfg = AnalysisConfig::default();
        let a = Array2::<f64>::ones((3, 2));
        let b = Array2::<f64>::ones((2, 2));
        let err = analyze(a.view(), a.view(), b.view(), &cfg);
        assert!(matches!(err, Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn puppi_length_mismatch_rejected() {
        let cfg = AnalysisConfig::default();
        let a = Array2::<f64>::ones((3, 2));
        let b = Array2::<f64>::ones((4, 2));
        match analyze(a.view(), a.view(), b.view(), &cfg) {
            Err(Error::LengthMismatch { what, left, right }) => {
                assert_eq!(what, "truth / puppi");
                assert_eq!((left, right), (3, 4));
            }
            other => panic!("expected LengthMismatch, got {other:?}"),
        }
    }

    #[test]
    fn residuals_reject_three_columns() {
        let a = Array2::<f64>::ones((2, 3));
        let corr = array![1.0, 1.0];
        let err = corrected_residuals(a.view(), a.view(), corr.view());
        assert!(matches!(err, Err(Error::Shape { what: "truth", .. })));
    }

    #[test]
    fn residuals_reject_row_mismatch() {
        let t = Array2::<f64>::ones((3, 2));
        let e = Array2::<f64>::ones((2, 2));
        let err = corrected_residuals(t.view(), e.view(), array![1.0, 1.0, 1.0].view());
        assert!(matches!(err, Err(Error::LengthMismatch { left: 3, right: 2, .. })));
        let err = corrected_residuals(t.view(), t.view(), array![1.0].view());
        assert!(matches!(err, Err(Error::LengthMismatch { what: "truth / correction", .. })));
    }

    #[test]
    fn correction_rejects_short_response() {
        let edges = array![0.0, 10.0, 20.0, 30.0];
        let err = response_correction(edges.view(), array![1.0, 1.0].view(), array![25.0].view());
        assert!(matches!(err, Err(Error::Shape { what: "response", .. })));
        let err = response_correction(array![0.0].view(), Array1::<f64>::zeros(0).view(), array![5.0].view());
        assert!(matches!(err, Err(Error::Shape { what: "bin edges", .. })));
    }

    #[test]
    fn wrong_width_rejected() {
        let cfg = AnalysisConfig::default();
        let a = Array2::<f64>::ones((3, 2));
        let b = Array2::<f64>::ones((3, 3));
        assert!(matches!(analyze(a.view(), b.view(), a.view(), &cfg), Err(Error::Shape { .. })));
    }

    #[test]
    fn empty_bins_are_nan() {
        let cfg = AnalysisConfig { nbins: 4, met_max: 40.0, ..AnalysisConfig::default() };
        // bins [0,10) [10,20) [20,30) [30,40]; only bin 1 populated
        let truth = array![[12.0, 0.0], [0.0, 15.0]];
        let r = analyze(truth.view(), truth.view(), truth.view(), &cfg).unwrap();
        assert_eq!(r.bins.counts.to_vec(), vec![0, 2, 0, 0]);
        for b in [0, 2, 3] {
            assert!(r.bins.truth_mean[b].is_nan());
            assert!(r.bins.ml.response[b].is_nan());
            assert!(r.bins.ml.resol_x[b].is_nan());
            assert!(r.bins.ml.resol_x_err[b].is_nan());
        }
        approx::assert_abs_diff_eq!(r.bins.ml.response[1], 1.0);
        assert!(r.bins.truth_response()[0].is_nan());
        assert_eq!(r.bins.truth_response()[1], 1.0);
    }

    #[test]
    fn overflow_event_takes_last_bin_response() {
        let cfg = AnalysisConfig { nbins: 2, met_max: 100.0, ..AnalysisConfig::default() };
        // event 2 (truth 500) is outside the domain: excluded from bin means,
        // corrected with bin 1's response
        let truth = array![[20.0, 0.0], [80.0, 0.0], [500.0, 0.0]];
        let ml = array![[20.0, 0.0], [40.0, 0.0], [0.0, 0.0]];
        let r = analyze(truth.view(), ml.view(), truth.view(), &cfg).unwrap();
        assert_eq!(r.bins.counts.to_vec(), vec![1, 1]);
        approx::assert_abs_diff_eq!(r.bins.truth_mean[1], 80.0);
        approx::assert_abs_diff_eq!(r.bins.ml.response[1], 0.5);

        let corr = response_correction(r.bins.edges.view(), r.bins.ml.response.view(), array![20.0, 80.0, 500.0].view()).unwrap();
        assert_eq!(corr.to_vec(), vec![1.0, 0.5, 0.5]);
    }

    #[test]
    fn overflow_into_empty_edge_bin_propagates_nan() {
        let cfg = AnalysisConfig { nbins: 2, met_max: 100.0, ..AnalysisConfig::default() };
        let truth = array![[20.0, 0.0], [30.0, 0.0], [500.0, 0.0]];
        let r = analyze(truth.view(), truth.view(), truth.view(), &cfg).unwrap();
        assert!(r.bins.ml.response[1].is_nan());
        assert!(r.summary.ml.x.is_nan());
        assert_eq!(r.bins.ml.resol_x[0], 0.0);
    }

    #[test]
    fn bin_geometry() {
        let cfg = AnalysisConfig::default();
        let v = array![[10.0, 10.0]];
        let r = analyze(v.view(), v.view(), v.view(), &cfg).unwrap();
        assert_eq!(r.bins.nbins(), 20);
        assert_eq!(r.bins.width(), 20.0);
        assert_eq!(r.bins.centers()[0], 10.0);
        assert_eq!(r.bins.lower_edges().len(), 20);
        assert_eq!(r.bins.upper_edges()[19], 400.0);
    }
}
