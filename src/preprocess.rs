//! Candidate tensor → model input groups.
//!
//! Input `[N, M, ≥8]`, channels in fixed order:
//!
//! ```text
//!   0 pt      1 px      2 py      3 eta
//!   4 phi     5 puppi weight      6 encoded pdgId   7 encoded charge
//! ```
//!
//! pt, px and py are divided by `norm_fac`; afterwards each of the three is
//! independently zeroed where `|v| > 500`.  The output is split into the
//! rotation-invariant scalars, the rotation-equivariant (px, py) pair and the
//! two categorical codes.
use ndarray::{s, Array3, ArrayView3};
use tracing::debug;

use crate::error::{Error, Result};

/// Normalised momenta above this magnitude are zeroed.
pub const OUTLIER_THRESHOLD: f32 = 500.0;

/// Minimum channel count of the raw candidate tensor.
pub const N_INPUT_CHANNELS: usize = 8;

pub const CH_PT: usize = 0;
pub const CH_PX: usize = 1;
pub const CH_PY: usize = 2;
pub const CH_ETA: usize = 3;
pub const CH_PHI: usize = 4;
pub const CH_PUPPI: usize = 5;
pub const CH_PDG_ID: usize = 6;
pub const CH_CHARGE: usize = 7;

/// The four tensors handed to the model.
#[derive(Debug, Clone)]
pub struct ModelInputs {
    /// `[N, M, 4]`: pt / norm, eta, phi, puppi weight.
    pub continuous: Array3<f32>,
    /// `[N, M, 2]`: px / norm, py / norm.
    pub pxpy: Array3<f32>,
    /// `[N, M, 1]`: encoded particle type.
    pub pdg_id: Array3<f32>,
    /// `[N, M, 1]`: encoded charge.
    pub charge: Array3<f32>,
}

#[inline]
fn scale_and_clamp(v: f32, norm_fac: f32) -> f32 {
    let n = v / norm_fac;
    if n.abs() > OUTLIER_THRESHOLD { 0.0 } else { n }
}

/// Build the model inputs from a dense candidate tensor.
///
/// # Errors
///
/// [`Error::Shape`] if there are fewer than 8 channels,
/// [`Error::InvalidParameter`] unless `norm_fac` is finite and `> 0`.
///
/// # Examples
///
/// ```
/// use meteval::preprocess::preprocess;
/// use ndarray::Array3;
///
/// let mut a = Array3::<f32>::zeros((1, 2, 8));
/// a[[0, 0, 0]] = 40.0;    // pt
/// a[[0, 1, 1]] = 9000.0;  // px, an outlier after /10
/// let inputs = preprocess(a.view(), 10.0).unwrap();
/// assert_eq!(inputs.continuous[[0, 0, 0]], 4.0);
/// assert_eq!(inputs.pxpy[[0, 1, 0]], 0.0);
/// ```
pub fn preprocess(a: ArrayView3<f32>, norm_fac: f32) -> Result<ModelInputs> {
    let (n_ev, n_cand, n_ch) = a.dim();
    if n_ch < N_INPUT_CHANNELS {
        return Err(Error::Shape {
            what: "candidate tensor",
            expected: format!("[N, M, >={N_INPUT_CHANNELS}]"),
            got: format!("{:?}", a.shape()),
        });
    }
    if !(norm_fac.is_finite() && norm_fac > 0.0) {
        return Err(Error::InvalidParameter(format!(
            "norm_fac must be finite and > 0, got {norm_fac}"
        )));
    }
    debug!(events = n_ev, candidates = n_cand, norm_fac, "preprocessing candidates");

    let pt = a.slice(s![.., .., CH_PT..=CH_PT]).mapv(|v| scale_and_clamp(v, norm_fac));
    let pxpy = a.slice(s![.., .., CH_PX..=CH_PY]).mapv(|v| scale_and_clamp(v, norm_fac));

    let mut continuous = Array3::<f32>::zeros((n_ev, n_cand, 4));
    continuous.slice_mut(s![.., .., 0..1]).assign(&pt);
    continuous
        .slice_mut(s![.., .., 1..4])
        .assign(&a.slice(s![.., .., CH_ETA..=CH_PUPPI]));

    let pdg_id = a.slice(s![.., .., CH_PDG_ID..=CH_PDG_ID]).to_owned();
    let charge = a.slice(s![.., .., CH_CHARGE..=CH_CHARGE]).to_owned();

    Ok(ModelInputs { continuous, pxpy, pdg_id, charge })
}
