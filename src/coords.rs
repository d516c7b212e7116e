//! Cartesian ↔ polar conversion of per-event 2-D vectors.
//!
//! `xy_to_pt_phi`:  `[N, 2]` (x, y)  →  `[N, 2]` (pt, phi)
//!   pt  = sqrt(x² + y²)
//!   phi = sign(y) · acos(x / pt),   phi ∈ (−π, π]
//!
//! `sign(y)` is taken as +1 for `y = 0`, so a vector on the negative x-axis
//! gets `phi = π`.  A zero vector gets `phi = 0`.
use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{expect_cols, Result};

/// Azimuth of a single `(x, y)` vector with magnitude `pt`.
#[inline]
pub fn phi_of(x: f64, y: f64, pt: f64) -> f64 {
    if pt == 0.0 {
        return 0.0;
    }
    // Rounding can push |x / pt| a hair past 1.
    let c = (x / pt).clamp(-1.0, 1.0).acos();
    if y < 0.0 { -c } else { c }
}

/// Convert an `[N, 2]` array of (x, y) into (pt, phi).
///
/// # Errors
///
/// [`crate::Error::Shape`] if `xy` does not have exactly two columns.
///
/// # Examples
///
/// ```
/// use meteval::coords::xy_to_pt_phi;
/// use ndarray::array;
///
/// let pp = xy_to_pt_phi(array![[3.0, 4.0], [0.0, 2.0]].view()).unwrap();
/// assert_eq!(pp[[0, 0]], 5.0);
/// assert!((pp[[1, 1]] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
pub fn xy_to_pt_phi(xy: ArrayView2<f64>) -> Result<Array2<f64>> {
    expect_cols("xy_to_pt_phi input", &xy, 2)?;
    let mut out = Array2::<f64>::zeros((xy.nrows(), 2));
    Zip::from(out.rows_mut())
        .and(xy.rows())
        .for_each(|mut o, v| {
            let (x, y) = (v[0], v[1]);
            let pt = x.hypot(y);
            o[0] = pt;
            o[1] = phi_of(x, y, pt);
        });
    Ok(out)
}

/// Inverse of [`xy_to_pt_phi`]: `[N, 2]` (pt, phi) → (pt·cos φ, pt·sin φ).
pub fn pt_phi_to_xy(pt_phi: ArrayView2<f64>) -> Result<Array2<f64>> {
    expect_cols("pt_phi_to_xy input", &pt_phi, 2)?;
    let mut out = Array2::<f64>::zeros((pt_phi.nrows(), 2));
    Zip::from(out.rows_mut())
        .and(pt_phi.rows())
        .for_each(|mut o, v| {
            let (s, c) = v[1].sin_cos();
            o[0] = v[0] * c;
            o[1] = v[0] * s;
        });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn axis_angles() {
        let pp = xy_to_pt_phi(array![[7.0, 0.0], [0.0, 3.0], [-2.0, 0.0], [0.0, -1.0]].view())
            .unwrap();
        approx::assert_abs_diff_eq!(pp[[0, 1]], 0.0);
        approx::assert_abs_diff_eq!(pp[[1, 1]], FRAC_PI_2, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(pp[[2, 1]], PI, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(pp[[3, 1]], -FRAC_PI_2, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(pp[[2, 0]], 2.0);
    }

    #[test]
    fn zero_vector_gets_zero_angle() {
        let pp = xy_to_pt_phi(array![[0.0, 0.0]].view()).unwrap();
        assert_eq!(pp[[0, 0]], 0.0);
        assert_eq!(pp[[0, 1]], 0.0);
    }

    #[test]
    fn three_columns_rejected() {
        let bad = Array2::<f64>::zeros((4, 3));
        assert!(xy_to_pt_phi(bad.view()).is_err());
    }

    #[test]
    fn matches_atan2() {
        let xy = Array2::from_shape_fn((64, 2), |(i, c)| {
            let a = i as f64 * 0.37 - 11.0;
            if c == 0 { a.cos() * (i + 1) as f64 } else { a.sin() * (i + 1) as f64 }
        });
        let pp = xy_to_pt_phi(xy.view()).unwrap();
        for i in 0..64 {
            let want = xy[[i, 1]].atan2(xy[[i, 0]]);
            approx::assert_abs_diff_eq!(pp[[i, 1]], want, epsilon = 1e-9);
        }
    }
}
