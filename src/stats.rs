//! Binning and robust-spread primitives.
//!
//! Semantics follow the numpy / scipy functions the comparison was first
//! written with, so numbers agree to rounding:
//!
//! | here                | reference                                     |
//! |---------------------|-----------------------------------------------|
//! | [`linspace`]        | `np.linspace(lo, hi, nbins + 1)`              |
//! | [`percentile`]      | `np.percentile(x, q)` (linear interpolation)  |
//! | [`resolution`]      | `(p84 − p16) / 2`                             |
//! | [`bin_index`]       | `binned_statistic` bin assignment             |
//! | [`bin_index_clip`]  | `np.take(.., np.digitize(x, edges) − 1, mode='clip')` |
//! | [`histogram`]       | `np.histogram(x, nbins, range=(lo, hi))`      |
//!
//! Empty samples give NaN, and a NaN anywhere in a sample makes its
//! percentiles NaN.
use ndarray::{Array1, ArrayView1};

/// `nbins + 1` equally spaced edges from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, nbins: usize) -> Array1<f64> {
    let step = (hi - lo) / nbins as f64;
    Array1::from_shape_fn(nbins + 1, |i| if i == nbins { hi } else { lo + i as f64 * step })
}

/// numpy's `_lerp`, which is exact at both ends.
#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let d = b - a;
    if t >= 0.5 { b - d * (1.0 - t) } else { a + d * t }
}

/// Percentile of an already sorted, NaN-free slice.
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let h = (sorted.len() - 1) as f64 * q / 100.0;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    lerp(sorted[lo], sorted[hi], h - lo as f64)
}

/// Sort a copy of `sample`, or `None` if it contains a NaN.
fn sorted_copy(sample: &[f64]) -> Option<Vec<f64>> {
    if sample.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut v = sample.to_vec();
    v.sort_by(f64::total_cmp);
    Some(v)
}

/// `q`-th percentile (`0 ≤ q ≤ 100`) with linear interpolation between
/// closest ranks.
///
/// ```
/// use meteval::stats::percentile;
/// assert_eq!(percentile(&[4.0, 1.0, 3.0, 2.0], 50.0), 2.5);
/// assert!(percentile(&[], 50.0).is_nan());
/// ```
pub fn percentile(sample: &[f64], q: f64) -> f64 {
    sorted_copy(sample).map_or(f64::NAN, |s| percentile_sorted(&s, q))
}

/// Half-width of the central 68 % interval: `(p84 − p16) / 2`.
///
/// A robust analogue of one standard deviation.  `0` for a single value,
/// NaN for an empty sample.
///
/// ```
/// use meteval::stats::resolution;
/// assert_eq!(resolution(&[3.0]), 0.0);
/// assert_eq!(resolution(&[0.0; 10]), 0.0);
/// ```
pub fn resolution(sample: &[f64]) -> f64 {
    match sorted_copy(sample) {
        Some(s) => (percentile_sorted(&s, 84.0) - percentile_sorted(&s, 16.0)) / 2.0,
        None => f64::NAN,
    }
}

/// Bin of `x` for statistics: bins are `[e_i, e_{i+1})` except the last,
/// which also takes `x == e_n`.  `None` outside `[e_0, e_n]` and for NaN.
pub fn bin_index(edges: ArrayView1<f64>, x: f64) -> Option<usize> {
    let n = edges.len().checked_sub(1)?;
    if n == 0 || x.is_nan() || x < edges[0] || x > edges[n] {
        return None;
    }
    if x == edges[n] {
        return Some(n - 1);
    }
    // number of edges <= x, at least 1 here
    let le = edges.iter().take_while(|&&e| e <= x).count();
    Some(le - 1)
}

/// Bin of `x` for lookups: like `digitize − 1` clipped to `[0, nbins − 1]`.
///
/// Values below the domain take the first bin, values at or above the last
/// edge (and NaN) take the last bin.
pub fn bin_index_clip(edges: ArrayView1<f64>, x: f64) -> usize {
    let nbins = edges.len().saturating_sub(1);
    if nbins == 0 {
        return 0;
    }
    let le = if x.is_nan() {
        edges.len()
    } else {
        edges.iter().take_while(|&&e| e <= x).count()
    };
    le.saturating_sub(1).min(nbins - 1)
}

/// Per-event bin assignment over `keys` (see [`bin_index`]).
#[derive(Debug, Clone)]
pub struct Binning {
    edges: Array1<f64>,
    assignment: Vec<Option<usize>>,
    counts: Array1<usize>,
}

impl Binning {
    pub fn new(edges: Array1<f64>, keys: ArrayView1<f64>) -> Self {
        let nbins = edges.len().saturating_sub(1);
        let assignment: Vec<_> = keys.iter().map(|&k| bin_index(edges.view(), k)).collect();
        let mut counts = Array1::<usize>::zeros(nbins);
        for b in assignment.iter().flatten() {
            counts[*b] += 1;
        }
        Self { edges, assignment, counts }
    }

    pub fn nbins(&self) -> usize {
        self.counts.len()
    }

    pub fn edges(&self) -> ArrayView1<'_, f64> {
        self.edges.view()
    }

    /// Events per bin; out-of-domain events are not counted.
    pub fn counts(&self) -> ArrayView1<'_, usize> {
        self.counts.view()
    }

    /// Number of keys that fell outside the domain (or were NaN).
    pub fn n_outside(&self) -> usize {
        self.assignment.iter().filter(|b| b.is_none()).count()
    }

    /// Split `values` (aligned with the keys) into one sample per bin.
    pub fn group(&self, values: ArrayView1<f64>) -> Vec<Vec<f64>> {
        debug_assert_eq!(values.len(), self.assignment.len());
        let mut groups: Vec<Vec<f64>> = self.counts.iter().map(|&c| Vec::with_capacity(c)).collect();
        for (b, &v) in self.assignment.iter().zip(values.iter()) {
            if let Some(b) = b {
                groups[*b].push(v);
            }
        }
        groups
    }

    /// Apply `stat` to each bin's sample of `values`.
    pub fn apply<F: Fn(&[f64]) -> f64>(&self, values: ArrayView1<f64>, stat: F) -> Array1<f64> {
        self.group(values).iter().map(|g| stat(g.as_slice())).collect()
    }

    /// Per-bin mean of `values`; NaN for empty bins.
    pub fn mean(&self, values: ArrayView1<f64>) -> Array1<f64> {
        self.apply(values, mean)
    }
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(sample: &[f64]) -> f64 {
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Counts of `values` in `nbins` equal bins over `[lo, hi]`.
pub fn histogram(values: ArrayView1<f64>, lo: f64, hi: f64, nbins: usize) -> Array1<u64> {
    let edges = linspace(lo, hi, nbins);
    let mut counts = Array1::<u64>::zeros(nbins);
    for &v in values {
        if let Some(b) = bin_index(edges.view(), v) {
            counts[b] += 1;
        }
    }
    counts
}
