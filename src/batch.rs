//! Event batches at the ingestion boundary.
//!
//! A batch pairs the candidate tensor `x` (`[N, max_n, C]`) with the target
//! vector `y` (`[N, 2]`).  Both are indexed by event, and the row order of
//! one is only meaningful together with the other.
use ndarray::{concatenate, Array2, Array3, Axis};
use tracing::debug;

use crate::error::{expect_cols, Error, Result};

/// Candidate tensor and target MET vectors for the same `N` events.
#[derive(Debug, Clone)]
pub struct EventBatch {
    /// `[N, max_n, C]` per-candidate features.
    pub x: Array3<f32>,
    /// `[N, 2]` target (x, y).
    pub y: Array2<f64>,
}

impl EventBatch {
    /// Pair `x` and `y`, checking that they describe the same events.
    pub fn new(x: Array3<f32>, y: Array2<f64>) -> Result<Self> {
        expect_cols("batch target", &y, 2)?;
        if x.shape()[0] != y.nrows() {
            return Err(Error::LengthMismatch {
                what: "batch x / y",
                left: x.shape()[0],
                right: y.nrows(),
            });
        }
        Ok(Self { x, y })
    }

    pub fn n_events(&self) -> usize {
        self.y.nrows()
    }

    /// Concatenate source batches along the event axis, preserving order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for an empty list; [`Error::Ndarray`] if
    /// the candidate tensors disagree in `max_n` or channel count.
    pub fn concat(batches: &[EventBatch]) -> Result<Self> {
        if batches.is_empty() {
            return Err(Error::InvalidParameter("no batches to concatenate".into()));
        }
        let xs: Vec<_> = batches.iter().map(|b| b.x.view()).collect();
        let ys: Vec<_> = batches.iter().map(|b| b.y.view()).collect();
        let x = concatenate(Axis(0), &xs)?;
        let y = concatenate(Axis(0), &ys)?;
        debug!(batches = batches.len(), events = y.nrows(), "concatenated event batches");
        Self::new(x, y)
    }
}
