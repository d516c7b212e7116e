//! # meteval: evaluation of ML missing-transverse-momentum estimators
//!
//! `meteval` turns raw particle-flow candidate lists into model inputs and
//! compares the resulting MET estimate against PUPPI MET and generator-level
//! truth: response per truth-MET bin, response-corrected resolution per bin
//! and overall, and the PUPPI − ML resolution difference.
//!
//! ## Pipeline overview
//!
//! ```text
//! ragged candidates (per event, [L, 8])
//!   │
//!   ├─ densify::densify_records()   pad / clip → [N, max_n, 8]
//!   ├─ preprocess::preprocess()     ÷ norm_fac, |v| > 500 → 0, split
//!   │        │
//!   │        └─→ (continuous [N,M,4], pxpy [N,M,2], pdgId [N,M,1], charge [N,M,1])
//!   │                 │
//!   │              external model
//!   │                 │
//!   ├─ truth / ml / puppi  [N, 2] (x, y)
//!   ├─ coords::xy_to_pt_phi()       (pt, phi)
//!   └─ response::analyze()          BinTable + ResolutionSummary + Distributions
//! ```
//!
//! ## Quick start
//!
//! ```
//! use meteval::{analyze, AnalysisConfig};
//! use ndarray::Array2;
//!
//! let truth = Array2::from_shape_fn((1000, 2), |(i, c)| (i as f64 * 0.37 + c as f64).sin() * 150.0);
//! let ml    = truth.mapv(|v| v * 0.95);
//! let puppi = truth.mapv(|v| v * 0.85 + 3.0);
//!
//! let report = analyze(truth.view(), ml.view(), puppi.view(), &AnalysisConfig::default()).unwrap();
//! println!("σx(PUPPI) − σx(ML) = {:.3}", report.summary.x_res_avg_dif);
//! ```
//!
//! All numerics are single-threaded, deterministic pure functions.  Shape
//! problems are errors; empty bins and zero vectors are not: they surface as
//! NaN in the tables (see [`response`]).

pub mod batch;
pub mod config;
pub mod coords;
pub mod densify;
pub mod error;
pub mod io;
pub mod preprocess;
pub mod response;
pub mod serde_utils;
pub mod stats;

use ndarray::ArrayView2;
use tracing::debug;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use batch::EventBatch;
pub use config::{AnalysisConfig, PreprocessConfig};
pub use coords::{pt_phi_to_xy, xy_to_pt_phi};
pub use densify::{densify_records, densify_scalars, stack_channels};
pub use error::{Error, Result};
pub use preprocess::{preprocess, ModelInputs};
pub use response::{
    analyze, corrected_residuals, response_correction, BinTable, Distributions,
    EstimatorBins, ResolutionReport, ResolutionSummary,
};
pub use stats::{percentile, resolution};

/// Build model inputs straight from ragged per-event candidate records.
///
/// Densifies to `cfg.max_candidates` slots (padding with `cfg.pad_value`,
/// keeping the first candidates of long events), then runs [`preprocess`]
/// with `cfg.norm_fac`.
///
/// # Errors
///
/// Invalid `cfg`, records narrower than 8 channels, or records whose width
/// differs between events.
pub fn prepare_inputs(
    events: &[Option<ArrayView2<f32>>],
    cfg: &PreprocessConfig,
) -> Result<ModelInputs> {
    cfg.validate()?;
    let width = events
        .iter()
        .flatten()
        .map(|r| r.ncols())
        .next()
        .unwrap_or(preprocess::N_INPUT_CHANNELS);
    debug!(events = events.len(), width, max_candidates = cfg.max_candidates, "densifying candidates");
    let dense = densify_records(events, width, cfg.max_candidates, cfg.pad_value)?;
    preprocess(dense.view(), cfg.norm_fac)
}
