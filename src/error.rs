//! Error types for meteval.
//!
//! Only precondition violations are errors.  Degenerate statistics (empty
//! bins, zero-length vectors) flow through the numeric pipeline as NaN/Inf.
use thiserror::Error;

/// meteval error type
#[derive(Error, Debug)]
pub enum Error {
    /// An array did not have the required number of columns/channels.
    #[error("{what}: expected {expected}, got {got}")]
    Shape {
        what: &'static str,
        expected: String,
        got: String,
    },

    /// Two event-indexed arrays disagree on the number of events.
    #[error("{what}: event counts differ ({left} vs {right})")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    /// A scalar parameter is out of its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// ndarray reshape/concatenate failure
    #[error("ndarray shape error: {0}")]
    Ndarray(#[from] ndarray::ShapeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed tensor file
    #[error("Format error: {0}")]
    Format(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Fail with [`Error::Shape`] unless `arr` has exactly `cols` columns.
pub(crate) fn expect_cols<S, D>(
    what: &'static str,
    arr: &ndarray::ArrayBase<S, D>,
    cols: usize,
) -> Result<()>
where
    S: ndarray::Data,
    D: ndarray::Dimension,
{
    let shape = arr.shape();
    if shape.len() != 2 || shape[1] != cols {
        return Err(Error::Shape {
            what,
            expected: format!("[N, {cols}]"),
            got: format!("{shape:?}"),
        });
    }
    Ok(())
}
