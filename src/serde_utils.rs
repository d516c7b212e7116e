//! Serialization helpers for report types.

use ndarray::Array1;
use serde::{Serialize, Serializer};

/// Serialize an `Array1` as a plain sequence instead of ndarray's
/// `{v, dim, data}` form.  Non-finite floats come out as `null` in JSON.
pub fn as_seq<T, S>(arr: &Array1<T>, s: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    s.collect_seq(arr.iter())
}
