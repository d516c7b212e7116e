//! Ragged per-event candidate lists → fixed-shape dense tensors.
//!
//! Policy (the same for every function here):
//!   - an event with `L < max_n` entries is padded at the end with `pad`;
//!   - an event with `L > max_n` entries keeps its first `max_n` entries
//!     (clip, never wrap, never sample);
//!   - a missing event (`None`) is an all-pad row.
//!
//! Candidate order is significant and preserved.
use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Densify a ragged list of per-candidate scalars into `[N, max_n]`.
///
/// # Examples
///
/// ```
/// use meteval::densify::densify_scalars;
///
/// let events = [Some(vec![1.0_f32, 2.0, 3.0]), None, Some(vec![4.0])];
/// let dense = densify_scalars(&events, 2, 0.0);
/// assert_eq!(dense.row(0).to_vec(), vec![1.0, 2.0]);
/// assert_eq!(dense.row(1).to_vec(), vec![0.0, 0.0]);
/// assert_eq!(dense.row(2).to_vec(), vec![4.0, 0.0]);
/// ```
pub fn densify_scalars<T: AsRef<[f32]>>(events: &[Option<T>], max_n: usize, pad: f32) -> Array2<f32> {
    let mut out = Array2::from_elem((events.len(), max_n), pad);
    for (mut row, ev) in out.rows_mut().into_iter().zip(events) {
        if let Some(vals) = ev {
            let vals = vals.as_ref();
            let n = vals.len().min(max_n);
            row.slice_mut(s![..n])
                .assign(&ndarray::ArrayView1::from(&vals[..n]));
        }
    }
    out
}

/// Densify a ragged list of `[L, width]` candidate records into
/// `[N, max_n, width]`.
///
/// # Errors
///
/// [`Error::Shape`] if any event's record width differs from `width`.
pub fn densify_records(
    events: &[Option<ArrayView2<f32>>],
    width: usize,
    max_n: usize,
    pad: f32,
) -> Result<Array3<f32>> {
    let mut out = Array3::from_elem((events.len(), max_n, width), pad);
    for (e, ev) in events.iter().enumerate() {
        let Some(recs) = ev else { continue };
        if recs.ncols() != width {
            return Err(Error::Shape {
                what: "candidate records",
                expected: format!("[L, {width}]"),
                got: format!("{:?} (event {e})", recs.shape()),
            });
        }
        let n = recs.nrows().min(max_n);
        out.slice_mut(s![e, ..n, ..]).assign(&recs.slice(s![..n, ..]));
    }
    Ok(out)
}

/// Stack densified per-field channels (each `[N, max_n]`) along a new last
/// axis, giving the `[N, max_n, C]` candidate tensor fed to the preprocessor.
///
/// # Errors
///
/// [`Error::InvalidParameter`] for an empty channel list, [`Error::Shape`]
/// if the channels disagree in shape.
pub fn stack_channels(channels: &[Array2<f32>]) -> Result<Array3<f32>> {
    let Some(first) = channels.first() else {
        return Err(Error::InvalidParameter("no channels to stack".into()));
    };
    if let Some((i, bad)) = channels.iter().enumerate().find(|(_, c)| c.dim() != first.dim()) {
        return Err(Error::Shape {
            what: "candidate channel",
            expected: format!("{:?}", first.shape()),
            got: format!("{:?} (channel {i})", bad.shape()),
        });
    }
    let views: Vec<_> = channels.iter().map(|c| c.view()).collect();
    Ok(ndarray::stack(Axis(2), &views)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn short_events_padded_long_events_clipped() {
        let events = [Some(vec![1.0_f32; 3]), Some((0..10).map(|v| v as f32).collect())];
        let dense = densify_scalars(&events, 5, -1.0);
        assert_eq!(dense.dim(), (2, 5));
        assert_eq!(dense.row(0).to_vec(), vec![1.0, 1.0, 1.0, -1.0, -1.0]);
        assert_eq!(dense.row(1).to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn records_keep_first_rows() {
        let a = array![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let events = [Some(a.view()), None];
        let dense = densify_records(&events, 2, 2, 0.0).unwrap();
        assert_eq!(dense.shape(), &[2, 2, 2]);
        assert_eq!(dense.slice(s![0, .., ..]), array![[1.0_f32, 2.0], [3.0, 4.0]]);
        assert!(dense.slice(s![1, .., ..]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn record_width_mismatch_is_error() {
        let a = array![[1.0_f32, 2.0, 3.0]];
        assert!(densify_records(&[Some(a.view())], 2, 4, 0.0).is_err());
    }

    #[test]
    fn stack_puts_channels_last() {
        let pt = array![[1.0_f32, 2.0]];
        let eta = array![[0.1_f32, 0.2]];
        let t = stack_channels(&[pt, eta]).unwrap();
        assert_eq!(t.shape(), &[1, 2, 2]);
        assert_eq!(t[[0, 1, 0]], 2.0);
        assert_eq!(t[[0, 1, 1]], 0.2);
    }
}
