//! Euclidean distance between two equally shaped tensors.

use tracing::{debug, trace};

use crate::error::{Result, TensorError};
use crate::shape::Odometer;
use crate::view::TensorView;

/// sqrt(sum over all I of (a[I] - b[I])^2).
///
/// Elements are visited in row-major order. Contiguous operands are scanned
/// linearly; anything else walks both views with an odometer. Both paths add
/// the squared differences in the same order.
pub fn euclidean_distance(a: &TensorView<'_>, b: &TensorView<'_>) -> Result<f32> {
    if a.rank() != b.rank() {
        return Err(TensorError::RankMismatch {
            a: a.rank(),
            b: b.rank(),
        });
    }
    if a.shape() != b.shape() {
        return Err(TensorError::ShapeMismatch {
            expected: a.shape().dims().to_vec(),
            got: b.shape().dims().to_vec(),
        });
    }

    debug!(shape = %a.shape(), "euclidean_distance");

    let sum = if a.is_contiguous() && b.is_contiguous() {
        trace!("euclidean_distance: linear scan");
        let len = a.shape().numel();
        let xs = &a.buffer()[a.offset()..a.offset() + len];
        let ys = &b.buffer()[b.offset()..b.offset() + len];
        xs.iter().zip(ys).fold(0.0f32, |acc, (x, y)| {
            let diff = x - y;
            acc + diff * diff
        })
    } else {
        trace!("euclidean_distance: strided walk");
        let (xs, ys) = (a.buffer(), b.buffer());
        let mut sum = 0.0f32;
        let mut odo = Odometer::new(a.shape().dims());
        while let Some(idx) = odo.current() {
            let diff = xs[a.index(idx)] - ys[b.index(idx)];
            sum += diff * diff;
            odo.advance();
        }
        sum
    };

    Ok(sum.sqrt())
}
