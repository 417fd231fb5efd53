//! Nested-bracket rendering of tensors and views.
//!
//! ```text
//! [
//!   [1.00, 2.00],
//!   [3.00, 4.00]
//! ], shape: (2, 2) -> 2 dims
//! ```

use std::fmt;

use crate::shape::Odometer;
use crate::tensor::Tensor;
use crate::view::TensorView;

impl fmt::Display for TensorView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nested(self, f)?;
        write!(f, ", shape: (")?;
        for (i, d) in self.shape().dims().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, ") -> {} dims", self.rank())
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.view().fmt(f)
    }
}

/// Walk the view in odometer order, opening brackets for every dimension whose
/// coordinate just wrapped to zero and closing those that reached their end.
fn write_nested(view: &TensorView<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rank = view.rank();
    let dims = view.shape().dims();
    if dims.iter().any(|&d| d == 0) {
        return write!(f, "[]");
    }

    let mut odo = Odometer::new(dims);
    while let Some(idx) = odo.current() {
        let opened = idx.iter().rposition(|&i| i != 0).map_or(0, |d| d + 1);
        for d in opened..rank {
            if d > 0 {
                write!(f, "\n{:width$}", "", width = 2 * d)?;
            }
            write!(f, "[")?;
        }

        write!(f, "{:.2}", view.buffer()[view.index(idx)])?;

        let closed = idx
            .iter()
            .zip(dims)
            .rposition(|(&i, &d)| i + 1 != d)
            .map_or(0, |d| d + 1);
        for d in (closed..rank).rev() {
            if d + 1 < rank {
                write!(f, "\n{:width$}", "", width = 2 * d)?;
            }
            write!(f, "]")?;
        }
        if closed > 0 {
            write!(f, ", ")?;
        }

        odo.advance();
    }
    Ok(())
}
