use crate::error::{Result, TensorError};
use crate::shape::{offset_of, Odometer, Shape};
use crate::tensor::Tensor;

/// A borrowed, strided window into a tensor's buffer.
///
/// A view owns no memory: element `I` lives at `offset + sum(I[d] * strides[d])`
/// in the borrowed slice. Transposes and axis selections produce new views with
/// non-canonical strides over the same data.
#[derive(Debug, Clone)]
pub struct TensorView<'a> {
    data: &'a [f32],
    shape: Shape,
    strides: Vec<usize>,
    offset: usize,
}

impl<'a> TensorView<'a> {
    pub(crate) fn from_parts(
        data: &'a [f32],
        shape: Shape,
        strides: Vec<usize>,
        offset: usize,
    ) -> Self {
        debug_assert_eq!(shape.ndim(), strides.len());
        TensorView {
            data,
            shape,
            strides,
            offset,
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.ndim()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Offset of element `[0, 0, ...]` in the underlying buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The whole underlying buffer, not just the elements this view covers.
    pub fn buffer(&self) -> &'a [f32] {
        self.data
    }

    /// Returns true if the view covers a dense row-major block of the buffer.
    pub fn is_contiguous(&self) -> bool {
        self.shape.is_contiguous(&self.strides)
    }

    /// Buffer offset of `index`. Does not check that the index is in range.
    pub fn index(&self, index: &[usize]) -> usize {
        self.offset + offset_of(index, &self.strides)
    }

    /// Read the element at `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a valid multi-index for this view.
    pub fn get(&self, index: &[usize]) -> f32 {
        assert!(
            self.shape.contains(index),
            "index {:?} out of bounds for shape {}",
            index,
            self.shape
        );
        self.data[self.index(index)]
    }

    pub fn try_get(&self, index: &[usize]) -> Result<f32> {
        if !self.shape.contains(index) {
            return Err(TensorError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.dims().to_vec(),
            });
        }
        Ok(self.data[self.index(index)])
    }

    /// Swap two axes without copying.
    pub fn transpose(&self, a0: usize, a1: usize) -> Result<TensorView<'a>> {
        let ndim = self.rank();
        for axis in [a0, a1] {
            if axis >= ndim {
                return Err(TensorError::InvalidAxis { axis, ndim });
            }
        }
        let mut dims = self.shape.dims().to_vec();
        let mut strides = self.strides.clone();
        dims.swap(a0, a1);
        strides.swap(a0, a1);
        Ok(TensorView::from_parts(
            self.data,
            Shape::new(dims),
            strides,
            self.offset,
        ))
    }

    /// Fix `axis` at `index`, returning a view with that axis removed.
    pub fn select(&self, axis: usize, index: usize) -> Result<TensorView<'a>> {
        let ndim = self.rank();
        if axis >= ndim {
            return Err(TensorError::InvalidAxis { axis, ndim });
        }
        if index >= self.shape.dim(axis) {
            return Err(TensorError::IndexOutOfBounds {
                index: vec![index],
                shape: vec![self.shape.dim(axis)],
            });
        }
        let mut dims = self.shape.dims().to_vec();
        let mut strides = self.strides.clone();
        dims.remove(axis);
        let stride = strides.remove(axis);
        Ok(TensorView::from_parts(
            self.data,
            Shape::new(dims),
            strides,
            self.offset + index * stride,
        ))
    }

    /// Copy the viewed elements into a new row-major tensor.
    pub fn to_tensor(&self) -> Tensor {
        if self.is_contiguous() {
            let end = self.offset + self.shape.numel();
            return Tensor::new(self.data[self.offset..end].to_vec(), self.shape.clone())
                .unwrap_or_else(|_| unreachable!("contiguous view spans numel elements"));
        }
        let mut data = Vec::with_capacity(self.shape.numel());
        let mut odo = Odometer::new(self.shape.dims());
        while let Some(idx) = odo.current() {
            data.push(self.data[self.index(idx)]);
            odo.advance();
        }
        Tensor::new(data, self.shape.clone())
            .unwrap_or_else(|_| unreachable!("odometer visits numel elements"))
    }
}
