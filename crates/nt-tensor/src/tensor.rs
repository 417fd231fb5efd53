use crate::backend::ComputeBackend;
use crate::error::{Result, TensorError};
use crate::shape::{offset_of, Odometer, Shape};
use crate::view::TensorView;

/// An owned, row-major f32 tensor.
///
/// Shape, strides and data live in one value and are released together when
/// the tensor is dropped. Operations that require computation are dispatched
/// to a `ComputeBackend`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Shape,
    strides: Vec<usize>,
}

impl Tensor {
    /// Create a tensor from f32 data and a shape.
    ///
    /// # Errors
    /// Returns `DataLength` if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        if data.len() != shape.numel() {
            return Err(TensorError::DataLength {
                len: data.len(),
                shape: shape.dims().to_vec(),
                numel: shape.numel(),
            });
        }
        let strides = shape.strides();
        Ok(Tensor {
            data,
            shape,
            strides,
        })
    }

    /// Create a zero-filled tensor with the given shape.
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        Self::full(shape, 0.0)
    }

    /// Create a tensor filled with ones with the given shape.
    pub fn ones(shape: impl Into<Shape>) -> Self {
        Self::full(shape, 1.0)
    }

    /// Create a tensor with every element set to `value`.
    pub fn full(shape: impl Into<Shape>, value: f32) -> Self {
        let shape = shape.into();
        debug_assert!(shape.ndim() >= 1, "tensors must have rank >= 1");
        let strides = shape.strides();
        Tensor {
            data: vec![value; shape.numel()],
            shape,
            strides,
        }
    }

    /// Create a tensor whose element at each multi-index is `f(index)`.
    pub fn from_fn(shape: impl Into<Shape>, mut f: impl FnMut(&[usize]) -> f32) -> Self {
        let shape = shape.into();
        let mut data = Vec::with_capacity(shape.numel());
        let mut odo = Odometer::new(shape.dims());
        while let Some(idx) = odo.current() {
            data.push(f(idx));
            odo.advance();
        }
        let strides = shape.strides();
        Tensor {
            data,
            shape,
            strides,
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.ndim()
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the underlying row-major buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Flat offset of `index`. Does not check that the index is in range.
    pub fn index(&self, index: &[usize]) -> usize {
        offset_of(index, &self.strides)
    }

    /// Read the element at `index`.
    ///
    /// # Panics
    /// Panics if `index` has the wrong length or any component is out of range.
    pub fn get(&self, index: &[usize]) -> f32 {
        self.check_index(index)
            .unwrap_or_else(|e| panic!("Tensor::get: {e}"));
        self.data[self.index(index)]
    }

    /// Write `value` at `index`.
    ///
    /// # Panics
    /// Panics if `index` has the wrong length or any component is out of range.
    pub fn set(&mut self, index: &[usize], value: f32) {
        self.check_index(index)
            .unwrap_or_else(|e| panic!("Tensor::set: {e}"));
        let offset = self.index(index);
        self.data[offset] = value;
    }

    pub fn try_get(&self, index: &[usize]) -> Result<f32> {
        self.check_index(index)?;
        Ok(self.data[self.index(index)])
    }

    pub fn try_set(&mut self, index: &[usize], value: f32) -> Result<()> {
        self.check_index(index)?;
        let offset = self.index(index);
        self.data[offset] = value;
        Ok(())
    }

    fn check_index(&self, index: &[usize]) -> Result<()> {
        if index.len() != self.rank() {
            return Err(TensorError::RankMismatch {
                a: self.rank(),
                b: index.len(),
            });
        }
        if !self.shape.contains(index) {
            return Err(TensorError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.dims().to_vec(),
            });
        }
        Ok(())
    }

    /// Borrow the whole tensor as a strided view.
    pub fn view(&self) -> TensorView<'_> {
        TensorView::from_parts(&self.data, self.shape.clone(), self.strides.clone(), 0)
    }

    /// Batched matrix multiplication using the given backend.
    ///
    /// self is [..batch, m, k], other is [..batch, k, n], result is [..batch, m, n].
    pub fn matmul(&self, other: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        backend.matmul(&self.view(), &other.view())
    }

    /// Euclidean distance between two tensors of identical shape.
    pub fn euclidean_distance(&self, other: &Tensor, backend: &dyn ComputeBackend) -> Result<f32> {
        backend.euclidean_distance(&self.view(), &other.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CpuBackend;

    #[test]
    fn test_new_tensor() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]).unwrap();
        assert_eq!(t.rank(), 2);
        assert_eq!(t.shape().dim(0), 2);
        assert_eq!(t.shape().dim(1), 3);
        assert_eq!(t.strides(), &[3, 1]);
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_new_length_mismatch() {
        let err = Tensor::new(vec![1.0, 2.0], [3]).unwrap_err();
        assert!(matches!(err, TensorError::DataLength { len: 2, numel: 3, .. }));
    }

    #[test]
    fn test_zeros_ones() {
        let z = Tensor::zeros([2, 3]);
        assert_eq!(z.data(), &[0.0; 6]);

        let o = Tensor::ones([3]);
        assert_eq!(o.data(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_rank_one() {
        let mut t = Tensor::zeros([4]);
        assert_eq!(t.rank(), 1);
        assert_eq!(t.strides(), &[1]);
        t.set(&[3], 7.5);
        assert_eq!(t.get(&[3]), 7.5);
        assert_eq!(t.data(), &[0.0, 0.0, 0.0, 7.5]);
    }

    #[test]
    fn test_canonical_strides() {
        let t = Tensor::zeros([2, 3, 4, 5]);
        assert_eq!(t.strides(), &[60, 20, 5, 1]);
        assert_eq!(t.len(), t.shape().numel());
    }

    #[test]
    fn test_set_get() {
        let mut a = Tensor::zeros([2, 2]);
        a.set(&[0, 0], 42.0);
        a.set(&[1, 1], 3.25);
        assert_eq!(a.get(&[0, 0]), 42.0);
        assert_eq!(a.get(&[1, 1]), 3.25);
        assert_eq!(a.get(&[0, 1]), 0.0);
        assert_eq!(a.index(&[1, 1]), 3);
    }

    #[test]
    fn test_from_fn() {
        let t = Tensor::from_fn([2, 3], |idx| (idx[0] * 10 + idx[1]) as f32);
        assert_eq!(t.data(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_try_get_out_of_bounds() {
        let mut t = Tensor::zeros([2, 3]);
        assert!(matches!(
            t.try_get(&[2, 0]),
            Err(TensorError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            t.try_set(&[0], 1.0),
            Err(TensorError::RankMismatch { a: 2, b: 1 })
        ));
        t.try_set(&[1, 2], 9.0).unwrap();
        assert_eq!(t.try_get(&[1, 2]).unwrap(), 9.0);
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_bounds_panics() {
        let t = Tensor::zeros([2, 2]);
        t.get(&[0, 2]);
    }

    #[test]
    fn test_release_absent_is_noop() {
        let t: Option<Tensor> = None;
        drop(t);
        let t = Some(Tensor::zeros([3, 3]));
        drop(t);
    }

    #[test]
    fn test_matmul() {
        let backend = CpuBackend::new();
        let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], [2, 2]).unwrap();
        let b = Tensor::new(vec![5.0, 6.0, 7.0, 8.0], [2, 2]).unwrap();
        let c = a.matmul(&b, &backend).unwrap();
        assert_eq!(c.shape().dims(), &[2, 2]);
        assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_dimension_mismatch() {
        let backend = CpuBackend::new();
        let a = Tensor::new(vec![1.0, 2.0, 3.0], [1, 3]).unwrap();
        let b = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], [2, 2]).unwrap();
        assert!(matches!(
            a.matmul(&b, &backend),
            Err(TensorError::MatmulMismatch { k: 3, k2: 2, .. })
        ));
    }

    #[test]
    fn test_euclidean_distance() {
        let backend = CpuBackend::new();
        let a = Tensor::new(vec![1.0, 2.0, 3.0], [3]).unwrap();
        let b = Tensor::new(vec![4.0, 6.0, 3.0], [3]).unwrap();
        assert_eq!(a.euclidean_distance(&b, &backend).unwrap(), 5.0);
    }
}
