use std::fmt;

/// A tensor shape, wrapping a vector of dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Create a shape from a slice of dimensions.
    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Computes row-major contiguous strides for this shape.
    ///
    /// For a shape [d0, d1, d2], the strides are [d1*d2, d2, 1].
    pub fn strides(&self) -> Vec<usize> {
        if self.dims.is_empty() {
            return vec![];
        }
        let mut strides = vec![0usize; self.dims.len()];
        strides[self.dims.len() - 1] = 1;
        for i in (0..self.dims.len() - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Checks if the given strides correspond to a contiguous (row-major) layout
    /// for this shape.
    pub fn is_contiguous(&self, strides: &[usize]) -> bool {
        if strides.len() != self.dims.len() {
            return false;
        }
        let expected = self.strides();
        strides == expected.as_slice()
    }

    /// Returns true if every component of `index` is within its dimension.
    pub fn contains(&self, index: &[usize]) -> bool {
        index.len() == self.dims.len() && index.iter().zip(&self.dims).all(|(&i, &d)| i < d)
    }
}

/// Flat buffer offset of a multi-index: `sum(index[d] * strides[d])`.
///
/// This is the only addressing formula in the crate. No bounds checking is
/// done here.
#[inline]
pub fn offset_of(index: &[usize], strides: &[usize]) -> usize {
    debug_assert_eq!(index.len(), strides.len());
    index.iter().zip(strides).map(|(&i, &s)| i * s).sum()
}

/// Decompose a linear row-major counter into per-dimension coordinates.
///
/// The last dimension varies fastest. `out` must have the same length as `dims`.
pub fn unravel_index(mut linear: usize, dims: &[usize], out: &mut [usize]) {
    debug_assert_eq!(dims.len(), out.len());
    for d in (0..dims.len()).rev() {
        out[d] = linear % dims[d];
        linear /= dims[d];
    }
}

/// Iterative multi-index enumerator over a shape.
///
/// Starts at all zeros and increments the last dimension first, carrying into
/// slower dimensions on overflow. Every index in the shape is produced exactly
/// once.
#[derive(Debug, Clone)]
pub struct Odometer {
    dims: Vec<usize>,
    index: Vec<usize>,
    done: bool,
}

impl Odometer {
    pub fn new(dims: &[usize]) -> Self {
        Odometer {
            dims: dims.to_vec(),
            index: vec![0; dims.len()],
            done: dims.iter().any(|&d| d == 0),
        }
    }

    /// The current multi-index, or `None` once every index has been visited.
    pub fn current(&self) -> Option<&[usize]> {
        if self.done {
            None
        } else {
            Some(&self.index)
        }
    }

    /// Step to the next multi-index. Returns false when the sequence is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        for d in (0..self.dims.len()).rev() {
            self.index[d] += 1;
            if self.index[d] < self.dims[d] {
                return true;
            }
            self.index[d] = 0;
        }
        // Carried out of the slowest dimension (or rank 0, which has one index).
        self.done = true;
        false
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::from_slice(&dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_shape() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.ndim(), 3);
        assert_eq!(s.numel(), 24);
        assert_eq!(s.dim(0), 2);
        assert_eq!(s.dim(1), 3);
        assert_eq!(s.dim(2), 4);
    }

    #[test]
    fn test_strides() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.strides(), vec![12, 4, 1]);
        assert_eq!(Shape::from([5]).strides(), vec![1]);
    }

    #[test]
    fn test_is_contiguous() {
        let s = Shape::new(vec![2, 3, 4]);
        assert!(s.is_contiguous(&[12, 4, 1]));
        assert!(!s.is_contiguous(&[12, 1, 4]));
        assert!(!s.is_contiguous(&[4, 1]));
    }

    #[test]
    fn test_contains() {
        let s = Shape::from([2, 3]);
        assert!(s.contains(&[1, 2]));
        assert!(!s.contains(&[2, 0]));
        assert!(!s.contains(&[0]));
    }

    #[test]
    fn test_offset_of() {
        assert_eq!(offset_of(&[1, 2, 3], &[12, 4, 1]), 23);
        assert_eq!(offset_of(&[1, 2], &[1, 2]), 5);
    }

    #[test]
    fn test_unravel_index() {
        let mut out = [0; 3];
        unravel_index(23, &[2, 3, 4], &mut out);
        assert_eq!(out, [1, 2, 3]);
        unravel_index(5, &[2, 3, 4], &mut out);
        assert_eq!(out, [0, 1, 1]);

        let mut empty: [usize; 0] = [];
        unravel_index(0, &[], &mut empty);
    }

    #[test]
    fn test_odometer_order() {
        let mut odo = Odometer::new(&[2, 3]);
        let mut seen = Vec::new();
        while let Some(idx) = odo.current() {
            seen.push(idx.to_vec());
            odo.advance();
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
    }

    #[test]
    fn test_odometer_matches_unravel() {
        let dims = [3, 1, 2, 4];
        let mut odo = Odometer::new(&dims);
        let mut out = [0; 4];
        for linear in 0..24 {
            unravel_index(linear, &dims, &mut out);
            assert_eq!(odo.current(), Some(&out[..]));
            odo.advance();
        }
        assert!(odo.current().is_none());
        assert!(!odo.advance());
    }

    #[test]
    fn test_odometer_empty_extent() {
        let odo = Odometer::new(&[2, 0, 3]);
        assert!(odo.current().is_none());
    }

    #[test]
    fn test_scalar_shape() {
        let s = Shape::new(vec![]);
        assert_eq!(s.ndim(), 0);
        assert_eq!(s.numel(), 1); // product of empty = 1
        assert_eq!(s.strides(), vec![]);

        let mut odo = Odometer::new(&[]);
        assert_eq!(odo.current(), Some(&[][..]));
        assert!(!odo.advance());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::from([2, 3, 4]).to_string(), "[2, 3, 4]");
    }
}
