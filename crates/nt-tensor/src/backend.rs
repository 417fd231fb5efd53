use std::fmt::{self, Debug};

use crate::error::Result;
use crate::tensor::Tensor;
use crate::view::TensorView;

/// How the batch loop of a matmul is scheduled.
///
/// Batches write disjoint regions of the result, so both policies produce
/// bit-identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    /// Run every batch on the calling thread.
    #[default]
    Sequential,
    /// Fan batches out over rayon workers.
    ///
    /// `None` uses rayon's global pool; `Some(n)` builds a dedicated pool of
    /// `n` threads for each call.
    Parallel { num_threads: Option<usize> },
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionPolicy::Sequential => write!(f, "sequential"),
            ExecutionPolicy::Parallel { num_threads: None } => write!(f, "parallel"),
            ExecutionPolicy::Parallel {
                num_threads: Some(n),
            } => write!(f, "parallel({n})"),
        }
    }
}

/// Trait for pluggable compute backends.
///
/// Operands are passed as strided views so transposed or sliced inputs work
/// without copying. Results are freshly allocated row-major tensors.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu").
    fn name(&self) -> &str;

    /// Batched matrix multiplication: R = A @ B over matching batch dimensions.
    ///
    /// - `a`: shape [..batch, m, k]
    /// - `b`: shape [..batch, k, n]
    /// - Returns: shape [..batch, m, n]
    fn matmul(&self, a: &TensorView<'_>, b: &TensorView<'_>) -> Result<Tensor>;

    /// sqrt(sum((a - b)^2)) over every element of two equally shaped views.
    fn euclidean_distance(&self, a: &TensorView<'_>, b: &TensorView<'_>) -> Result<f32>;
}
