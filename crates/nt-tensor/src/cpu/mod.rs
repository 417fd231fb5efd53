pub mod distance;
pub mod matmul;

use crate::backend::{ComputeBackend, ExecutionPolicy};
use crate::config::CpuConfig;
use crate::error::Result;
use crate::tensor::Tensor;
use crate::view::TensorView;

/// Pure-Rust CPU compute backend.
///
/// Straightforward strided loops. The only parallel section is the matmul
/// batch loop, selected by the backend's `ExecutionPolicy`.
#[derive(Debug, Clone)]
pub struct CpuBackend {
    policy: ExecutionPolicy,
    min_parallel_batches: usize,
}

impl CpuBackend {
    /// Sequential backend.
    pub fn new() -> Self {
        Self::with_policy(ExecutionPolicy::Sequential)
    }

    /// Parallel backend on rayon's global pool.
    pub fn parallel() -> Self {
        Self::with_policy(ExecutionPolicy::Parallel { num_threads: None })
    }

    pub fn with_policy(policy: ExecutionPolicy) -> Self {
        CpuBackend {
            policy,
            min_parallel_batches: CpuConfig::default().min_parallel_batches,
        }
    }

    pub fn from_config(config: &CpuConfig) -> Self {
        CpuBackend {
            policy: config.policy(),
            min_parallel_batches: config.min_parallel_batches,
        }
    }

    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn matmul(&self, a: &TensorView<'_>, b: &TensorView<'_>) -> Result<Tensor> {
        matmul::matmul(a, b, self.policy, self.min_parallel_batches)
    }

    fn euclidean_distance(&self, a: &TensorView<'_>, b: &TensorView<'_>) -> Result<f32> {
        distance::euclidean_distance(a, b)
    }
}
