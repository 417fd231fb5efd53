use thiserror::Error;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("{op} requires rank >= {min}, got rank {ndim}")]
    RankTooLow {
        op: &'static str,
        min: usize,
        ndim: usize,
    },
    #[error("rank mismatch: {a} vs {b}")]
    RankMismatch { a: usize, b: usize },
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("batch dimensions differ: {a:?} vs {b:?}")]
    BatchMismatch { a: Vec<usize>, b: Vec<usize> },
    #[error("matmul dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    MatmulMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },
    #[error("invalid axis {axis} for tensor with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },
    #[error("data length {len} does not match shape {shape:?} (numel={numel})")]
    DataLength {
        len: usize,
        shape: Vec<usize>,
        numel: usize,
    },
    #[error("invalid config value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TensorError>;
