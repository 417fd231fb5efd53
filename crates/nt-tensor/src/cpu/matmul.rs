//! Batched matrix multiplication over strided views.
//!
//! Every leading dimension before the last two is a batch dimension. Both
//! operands must have the same rank and identical batch dimensions; there is no
//! broadcasting of missing or unit batch dimensions.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::backend::ExecutionPolicy;
use crate::error::{Result, TensorError};
use crate::shape::{unravel_index, Shape};
use crate::tensor::Tensor;
use crate::view::TensorView;

/// Offset and stride layout for one batched matmul, computed once up front.
#[derive(Debug, Clone)]
pub struct MatmulPlan {
    batch_dims: Vec<usize>,
    a_batch_strides: Vec<usize>,
    b_batch_strides: Vec<usize>,
    a_offset: usize,
    b_offset: usize,
    m: usize,
    k: usize,
    n: usize,
    a_row: usize,
    a_col: usize,
    b_row: usize,
    b_col: usize,
}

impl MatmulPlan {
    /// Validate operand shapes and capture their layouts.
    ///
    /// # Errors
    /// - `RankTooLow` if either operand has rank < 2
    /// - `RankMismatch` if the ranks differ
    /// - `MatmulMismatch` if `a`'s last dimension differs from `b`'s second to last
    /// - `BatchMismatch` if the leading dimensions differ
    pub fn new(a: &TensorView<'_>, b: &TensorView<'_>) -> Result<Self> {
        for ndim in [a.rank(), b.rank()] {
            if ndim < 2 {
                return Err(TensorError::RankTooLow {
                    op: "matmul",
                    min: 2,
                    ndim,
                });
            }
        }
        if a.rank() != b.rank() {
            return Err(TensorError::RankMismatch {
                a: a.rank(),
                b: b.rank(),
            });
        }

        let rank = a.rank();
        let nb = rank - 2;
        let (ad, bd) = (a.shape().dims(), b.shape().dims());
        let (m, k, k2, n) = (ad[nb], ad[nb + 1], bd[nb], bd[nb + 1]);
        if k != k2 {
            return Err(TensorError::MatmulMismatch { m, k, k2, n });
        }
        if ad[..nb] != bd[..nb] {
            return Err(TensorError::BatchMismatch {
                a: ad[..nb].to_vec(),
                b: bd[..nb].to_vec(),
            });
        }

        let (a_st, b_st) = (a.strides(), b.strides());
        Ok(MatmulPlan {
            batch_dims: ad[..nb].to_vec(),
            a_batch_strides: a_st[..nb].to_vec(),
            b_batch_strides: b_st[..nb].to_vec(),
            a_offset: a.offset(),
            b_offset: b.offset(),
            m,
            k,
            n,
            a_row: a_st[nb],
            a_col: a_st[nb + 1],
            b_row: b_st[nb],
            b_col: b_st[nb + 1],
        })
    }

    /// Shape of the result: batch dims, then [m, n].
    pub fn output_shape(&self) -> Shape {
        let mut dims = self.batch_dims.clone();
        dims.push(self.m);
        dims.push(self.n);
        Shape::new(dims)
    }

    /// Number of independent 2D products. A rank-2 matmul has exactly one.
    pub fn batch_count(&self) -> usize {
        self.batch_dims.iter().product()
    }

    /// Elements written per batch (m * n).
    pub fn block_len(&self) -> usize {
        self.m * self.n
    }

    /// Decode linear batch number `batch` into `coords` and return the base
    /// offsets of that batch in `a` and `b`.
    pub fn batch_offsets(&self, batch: usize, coords: &mut [usize]) -> (usize, usize) {
        unravel_index(batch, &self.batch_dims, coords);
        let mut a_off = self.a_offset;
        let mut b_off = self.b_offset;
        for (d, &c) in coords.iter().enumerate() {
            a_off += c * self.a_batch_strides[d];
            b_off += c * self.b_batch_strides[d];
        }
        (a_off, b_off)
    }

    /// Compute one [m, k] @ [k, n] product into `out` (row-major, length m * n).
    ///
    /// The k-loop order is fixed, so a given batch always accumulates the same way
    /// no matter which thread runs it.
    pub fn run_block(&self, a: &[f32], b: &[f32], a_off: usize, b_off: usize, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.block_len());
        for i in 0..self.m {
            let a_row = a_off + i * self.a_row;
            for j in 0..self.n {
                let b_col = b_off + j * self.b_col;
                let mut sum = 0.0f32;
                for p in 0..self.k {
                    sum += a[a_row + p * self.a_col] * b[b_col + p * self.b_row];
                }
                out[i * self.n + j] = sum;
            }
        }
    }
}

/// Batched matmul of two views, scheduled according to `policy`.
///
/// Batches below `min_parallel_batches` run sequentially even under a
/// parallel policy.
pub fn matmul(
    a: &TensorView<'_>,
    b: &TensorView<'_>,
    policy: ExecutionPolicy,
    min_parallel_batches: usize,
) -> Result<Tensor> {
    let plan = MatmulPlan::new(a, b)?;
    let mut result = Tensor::zeros(plan.output_shape());
    let batches = plan.batch_count();
    let block = plan.block_len();

    debug!(
        a_shape = %a.shape(),
        b_shape = %b.shape(),
        batches,
        %policy,
        "matmul"
    );

    if block == 0 || batches == 0 {
        return Ok(result);
    }

    let (a_data, b_data) = (a.buffer(), b.buffer());
    let nb = plan.batch_dims.len();
    let out = result.data_mut();

    match policy {
        ExecutionPolicy::Parallel { num_threads } if batches >= min_parallel_batches.max(2) => {
            trace!(batches, ?num_threads, "matmul: parallel batch loop");
            let run = |out: &mut [f32]| {
                out.par_chunks_mut(block).enumerate().for_each_init(
                    || vec![0usize; nb],
                    |coords, (batch, chunk)| {
                        let (a_off, b_off) = plan.batch_offsets(batch, coords);
                        plan.run_block(a_data, b_data, a_off, b_off, chunk);
                    },
                );
            };
            match num_threads {
                Some(threads) => rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?
                    .install(|| run(out)),
                None => run(out),
            }
        }
        _ => {
            trace!(batches, "matmul: sequential batch loop");
            let mut coords = vec![0usize; nb];
            for (batch, chunk) in out.chunks_mut(block).enumerate() {
                let (a_off, b_off) = plan.batch_offsets(batch, &mut coords);
                plan.run_block(a_data, b_data, a_off, b_off, chunk);
            }
        }
    }

    Ok(result)
}

/// Plain 2D matmul: R[i, j] = sum_k A[i, k] * B[k, j].
///
/// Independent of the batched engine; rank-2 batched results must match it.
pub fn matmul_2d(a: &TensorView<'_>, b: &TensorView<'_>) -> Result<Tensor> {
    for ndim in [a.rank(), b.rank()] {
        if ndim != 2 {
            return Err(TensorError::RankMismatch { a: 2, b: ndim });
        }
    }
    let (m, k) = (a.shape().dim(0), a.shape().dim(1));
    let (k2, n) = (b.shape().dim(0), b.shape().dim(1));
    if k != k2 {
        return Err(TensorError::MatmulMismatch { m, k, k2, n });
    }

    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a.get(&[i, p]) * b.get(&[p, j]);
            }
            c[i * n + j] = sum;
        }
    }
    Tensor::new(c, [m, n])
}
