//! `nt-tensor` - Strided N-dimensional f32 tensors.
//!
//! This crate provides:
//! - A `Tensor` type owning shape, strides and a row-major buffer
//! - `TensorView`, a zero-copy strided window (transpose, axis selection)
//! - Batched matrix multiplication with a sequential or rayon-parallel batch loop
//! - Euclidean distance over arbitrarily strided operands
//! - A `ComputeBackend` trait and the reference `CpuBackend`
//! - Shape utilities: canonical strides, mixed-radix unraveling, odometer traversal

pub mod backend;
pub mod config;
pub mod cpu;
mod display;
pub mod error;
pub mod shape;
pub mod tensor;
pub mod view;

#[cfg(test)]
mod property_tests;

// Re-export primary types at the crate root for convenience.
pub use backend::{ComputeBackend, ExecutionPolicy};
pub use config::CpuConfig;
pub use cpu::CpuBackend;
pub use error::{Result, TensorError};
pub use shape::{Odometer, Shape};
pub use tensor::Tensor;
pub use view::TensorView;
