//! Property-based tests for tensor addressing, matmul and distance.

use proptest::prelude::*;

use crate::backend::ExecutionPolicy;
use crate::cpu::{distance::euclidean_distance, matmul::matmul};
use crate::shape::{unravel_index, Odometer, Shape};
use crate::tensor::Tensor;

// 1-4D shapes with small extents
fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..5, 1..=4)
}

fn tensor_strategy() -> impl Strategy<Value = Tensor> {
    shape_strategy().prop_flat_map(|shape| {
        let numel = shape.iter().product::<usize>();
        prop::collection::vec(-10.0f32..10.0, numel)
            .prop_map(move |data| Tensor::new(data, shape.clone()).unwrap())
    })
}

fn tensor_pair_strategy() -> impl Strategy<Value = (Tensor, Tensor)> {
    shape_strategy().prop_flat_map(|shape| {
        let numel = shape.iter().product::<usize>();
        let data = prop::collection::vec(-10.0f32..10.0, numel);
        (data.clone(), data).prop_map(move |(a, b)| {
            (
                Tensor::new(a, shape.clone()).unwrap(),
                Tensor::new(b, shape.clone()).unwrap(),
            )
        })
    })
}

// [..batch, m, k] and [..batch, k, n] with 0-2 batch dims
fn matmul_operands() -> impl Strategy<Value = (Tensor, Tensor)> {
    (
        prop::collection::vec(1usize..4, 0..=2),
        1usize..5,
        1usize..5,
        1usize..5,
    )
        .prop_flat_map(|(batch, m, k, n)| {
            let mut a_shape = batch.clone();
            a_shape.extend([m, k]);
            let mut b_shape = batch;
            b_shape.extend([k, n]);
            let a_len = a_shape.iter().product::<usize>();
            let b_len = b_shape.iter().product::<usize>();
            (
                prop::collection::vec(-4.0f32..4.0, a_len),
                prop::collection::vec(-4.0f32..4.0, b_len),
            )
                .prop_map(move |(a, b)| {
                    (
                        Tensor::new(a, a_shape.clone()).unwrap(),
                        Tensor::new(b, b_shape.clone()).unwrap(),
                    )
                })
        })
}

proptest! {
    #[test]
    fn prop_canonical_strides(shape in shape_strategy()) {
        let t = Tensor::zeros(shape.clone());
        let strides = t.strides();
        prop_assert_eq!(t.len(), shape.iter().product::<usize>());
        prop_assert_eq!(strides[shape.len() - 1], 1);
        for d in 0..shape.len() - 1 {
            prop_assert_eq!(strides[d], strides[d + 1] * shape[d + 1]);
        }
    }

    #[test]
    fn prop_set_get_roundtrip(shape in shape_strategy(), value in -1e6f32..1e6) {
        let mut t = Tensor::zeros(shape.clone());
        let mut odo = Odometer::new(&shape);
        while let Some(idx) = odo.current() {
            let idx = idx.to_vec();
            t.set(&idx, value);
            prop_assert_eq!(t.get(&idx), value);
            t.set(&idx, 0.0);
            odo.advance();
        }
    }

    #[test]
    fn prop_odometer_visits_every_offset_once(shape in shape_strategy()) {
        let s = Shape::new(shape.clone());
        let strides = s.strides();
        let mut odo = Odometer::new(&shape);
        let mut linear = 0usize;
        let mut coords = vec![0; shape.len()];
        while let Some(idx) = odo.current() {
            unravel_index(linear, &shape, &mut coords);
            prop_assert_eq!(idx, coords.as_slice());
            prop_assert_eq!(crate::shape::offset_of(idx, &strides), linear);
            linear += 1;
            odo.advance();
        }
        prop_assert_eq!(linear, s.numel());
    }

    #[test]
    fn prop_distance_symmetric((a, b) in tensor_pair_strategy()) {
        let ab = euclidean_distance(&a.view(), &b.view()).unwrap();
        let ba = euclidean_distance(&b.view(), &a.view()).unwrap();
        prop_assert_eq!(ab.to_bits(), ba.to_bits());
        prop_assert!(ab >= 0.0);
    }

    #[test]
    fn prop_distance_to_self_is_zero(t in tensor_strategy()) {
        prop_assert_eq!(euclidean_distance(&t.view(), &t.view()).unwrap(), 0.0);
    }

    #[test]
    fn prop_parallel_bit_identical((a, b) in matmul_operands(), threads in 1usize..4) {
        let seq = matmul(&a.view(), &b.view(), ExecutionPolicy::Sequential, 0).unwrap();
        let par = matmul(
            &a.view(),
            &b.view(),
            ExecutionPolicy::Parallel { num_threads: Some(threads) },
            0,
        )
        .unwrap();
        prop_assert_eq!(seq.shape(), par.shape());
        for (x, y) in seq.data().iter().zip(par.data()) {
            prop_assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}
