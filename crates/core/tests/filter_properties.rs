//! Field filter properties on random inputs
//!
//! Run tests with: `cargo test --test filter_properties`

mod common;

use approx::assert_relative_eq;
use common::random_field;
use les_sgs_core::{filter_field, FilterKernel, GridDimensions, ScalarField};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_normalized_kernel(rng: &mut StdRng) -> FilterKernel {
    let raw: [f64; 3] = std::array::from_fn(|_| rng.random_range(0.05..1.0));
    let sum: f64 = raw.iter().sum();
    FilterKernel::new(raw[0] / sum, raw[1] / sum, raw[2] / sum)
}

/// Any normalized kernel leaves a constant field constant everywhere
#[test]
fn test_normalized_kernels_preserve_constants() {
    let mut rng = StdRng::seed_from_u64(42);
    let dims = GridDimensions::new(5, 7, 4);
    let input = ScalarField::with_value(dims, 3.75);

    for _ in 0..20 {
        let kernel = random_normalized_kernel(&mut rng);
        let output = filter_field(&input, &kernel);
        for &value in output.as_slice() {
            assert_relative_eq!(value, 3.75, max_relative = 1e-12);
        }
    }
}

/// Identity kernel reproduces a random field bit for bit
#[test]
fn test_identity_kernel_is_exact() {
    let dims = GridDimensions::new(6, 3, 5);
    let input = random_field(dims, 7, -10.0, 10.0);
    let output = filter_field(&input, &FilterKernel::IDENTITY);
    assert_eq!(output, input);
}

/// Filtering never touches its input and is repeatable
#[test]
fn test_filter_is_pure() {
    let dims = GridDimensions::new(4, 6, 5);
    let input = random_field(dims, 3, 0.0, 1.0);
    let snapshot = input.clone();

    let first = filter_field(&input, &FilterKernel::GAUSSIAN);
    let second = filter_field(&input, &FilterKernel::GAUSSIAN);
    assert_eq!(input, snapshot);
    assert_eq!(first, second);
}

/// Box filtering never leaves the input's value range
#[test]
fn test_box_filter_bounded_by_input_range() {
    let dims = GridDimensions::new(7, 7, 7);
    let input = random_field(dims, 13, -2.0, 5.0);
    let output = filter_field(&input, &FilterKernel::BOX);

    let (lo, hi) = input
        .as_slice()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    for &value in output.as_slice() {
        assert!(value >= lo - 1e-12 && value <= hi + 1e-12);
    }
}

/// A single interior impulse spreads into exactly the 27 neighbouring cells
#[test]
fn test_impulse_support() {
    let dims = GridDimensions::new(6, 6, 6);
    let mut input = ScalarField::new(dims);
    input.set(3, 3, 3, 1.0);
    let output = filter_field(&input, &FilterKernel::BOX);

    let mut support = 0;
    let mut total = 0.0;
    for (i, j, k) in dims.interior() {
        let value = output.get(i, j, k);
        if value != 0.0 {
            support += 1;
            assert!(i.abs_diff(3) <= 1 && j.abs_diff(3) <= 1 && k.abs_diff(3) <= 1);
        }
        total += value;
    }
    assert_eq!(support, 27);
    assert_relative_eq!(total, 1.0, epsilon = 1e-12);
}
