//! Per-cell tensor algebra for the Germano-Lilly procedure
//!
//! All tensors are `Matrix3<f64>` with component `(a, b)` for axes
//! `a, b ∈ {x, y, z}`. Double contractions `A:B` are the Frobenius inner
//! product over all nine components.

use super::config::{CoefficientClip, TEST_FILTER_RATIO_SQ};
use crate::field::ScalarField;
use crate::grid::{Axis, GridDimensions};
use nalgebra::Matrix3;

/// Velocity gradient `G[(a, b)] = ∂u_a/∂x_b` by second-order central differences
///
/// `idx` must address a cell with both neighbours stored along every axis,
/// i.e. a strict interior cell.
#[inline]
pub fn velocity_gradient(
    velocity: &[ScalarField; 3],
    dims: GridDimensions,
    inv_2h: [f64; 3],
    idx: usize,
) -> Matrix3<f64> {
    let strides = Axis::ALL.map(|axis| dims.stride(axis));
    Matrix3::from_fn(|a, b| {
        let s = strides[b];
        (velocity[a][idx + s] - velocity[a][idx - s]) * inv_2h[b]
    })
}

/// Strain-rate tensor `S = ½(G + Gᵀ)`
#[inline]
pub fn strain_rate(gradient: &Matrix3<f64>) -> Matrix3<f64> {
    (gradient + gradient.transpose()) * 0.5
}

/// Strain magnitude `|S| = sqrt(2 S:S)`
#[inline]
pub fn strain_magnitude(strain: &Matrix3<f64>) -> f64 {
    (2.0 * strain.norm_squared()).sqrt()
}

/// Deviatoric part: `L - ⅓ tr(L) I`
#[inline]
pub fn deviatoric(tensor: &Matrix3<f64>) -> Matrix3<f64> {
    let third_trace = tensor.trace() / 3.0;
    let mut out = *tensor;
    for a in 0..3 {
        out[(a, a)] -= third_trace;
    }
    out
}

/// Model tensor `M = Δ²(4B - Â)` for a test-to-grid width ratio of 2
#[inline]
pub fn model_tensor(b: f64, a_filtered: f64, delta_sq: f64) -> f64 {
    delta_sq * (TEST_FILTER_RATIO_SQ * b - a_filtered)
}

/// Lilly's least-squares coefficient `Cd = -½ (L:M) / (M:M + ε)`
#[inline]
pub fn lilly_coefficient(leonard: &Matrix3<f64>, model: &Matrix3<f64>, epsilon: f64) -> f64 {
    let lm = leonard.dot(model);
    let mm = model.norm_squared();
    -0.5 * (lm / (mm + epsilon))
}

/// Which side of the admissible range a coefficient fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOutcome {
    Within,
    Low,
    High,
}

/// Clamp `Cd` into `[clip.min, clip.max]`
///
/// NaN is passed through unchanged and reported as `Within`.
#[inline]
pub fn clip_coefficient(cd: f64, clip: &CoefficientClip) -> (f64, ClipOutcome) {
    if cd > clip.max {
        (clip.max, ClipOutcome::High)
    } else if cd < clip.min {
        (clip.min, ClipOutcome::Low)
    } else {
        (cd, ClipOutcome::Within)
    }
}
