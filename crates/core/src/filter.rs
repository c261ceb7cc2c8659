//! Separable three-point field filter
//!
//! Applies a 1D kernel `[h0, h1, h2]` along each grid axis in turn, which is
//! equivalent to convolving with the 27-point tensor-product kernel:
//!
//! ```text
//! out[n] = h0·in[n-1] + h1·in[n] + h2·in[n+1]      (one pass, one axis)
//! ```
//!
//! # Edge Policy
//!
//! A pass along an axis writes every cell whose index along that axis lies in
//! `1..=L` (all indices along the other two axes), and carries the previous
//! value through elsewhere. Passes run y, z, x. Interior output is therefore
//! the full tensor-product stencil; output in the outermost ghost layer is only
//! partially smoothed and should not be trusted.
//!
//! Two full-size buffers are used (ping-pong): input → A → B → A.

use crate::field::{FieldPool, ScalarField};
use crate::grid::{Axis, GridDimensions};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Three-point 1D filter kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterKernel(pub [f64; 3]);

impl FilterKernel {
    /// Normalized box filter, test filter width twice the grid width
    pub const BOX: FilterKernel = FilterKernel([1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);

    /// Three-point Gaussian (binomial) filter
    pub const GAUSSIAN: FilterKernel = FilterKernel([0.25, 0.5, 0.25]);

    /// Leaves a field unchanged
    pub const IDENTITY: FilterKernel = FilterKernel([0.0, 1.0, 0.0]);

    #[must_use]
    pub const fn new(h0: f64, h1: f64, h2: f64) -> Self {
        FilterKernel([h0, h1, h2])
    }

    /// Sum of the weights; 1 for a normalized kernel
    pub fn weight_sum(&self) -> f64 {
        self.0.iter().sum()
    }

    #[inline]
    fn apply(&self, left: f64, center: f64, right: f64) -> f64 {
        let [h0, h1, h2] = self.0;
        left * h0 + center * h1 + right * h2
    }
}

impl Default for FilterKernel {
    fn default() -> Self {
        Self::BOX
    }
}

/// Filter `input` into a freshly allocated field
///
/// The input is never modified. No validation of the kernel is performed:
/// asymmetric or non-normalized kernels simply smooth differently.
#[must_use]
pub fn filter_field(input: &ScalarField, kernel: &FilterKernel) -> ScalarField {
    let mut output = ScalarField::new(input.dims());
    let mut scratch = ScalarField::new(input.dims());
    filter_into(input, kernel, &mut scratch, &mut output);
    output
}

/// Filter `input` using two buffers drawn from `pool`
///
/// The scratch buffer goes back to the pool before returning; the filtered
/// field is handed to the caller, who releases it when done.
pub fn filter_field_pooled(
    input: &ScalarField,
    kernel: &FilterKernel,
    pool: &mut FieldPool,
) -> ScalarField {
    let mut output = pool.acquire();
    let mut scratch = pool.acquire();
    filter_into(input, kernel, &mut scratch, &mut output);
    pool.release(scratch);
    output
}

/// Filter `input` into `output`, using `scratch` for the intermediate pass
///
/// # Panics
///
/// Panics if the three fields do not share the same dimensions
pub fn filter_into(
    input: &ScalarField,
    kernel: &FilterKernel,
    scratch: &mut ScalarField,
    output: &mut ScalarField,
) {
    let dims = input.dims();
    assert_eq!(dims, scratch.dims(), "Scratch field dimensions differ");
    assert_eq!(dims, output.dims(), "Output field dimensions differ");

    output.copy_from(input);
    smooth_axis(input.as_slice(), output.as_mut_slice(), dims, Axis::Y, kernel);

    scratch.copy_from(output);
    smooth_axis(output.as_slice(), scratch.as_mut_slice(), dims, Axis::Z, kernel);

    output.copy_from(scratch);
    smooth_axis(scratch.as_slice(), output.as_mut_slice(), dims, Axis::X, kernel);
}

/// One 1D pass along `axis`, `src` → `dst`
///
/// Only cells with an along-axis index in `1..=L` are written; `dst` must
/// already hold the carried-through values for the rest.
fn smooth_axis(
    src: &[f64],
    dst: &mut [f64],
    dims: GridDimensions,
    axis: Axis,
    kernel: &FilterKernel,
) {
    let (px, py, pz) = dims.padded();
    let stride = dims.stride(axis);

    let (j_range, k_range) = match axis {
        Axis::X => (0..py, 0..pz),
        Axis::Y => (1..py - 1, 0..pz),
        Axis::Z => (0..py, 1..pz - 1),
    };

    dst.par_chunks_mut(dims.plane_len())
        .enumerate()
        .for_each(|(i, plane)| {
            if axis == Axis::X && (i == 0 || i == px - 1) {
                return;
            }
            let base = i * dims.plane_len();
            for j in j_range.clone() {
                for k in k_range.clone() {
                    let local = j * pz + k;
                    let idx = base + local;
                    plane[local] = kernel.apply(src[idx - stride], src[idx], src[idx + stride]);
                }
            }
        });
}
