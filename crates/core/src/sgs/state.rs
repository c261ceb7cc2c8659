//! Conservative flow state and primitive velocity recovery

use crate::error::SgsError;
use crate::field::{FieldPool, ScalarField};
use crate::grid::GridDimensions;
use rayon::prelude::*;

/// Borrowed view of the conservative fields produced by the flow solver
///
/// Ghost layers must already be populated by the boundary-condition pass.
#[derive(Debug, Clone, Copy)]
pub struct ConservativeState<'a> {
    /// Density ρ
    pub density: &'a ScalarField,
    /// Momentum ρu
    pub momentum_x: &'a ScalarField,
    /// Momentum ρv
    pub momentum_y: &'a ScalarField,
    /// Momentum ρw
    pub momentum_z: &'a ScalarField,
}

impl<'a> ConservativeState<'a> {
    pub fn new(
        density: &'a ScalarField,
        momentum_x: &'a ScalarField,
        momentum_y: &'a ScalarField,
        momentum_z: &'a ScalarField,
    ) -> Self {
        Self {
            density,
            momentum_x,
            momentum_y,
            momentum_z,
        }
    }

    /// Check every field against the configured grid
    ///
    /// # Errors
    ///
    /// Returns [`SgsError::ShapeMismatch`] for the first field sized for a
    /// different grid.
    pub fn expect_dims(&self, dims: GridDimensions) -> Result<(), SgsError> {
        self.density.expect_dims(dims, "density")?;
        self.momentum_x.expect_dims(dims, "momentum_x")?;
        self.momentum_y.expect_dims(dims, "momentum_y")?;
        self.momentum_z.expect_dims(dims, "momentum_z")?;
        Ok(())
    }
}

/// Recover u, v, w over every stored cell, ghosts included
///
/// Division by ρ is unguarded: ρ ≤ 0 yields non-finite velocities which
/// propagate through the rest of the procedure.
pub fn primitive_velocity(state: &ConservativeState<'_>, pool: &mut FieldPool) -> [ScalarField; 3] {
    let mut u = pool.acquire();
    let mut v = pool.acquire();
    let mut w = pool.acquire();
    let plane = pool.dims().plane_len();

    let rho = state.density.as_slice();
    let ru = state.momentum_x.as_slice();
    let rv = state.momentum_y.as_slice();
    let rw = state.momentum_z.as_slice();

    u.as_mut_slice()
        .par_chunks_mut(plane)
        .zip(v.as_mut_slice().par_chunks_mut(plane))
        .zip(w.as_mut_slice().par_chunks_mut(plane))
        .enumerate()
        .for_each(|(i, ((u_plane, v_plane), w_plane))| {
            let base = i * plane;
            for n in 0..u_plane.len() {
                let idx = base + n;
                let inv_rho = 1.0 / rho[idx];
                u_plane[n] = ru[idx] * inv_rho;
                v_plane[n] = rv[idx] * inv_rho;
                w_plane[n] = rw[idx] * inv_rho;
            }
        });

    [u, v, w]
}
