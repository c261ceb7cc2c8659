//! Rank-2 tensor fields stored as nine scalar components
//!
//! Strain, Leonard stress and the model tensors are conceptually symmetric,
//! but every component `(a, b)` is stored in its own buffer. Per-cell algebra
//! gathers the nine values into a `nalgebra::Matrix3`.

use super::{FieldPool, ScalarField};
use nalgebra::Matrix3;

/// Nine-component tensor field, component `(a, b)` at slot `3a + b`
#[derive(Debug, Clone)]
pub struct TensorField {
    components: [ScalarField; 9],
}

impl TensorField {
    /// Build a tensor field from a closure producing component `(a, b)`
    pub fn from_components<F>(mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> ScalarField,
    {
        Self {
            components: std::array::from_fn(|slot| f(slot / 3, slot % 3)),
        }
    }

    /// Take nine zeroed buffers from `pool`
    pub fn acquire(pool: &mut FieldPool) -> Self {
        Self::from_components(|_, _| pool.acquire())
    }

    /// Give all nine buffers back to `pool`
    pub fn release(self, pool: &mut FieldPool) {
        for component in self.components {
            pool.release(component);
        }
    }

    /// Component `(a, b)`
    #[inline]
    pub fn component(&self, a: usize, b: usize) -> &ScalarField {
        &self.components[3 * a + b]
    }

    /// Mutable component `(a, b)`
    #[inline]
    pub fn component_mut(&mut self, a: usize, b: usize) -> &mut ScalarField {
        &mut self.components[3 * a + b]
    }

    /// Gather the tensor at linear cell index `idx`
    #[inline]
    pub fn matrix_at(&self, idx: usize) -> Matrix3<f64> {
        Matrix3::from_fn(|a, b| self.components[3 * a + b][idx])
    }

    /// Scatter `value` into linear cell index `idx`
    #[inline]
    pub fn set_matrix_at(&mut self, idx: usize, value: &Matrix3<f64>) {
        for a in 0..3 {
            for b in 0..3 {
                self.components[3 * a + b][idx] = value[(a, b)];
            }
        }
    }

    /// Components in slot order
    pub fn components(&self) -> impl Iterator<Item = &ScalarField> {
        self.components.iter()
    }

    /// Split into the nine component buffers
    pub fn into_components(self) -> [ScalarField; 9] {
        self.components
    }
}
