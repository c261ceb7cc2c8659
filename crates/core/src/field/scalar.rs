//! Scalar field storage over the padded grid
//!
//! A `ScalarField` holds one `f64` per padded cell (ghosts included) in the
//! flat layout described in [`crate::grid::dimensions`].

use crate::error::SgsError;
use crate::grid::GridDimensions;
use std::ops::{Index, IndexMut};

/// Scalar field data over the padded grid
///
/// Values are stored as a flat `Vec<f64>` in x-slowest, z-fastest order.
/// Conservative state (ρ, ρu, ρv, ρw), primitive velocities and every tensor
/// component are all stored as `ScalarField`s.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    data: Vec<f64>,
    dims: GridDimensions,
}

impl ScalarField {
    /// Create a new field with given dimensions, initialized to zero
    ///
    /// # Arguments
    ///
    /// * `dims` - Interior grid dimensions; storage covers the padded extent
    #[must_use]
    pub fn new(dims: GridDimensions) -> Self {
        Self::with_value(dims, 0.0)
    }

    /// Create a new field with every cell, ghosts included, set to `value`
    #[must_use]
    pub fn with_value(dims: GridDimensions, value: f64) -> Self {
        Self {
            data: vec![value; dims.cell_count()],
            dims,
        }
    }

    /// Create a field by evaluating `f(i, j, k)` at every padded cell
    ///
    /// Indices are padded indices: interior cells run `1..=l` on each axis.
    #[must_use]
    pub fn from_fn<F>(dims: GridDimensions, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        let (px, py, pz) = dims.padded();
        let mut data = Vec::with_capacity(dims.cell_count());
        for i in 0..px {
            for j in 0..py {
                for k in 0..pz {
                    data.push(f(i, j, k));
                }
            }
        }
        Self { data, dims }
    }

    /// Wrap an existing flat buffer
    ///
    /// # Errors
    ///
    /// Returns [`SgsError::ShapeMismatch`] if `data.len()` is not the padded
    /// cell count of `dims`.
    pub fn from_vec(dims: GridDimensions, data: Vec<f64>) -> Result<Self, SgsError> {
        if data.len() != dims.cell_count() {
            return Err(SgsError::ShapeMismatch {
                field: "data",
                expected: dims.cell_count(),
                actual: data.len(),
            });
        }
        Ok(Self { data, dims })
    }

    /// Grid dimensions this field is sized for
    #[inline]
    pub fn dims(&self) -> GridDimensions {
        self.dims
    }

    /// Field values in storage order
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable field values in storage order
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Get value at padded cell `(i, j, k)`
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the padded grid
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        assert!(self.dims.contains(i, j, k), "Coordinates out of bounds");
        self.data[self.dims.index(i, j, k)]
    }

    /// Set value at padded cell `(i, j, k)`
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the padded grid
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        assert!(self.dims.contains(i, j, k), "Coordinates out of bounds");
        let idx = self.dims.index(i, j, k);
        self.data[idx] = value;
    }

    /// Fill entire field, ghosts included, with a value
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Overwrite every value with those of `other`
    ///
    /// # Panics
    ///
    /// Panics if the two fields have different dimensions
    pub fn copy_from(&mut self, other: &ScalarField) {
        assert_eq!(self.dims, other.dims, "Field dimensions differ");
        self.data.copy_from_slice(&other.data);
    }

    /// Check that this field is sized for `dims`
    ///
    /// # Errors
    ///
    /// Returns [`SgsError::ShapeMismatch`] naming `name` when the field was
    /// built for a different grid.
    pub fn expect_dims(&self, dims: GridDimensions, name: &'static str) -> Result<(), SgsError> {
        if self.dims == dims {
            Ok(())
        } else {
            Err(SgsError::ShapeMismatch {
                field: name,
                expected: dims.cell_count(),
                actual: self.data.len(),
            })
        }
    }

    /// Largest absolute difference to `other` over interior cells
    #[must_use]
    pub fn max_interior_difference(&self, other: &ScalarField) -> f64 {
        self.dims
            .interior()
            .map(|(i, j, k)| {
                let idx = self.dims.index(i, j, k);
                (self.data[idx] - other.data[idx]).abs()
            })
            .fold(0.0, f64::max)
    }
}

impl Index<usize> for ScalarField {
    type Output = f64;

    #[inline]
    fn index(&self, idx: usize) -> &f64 {
        &self.data[idx]
    }
}

impl IndexMut<usize> for ScalarField {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut f64 {
        &mut self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let dims = GridDimensions::new(2, 3, 4);
        let field = ScalarField::new(dims);
        assert_eq!(field.as_slice().len(), 4 * 5 * 6);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_field_from_fn_uses_padded_indices() {
        let dims = GridDimensions::new(2, 2, 2);
        let field = ScalarField::from_fn(dims, |i, j, k| (100 * i + 10 * j + k) as f64);
        assert_eq!(field.get(0, 0, 0), 0.0);
        assert_eq!(field.get(3, 2, 1), 321.0);
        assert_eq!(field[dims.index(1, 2, 3)], 123.0);
    }

    #[test]
    fn test_field_get_set() {
        let dims = GridDimensions::new(4, 4, 4);
        let mut field = ScalarField::new(dims);
        field.set(3, 4, 5, 123.45);
        assert_eq!(field.get(3, 4, 5), 123.45);
        assert_eq!(field.as_slice()[dims.index(3, 4, 5)], 123.45);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let dims = GridDimensions::new(2, 2, 2);
        let err = ScalarField::from_vec(dims, vec![0.0; 10]).unwrap_err();
        assert!(matches!(
            err,
            SgsError::ShapeMismatch {
                expected: 64,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_expect_dims() {
        let field = ScalarField::new(GridDimensions::new(2, 2, 2));
        assert!(field.expect_dims(GridDimensions::new(2, 2, 2), "rho").is_ok());
        assert!(field.expect_dims(GridDimensions::new(2, 2, 3), "rho").is_err());
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_field_bounds_check() {
        let field = ScalarField::new(GridDimensions::new(2, 2, 2));
        let _ = field.get(4, 0, 0);
    }
}
