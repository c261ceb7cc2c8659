//! Pool of same-shaped field buffers
//!
//! The dynamic procedure sweeps through dozens of whole-grid temporaries, but
//! only a fraction of them are alive at the same time. `FieldPool` hands out
//! zeroed buffers and takes them back once a stage is done with them, so the
//! memory high-water mark is set by the largest set of simultaneously live
//! fields rather than by the total number of intermediate quantities.

use super::ScalarField;
use crate::grid::GridDimensions;

/// Arena of reusable [`ScalarField`] buffers sized for one grid
#[derive(Debug)]
pub struct FieldPool {
    dims: GridDimensions,
    free: Vec<ScalarField>,
    in_use: usize,
    peak_in_use: usize,
    allocated: usize,
}

impl FieldPool {
    /// Create an empty pool for fields of dimensions `dims`
    #[must_use]
    pub fn new(dims: GridDimensions) -> Self {
        Self {
            dims,
            free: Vec::new(),
            in_use: 0,
            peak_in_use: 0,
            allocated: 0,
        }
    }

    /// Grid dimensions of the pooled buffers
    pub fn dims(&self) -> GridDimensions {
        self.dims
    }

    /// Take a zero-filled buffer, reusing a released one when available
    pub fn acquire(&mut self) -> ScalarField {
        let field = if let Some(mut field) = self.free.pop() {
            field.fill(0.0);
            field
        } else {
            self.allocated += 1;
            ScalarField::new(self.dims)
        };
        self.in_use += 1;
        self.peak_in_use = self.peak_in_use.max(self.in_use);
        field
    }

    /// Return a buffer to the pool
    ///
    /// # Panics
    ///
    /// Panics if `field` was sized for a different grid
    pub fn release(&mut self, field: ScalarField) {
        assert_eq!(field.dims(), self.dims, "Released field does not match pool");
        self.in_use = self.in_use.saturating_sub(1);
        self.free.push(field);
    }

    /// Mark a buffer as permanently handed out of the pool
    ///
    /// Used when a pooled buffer is returned to the caller instead of
    /// being released.
    pub fn detach(&mut self, field: ScalarField) -> ScalarField {
        self.in_use = self.in_use.saturating_sub(1);
        field
    }

    /// Buffers currently handed out
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Largest number of buffers handed out at the same time
    pub fn peak_in_use(&self) -> usize {
        self.peak_in_use
    }

    /// Total buffers ever allocated by this pool
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_reuses_released_buffers() {
        let mut pool = FieldPool::new(GridDimensions::new(2, 2, 2));
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.in_use(), 2);
        pool.release(a);
        pool.release(b);

        let _c = pool.acquire();
        let _d = pool.acquire();
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.peak_in_use(), 2);
    }

    #[test]
    fn test_acquired_buffers_are_zeroed() {
        let mut pool = FieldPool::new(GridDimensions::new(2, 2, 2));
        let mut a = pool.acquire();
        a.fill(7.0);
        pool.release(a);

        let b = pool.acquire();
        assert!(b.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_detach_keeps_peak() {
        let mut pool = FieldPool::new(GridDimensions::new(1, 1, 1));
        let a = pool.acquire();
        let _kept = pool.detach(a);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.peak_in_use(), 1);
    }

    #[test]
    #[should_panic(expected = "Released field does not match pool")]
    fn test_release_wrong_shape() {
        let mut pool = FieldPool::new(GridDimensions::new(2, 2, 2));
        pool.release(ScalarField::new(GridDimensions::new(3, 2, 2)));
    }
}
