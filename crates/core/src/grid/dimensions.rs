//! Structured grid geometry
//!
//! The computational domain is a uniform Cartesian block of `lx × ly × lz`
//! interior cells surrounded by a single ghost layer on every face. Every field
//! is therefore stored over `(lx+2) × (ly+2) × (lz+2)` cells.
//!
//! # Memory Layout
//!
//! Cells are stored x-slowest, z-fastest:
//!
//! ```text
//! index = (i * (ly + 2) + j) * (lz + 2) + k
//! ```
//!
//! which is the layout of a C array declared `real a[lx+2][ly+2][lz+2]`.
//! One x-plane is a contiguous block of `(ly+2)·(lz+2)` values, which is the
//! unit of parallel work throughout the crate.

use serde::{Deserialize, Serialize};

/// Width of the ghost (halo) layer on each face
pub const GHOST_WIDTH: usize = 1;

/// Grid axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in storage order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Interior dimensions of the structured grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    /// Interior cells along x
    pub lx: usize,
    /// Interior cells along y
    pub ly: usize,
    /// Interior cells along z
    pub lz: usize,
}

impl GridDimensions {
    #[must_use]
    pub const fn new(lx: usize, ly: usize, lz: usize) -> Self {
        Self { lx, ly, lz }
    }

    /// Padded extent `(lx+2, ly+2, lz+2)` including both ghost layers
    #[inline]
    pub fn padded(&self) -> (usize, usize, usize) {
        (
            self.lx + 2 * GHOST_WIDTH,
            self.ly + 2 * GHOST_WIDTH,
            self.lz + 2 * GHOST_WIDTH,
        )
    }

    /// Interior extent along one axis
    #[inline]
    pub fn interior_len(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.lx,
            Axis::Y => self.ly,
            Axis::Z => self.lz,
        }
    }

    /// Padded extent along one axis
    #[inline]
    pub fn padded_len(&self, axis: Axis) -> usize {
        self.interior_len(axis) + 2 * GHOST_WIDTH
    }

    /// Number of stored values per field, ghosts included
    #[inline]
    pub fn cell_count(&self) -> usize {
        let (px, py, pz) = self.padded();
        px * py * pz
    }

    /// Number of interior cells
    #[inline]
    pub fn interior_cell_count(&self) -> usize {
        self.lx * self.ly * self.lz
    }

    /// Number of values in one x-plane
    #[inline]
    pub fn plane_len(&self) -> usize {
        let (_, py, pz) = self.padded();
        py * pz
    }

    /// Linear offset between neighbours along `axis`
    #[inline]
    pub fn stride(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.plane_len(),
            Axis::Y => self.lz + 2 * GHOST_WIDTH,
            Axis::Z => 1,
        }
    }

    /// Linear index of padded cell `(i, j, k)`
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let (_, py, pz) = self.padded();
        (i * py + j) * pz + k
    }

    /// Whether `(i, j, k)` addresses a stored cell
    #[inline]
    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        let (px, py, pz) = self.padded();
        i < px && j < py && k < pz
    }

    /// Whether `(i, j, k)` is a strict interior cell
    #[inline]
    pub fn is_interior(&self, i: usize, j: usize, k: usize) -> bool {
        (1..=self.lx).contains(&i) && (1..=self.ly).contains(&j) && (1..=self.lz).contains(&k)
    }

    /// Iterate strict interior cells in storage order
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize, usize)> {
        let (lx, ly, lz) = (self.lx, self.ly, self.lz);
        (1..=lx).flat_map(move |i| (1..=ly).flat_map(move |j| (1..=lz).map(move |k| (i, j, k))))
    }
}

/// Uniform grid spacing per axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpacing {
    pub hx: f64,
    pub hy: f64,
    pub hz: f64,
}

impl GridSpacing {
    #[must_use]
    pub const fn new(hx: f64, hy: f64, hz: f64) -> Self {
        Self { hx, hy, hz }
    }

    /// Same spacing on all three axes
    #[must_use]
    pub const fn uniform(h: f64) -> Self {
        Self::new(h, h, h)
    }

    /// Spacing along one axis
    #[inline]
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.hx,
            Axis::Y => self.hy,
            Axis::Z => self.hz,
        }
    }

    /// Central-difference factors `1/(2h)` for x, y, z
    #[inline]
    pub fn inverse_double_spacing(&self) -> [f64; 3] {
        [
            0.5 / self.hx,
            0.5 / self.hy,
            0.5 / self.hz,
        ]
    }

    /// Cell volume `hx·hy·hz`
    #[inline]
    pub fn cell_volume(&self) -> f64 {
        self.hx * self.hy * self.hz
    }

    /// Cell-centre coordinate of padded index `n` along `axis`
    ///
    /// Interior cell 1 is centred at `h/2`; ghost cell 0 at `-h/2`.
    #[inline]
    pub fn cell_center(&self, axis: Axis, n: usize) -> f64 {
        let h = self.along(axis);
        (n as f64 - 0.5) * h
    }
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}
