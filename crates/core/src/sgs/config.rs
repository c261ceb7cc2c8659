//! Configuration for the dynamic Smagorinsky estimator

use crate::error::SgsError;
use crate::filter::FilterKernel;
use crate::grid::{GridDimensions, GridSpacing};
use serde::{Deserialize, Serialize};

/// Lower bound of the model coefficient (no backscatter)
pub const COEFFICIENT_MIN: f64 = 0.0;

/// Upper bound of the model coefficient
pub const COEFFICIENT_MAX: f64 = 0.15;

/// Test filter width over grid filter width
pub const TEST_FILTER_RATIO: f64 = 2.0;

/// Square of [`TEST_FILTER_RATIO`], the factor on `B` in the model tensor
pub const TEST_FILTER_RATIO_SQ: f64 = TEST_FILTER_RATIO * TEST_FILTER_RATIO;

/// Allowed deviation of the kernel weight sum from 1
const KERNEL_SUM_TOLERANCE: f64 = 1.0e-12;

/// Additive guard on `M:M` in the least-squares denominator
pub const DEFAULT_EPSILON: f64 = 1.0e-10;

/// Admissible range of the model coefficient `Cd`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientClip {
    pub min: f64,
    pub max: f64,
}

impl Default for CoefficientClip {
    fn default() -> Self {
        Self {
            min: COEFFICIENT_MIN,
            max: COEFFICIENT_MAX,
        }
    }
}

/// Configuration for the dynamic Smagorinsky estimator
///
/// Everything the procedure needs beyond the flow fields themselves. Built
/// once per run and passed explicitly to the estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgsConfig {
    /// Interior grid dimensions
    pub grid: GridDimensions,

    /// Uniform spacing per axis
    pub spacing: GridSpacing,

    /// Squared grid filter width Δ²
    pub delta_sq: f64,

    /// Guard added to `M:M` before dividing
    pub epsilon: f64,

    /// Test filter kernel (box filter by default)
    ///
    /// Must be normalized. The factor [`TEST_FILTER_RATIO_SQ`] in `M` assumes
    /// a test filter twice as wide as the grid filter, which holds for the box
    /// kernel only; other kernels (e.g. [`FilterKernel::GAUSSIAN`], effective
    /// width ratio √2) are accepted but give an `M` scaled inconsistently with
    /// `L`, so `Cd` is biased.
    pub kernel: FilterKernel,

    /// Clip range applied to `Cd`
    pub clip: CoefficientClip,
}

impl SgsConfig {
    /// Configuration with Δ² derived from the cell volume
    ///
    /// Δ = (hx·hy·hz)^(1/3), so Δ² = (hx·hy·hz)^(2/3).
    #[must_use]
    pub fn new(grid: GridDimensions, spacing: GridSpacing) -> Self {
        Self {
            grid,
            spacing,
            delta_sq: filter_width_sq(&spacing),
            epsilon: DEFAULT_EPSILON,
            kernel: FilterKernel::BOX,
            clip: CoefficientClip::default(),
        }
    }

    /// Override the squared grid filter width
    pub fn with_delta_sq(mut self, delta_sq: f64) -> Self {
        self.delta_sq = delta_sq;
        self
    }

    /// Override the denominator guard
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Override the test filter kernel
    ///
    /// See [`SgsConfig::kernel`]: the model tensor keeps the box-filter width
    /// ratio of 2 whatever kernel is supplied.
    pub fn with_kernel(mut self, kernel: FilterKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Override the coefficient clip range
    pub fn with_clip(mut self, clip: CoefficientClip) -> Self {
        self.clip = clip;
        self
    }

    /// Check the configuration before use
    ///
    /// # Errors
    ///
    /// Returns [`SgsError::InvalidConfig`] for an empty grid, non-finite or
    /// non-positive spacing, negative or non-finite Δ², non-positive ε, or a
    /// clip range that is not `0 <= min <= max`, or a kernel whose weights
    /// are not finite or do not sum to 1.
    pub fn validate(&self) -> Result<(), SgsError> {
        let GridDimensions { lx, ly, lz } = self.grid;
        if lx == 0 || ly == 0 || lz == 0 {
            return Err(SgsError::InvalidConfig(format!(
                "grid must have at least one interior cell per axis, got {lx}x{ly}x{lz}"
            )));
        }

        for (name, h) in [
            ("hx", self.spacing.hx),
            ("hy", self.spacing.hy),
            ("hz", self.spacing.hz),
        ] {
            if !h.is_finite() || h <= 0.0 {
                return Err(SgsError::InvalidConfig(format!(
                    "spacing {name} must be finite and positive, got {h}"
                )));
            }
        }

        if !self.delta_sq.is_finite() || self.delta_sq < 0.0 {
            return Err(SgsError::InvalidConfig(format!(
                "delta_sq must be finite and non-negative, got {}",
                self.delta_sq
            )));
        }

        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(SgsError::InvalidConfig(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }

        let CoefficientClip { min, max } = self.clip;
        if !(min.is_finite() && max.is_finite() && 0.0 <= min && min <= max) {
            return Err(SgsError::InvalidConfig(format!(
                "clip range must satisfy 0 <= min <= max, got [{min}, {max}]"
            )));
        }

        let weights = self.kernel.0;
        if !weights.iter().all(|w| w.is_finite())
            || (self.kernel.weight_sum() - 1.0).abs() > KERNEL_SUM_TOLERANCE
        {
            return Err(SgsError::InvalidConfig(format!(
                "test filter kernel must be normalized, got weights {weights:?}"
            )));
        }

        Ok(())
    }
}

impl Default for SgsConfig {
    fn default() -> Self {
        Self::new(GridDimensions::new(16, 16, 16), GridSpacing::default())
    }
}

/// Squared grid filter width from the cell volume
pub fn filter_width_sq(spacing: &GridSpacing) -> f64 {
    spacing.cell_volume().powf(2.0 / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        let config = SgsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clip.min, 0.0);
        assert_eq!(config.clip.max, 0.15);
        assert_eq!(config.kernel, FilterKernel::BOX);
        assert_eq!(TEST_FILTER_RATIO_SQ, 4.0);
    }

    #[test]
    fn test_normalized_kernels_accepted() {
        let base = SgsConfig::default();
        assert!(base.clone().with_kernel(FilterKernel::GAUSSIAN).validate().is_ok());
        assert!(base.with_kernel(FilterKernel::IDENTITY).validate().is_ok());
    }

    #[test]
    fn test_delta_sq_from_spacing() {
        let config = SgsConfig::new(GridDimensions::new(4, 4, 4), GridSpacing::new(1.0, 2.0, 4.0));
        // cell volume 8 -> delta 2 -> delta^2 4
        assert_relative_eq!(config.delta_sq, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let base = SgsConfig::default();

        let mut empty = base.clone();
        empty.grid.ly = 0;
        assert!(empty.validate().is_err());

        let mut bad_spacing = base.clone();
        bad_spacing.spacing.hz = -1.0;
        assert!(bad_spacing.validate().is_err());

        assert!(base.clone().with_delta_sq(f64::NAN).validate().is_err());
        assert!(base.clone().with_epsilon(0.0).validate().is_err());
        assert!(base
            .clone()
            .with_clip(CoefficientClip { min: 0.2, max: 0.1 })
            .validate()
            .is_err());
        assert!(base
            .clone()
            .with_kernel(FilterKernel::new(0.5, 0.5, 0.5))
            .validate()
            .is_err());
        assert!(base
            .clone()
            .with_kernel(FilterKernel::new(f64::NAN, 1.0, 0.0))
            .validate()
            .is_err());
        assert!(base
            .with_clip(CoefficientClip {
                min: -0.1,
                max: 0.1
            })
            .validate()
            .is_err());
    }
}
