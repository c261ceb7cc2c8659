//! Dynamic Smagorinsky eddy viscosity
//!
//! Estimates a spatially varying Smagorinsky coefficient with the Germano
//! identity and Lilly's least-squares contraction, then emits the sub-grid
//! viscosity used by the diffusive fluxes.
//!
//! # Procedure
//!
//! With `^` denoting the test filter (twice the grid filter width):
//!
//! ```text
//! L_ij = (u_i u_j)^ - û_i û_j                     Leonard stress
//! A_ij = |S| S_ij                                 grid level, from u
//! B_ij = |Ŝ| Ŝ_ij                                 test level, from û
//! M_ij = Δ² (4 B_ij - Â_ij)
//! Cd   = -½ (L^d : M) / (M : M + ε),  clipped to [0, 0.15]
//! μ_SGS = ρ Cd Δ² |S|
//! ```
//!
//! where `L^d` is the deviatoric (traceless) part of `L`.
//!
//! # Memory
//!
//! All temporaries come from a [`FieldPool`]. Each velocity product buffer is
//! filtered and then overwritten in place with the matching Leonard
//! component; each `A_ij` buffer is released as soon as it has been filtered
//! and folded into `M_ij`, which is written over `B_ij`. At most 34 grid-sized
//! buffers are live at once.

use super::algebra::{
    clip_coefficient, deviatoric, lilly_coefficient, model_tensor, strain_magnitude,
    strain_rate, velocity_gradient, ClipOutcome,
};
use super::config::SgsConfig;
use super::state::{primitive_velocity, ConservativeState};
use crate::error::SgsError;
use crate::field::{FieldPool, ScalarField, TensorField};
use crate::filter::{filter_field_pooled, FilterKernel};
use crate::profiler::StageTimer;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Summary of one estimator invocation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SgsReport {
    /// Interior cells written
    pub interior_cells: usize,
    /// Cells where `Cd` was raised to the lower bound (backscatter removed)
    pub clipped_low: usize,
    /// Cells where `Cd` was capped at the upper bound
    pub clipped_high: usize,
    /// Cells whose coefficient or viscosity came out non-finite
    pub non_finite: usize,
    /// Mean clipped coefficient over finite cells
    pub mean_coefficient: f64,
    /// Largest finite viscosity written
    pub max_viscosity: f64,
    /// Largest number of pooled grid buffers alive at once
    pub peak_buffers: usize,
}

/// Estimator output including the per-cell intermediate fields
#[derive(Debug, Clone)]
pub struct SgsFields {
    /// Clipped coefficient `Cd` (interior cells only; ghosts are zero)
    pub coefficient: ScalarField,
    /// Grid-level strain magnitude `|S|` (interior cells only; ghosts are zero)
    pub strain_magnitude: ScalarField,
    pub report: SgsReport,
}

/// Grid- and test-level `|S| S` products with the grid-level magnitude
#[derive(Debug)]
pub struct StrainModels {
    /// `|S|` from the unfiltered velocity
    pub magnitude: ScalarField,
    /// `A = |S| S`
    pub grid_level: TensorField,
    /// `B = |Ŝ| Ŝ`
    pub test_level: TensorField,
}

#[derive(Debug, Clone, Copy, Default)]
struct CoefficientStats {
    cells: usize,
    clipped_low: usize,
    clipped_high: usize,
    non_finite: usize,
    finite_cells: usize,
    coefficient_sum: f64,
    max_viscosity: f64,
}

impl CoefficientStats {
    fn record(&mut self, cd: f64, mu: f64, outcome: ClipOutcome) {
        self.cells += 1;
        match outcome {
            ClipOutcome::Low => self.clipped_low += 1,
            ClipOutcome::High => self.clipped_high += 1,
            ClipOutcome::Within => {}
        }
        if cd.is_finite() && mu.is_finite() {
            self.finite_cells += 1;
            self.coefficient_sum += cd;
            self.max_viscosity = self.max_viscosity.max(mu);
        } else {
            self.non_finite += 1;
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            cells: self.cells + other.cells,
            clipped_low: self.clipped_low + other.clipped_low,
            clipped_high: self.clipped_high + other.clipped_high,
            non_finite: self.non_finite + other.non_finite,
            finite_cells: self.finite_cells + other.finite_cells,
            coefficient_sum: self.coefficient_sum + other.coefficient_sum,
            max_viscosity: self.max_viscosity.max(other.max_viscosity),
        }
    }

    fn into_report(self, peak_buffers: usize) -> SgsReport {
        let mean_coefficient = if self.finite_cells > 0 {
            self.coefficient_sum / self.finite_cells as f64
        } else {
            0.0
        };
        SgsReport {
            interior_cells: self.cells,
            clipped_low: self.clipped_low,
            clipped_high: self.clipped_high,
            non_finite: self.non_finite,
            mean_coefficient,
            max_viscosity: self.max_viscosity,
            peak_buffers,
        }
    }
}

/// Dynamic Smagorinsky estimator bound to one grid configuration
#[derive(Debug, Clone)]
pub struct DynamicSmagorinsky {
    config: SgsConfig,
}

impl DynamicSmagorinsky {
    /// Create an estimator after validating `config`
    ///
    /// # Errors
    ///
    /// Returns [`SgsError::InvalidConfig`] if the configuration is rejected by
    /// [`SgsConfig::validate`].
    pub fn new(config: SgsConfig) -> Result<Self, SgsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SgsConfig {
        &self.config
    }

    /// Compute `μ_SGS` over interior cells of `mu_sgs`, in place
    ///
    /// Ghost cells of `mu_sgs` are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SgsError::ShapeMismatch`] if any field is not sized for the
    /// configured grid. Numerical degeneracy is not an error.
    pub fn compute(
        &self,
        state: &ConservativeState<'_>,
        mu_sgs: &mut ScalarField,
    ) -> Result<SgsReport, SgsError> {
        self.compute_detailed(state, mu_sgs).map(|fields| fields.report)
    }

    /// Like [`compute`](Self::compute), also returning `Cd` and `|S|`
    ///
    /// # Errors
    ///
    /// Returns [`SgsError::ShapeMismatch`] if any field is not sized for the
    /// configured grid.
    pub fn compute_detailed(
        &self,
        state: &ConservativeState<'_>,
        mu_sgs: &mut ScalarField,
    ) -> Result<SgsFields, SgsError> {
        let dims = self.config.grid;
        state.expect_dims(dims)?;
        mu_sgs.expect_dims(dims, "mu_sgs")?;

        let _timer = StageTimer::new("dynamic_smagorinsky");
        let kernel = &self.config.kernel;
        let mut pool = FieldPool::new(dims);

        let velocity = {
            let _stage = StageTimer::new("primitive_velocity");
            primitive_velocity(state, &mut pool)
        };

        let filtered_velocity = {
            let _stage = StageTimer::new("filter_velocity");
            filter_velocity(&velocity, kernel, &mut pool)
        };

        let leonard = {
            let _stage = StageTimer::new("leonard_stress");
            leonard_stress(&velocity, &filtered_velocity, kernel, &mut pool)
        };

        let strain = {
            let _stage = StageTimer::new("strain_models");
            strain_models(
                &velocity,
                &filtered_velocity,
                self.config.spacing.inverse_double_spacing(),
                &mut pool,
            )
        };
        for field in velocity.into_iter().chain(filtered_velocity) {
            pool.release(field);
        }

        let StrainModels {
            magnitude,
            grid_level,
            test_level,
        } = strain;

        let model = {
            let _stage = StageTimer::new("model_tensor");
            model_tensor_field(grid_level, test_level, kernel, self.config.delta_sq, &mut pool)
        };

        let mut coefficient = pool.acquire();
        let stats = {
            let _stage = StageTimer::new("coefficient");
            self.apply_coefficient(
                state.density,
                &leonard,
                &model,
                &magnitude,
                mu_sgs,
                &mut coefficient,
            )
        };
        leonard.release(&mut pool);
        model.release(&mut pool);

        let coefficient = pool.detach(coefficient);
        let strain_magnitude = pool.detach(magnitude);
        debug!(
            "Field pool: {} buffers allocated, peak {} in use",
            pool.allocated(),
            pool.peak_in_use()
        );

        let report = stats.into_report(pool.peak_in_use());
        info!(
            "Dynamic Smagorinsky: {} cells, mean Cd={:.4e}, clipped low={} high={}, max mu_sgs={:.4e}, peak buffers={}",
            report.interior_cells,
            report.mean_coefficient,
            report.clipped_low,
            report.clipped_high,
            report.max_viscosity,
            report.peak_buffers
        );
        if report.non_finite > 0 {
            warn!(
                "{} cells produced non-finite mu_sgs; check density and momentum inputs",
                report.non_finite
            );
        }

        Ok(SgsFields {
            coefficient,
            strain_magnitude,
            report,
        })
    }

    /// Contract, clip and write `μ_SGS` and `Cd` for every interior cell
    fn apply_coefficient(
        &self,
        density: &ScalarField,
        leonard: &TensorField,
        model: &TensorField,
        magnitude: &ScalarField,
        mu_sgs: &mut ScalarField,
        coefficient: &mut ScalarField,
    ) -> CoefficientStats {
        let dims = self.config.grid;
        let plane = dims.plane_len();
        let (px, py, pz) = dims.padded();
        let delta_sq = self.config.delta_sq;
        let epsilon = self.config.epsilon;
        let clip = self.config.clip;

        mu_sgs
            .as_mut_slice()
            .par_chunks_mut(plane)
            .zip(coefficient.as_mut_slice().par_chunks_mut(plane))
            .enumerate()
            .map(|(i, (mu_plane, cd_plane))| {
                let mut stats = CoefficientStats::default();
                if i == 0 || i == px - 1 {
                    return stats;
                }
                for j in 1..py - 1 {
                    for k in 1..pz - 1 {
                        let local = j * pz + k;
                        let idx = i * plane + local;

                        let l = deviatoric(&leonard.matrix_at(idx));
                        let m = model.matrix_at(idx);
                        let (cd, outcome) =
                            clip_coefficient(lilly_coefficient(&l, &m, epsilon), &clip);
                        let mu = density[idx] * cd * delta_sq * magnitude[idx];

                        mu_plane[local] = mu;
                        cd_plane[local] = cd;
                        stats.record(cd, mu, outcome);
                    }
                }
                stats
            })
            .reduce(CoefficientStats::default, CoefficientStats::merge)
    }
}

/// Compute `μ_SGS` with a one-off estimator for `config`
///
/// # Errors
///
/// Returns [`SgsError`] if the configuration is invalid or a field does not
/// match the configured grid.
pub fn dynamic_smagorinsky(
    config: &SgsConfig,
    state: &ConservativeState<'_>,
    mu_sgs: &mut ScalarField,
) -> Result<SgsReport, SgsError> {
    DynamicSmagorinsky::new(config.clone())?.compute(state, mu_sgs)
}

/// Test-filter the three velocity components
pub fn filter_velocity(
    velocity: &[ScalarField; 3],
    kernel: &FilterKernel,
    pool: &mut FieldPool,
) -> [ScalarField; 3] {
    std::array::from_fn(|a| filter_field_pooled(&velocity[a], kernel, pool))
}

/// Leonard stress `L_ab = (u_a u_b)^ - û_a û_b` over interior cells
///
/// The product `u_a u_b` is formed over every stored cell in a fresh buffer,
/// filtered, and the same buffer then receives `L_ab`. Ghost cells keep the
/// unfiltered product.
pub fn leonard_stress(
    velocity: &[ScalarField; 3],
    filtered_velocity: &[ScalarField; 3],
    kernel: &FilterKernel,
    pool: &mut FieldPool,
) -> TensorField {
    let dims = pool.dims();
    TensorField::from_components(|a, b| {
        let mut product = pool.acquire();
        for ((p, &ua), &ub) in product
            .as_mut_slice()
            .iter_mut()
            .zip(velocity[a].as_slice())
            .zip(velocity[b].as_slice())
        {
            *p = ua * ub;
        }

        let product_filtered = filter_field_pooled(&product, kernel, pool);
        for (i, j, k) in dims.interior() {
            let idx = dims.index(i, j, k);
            product[idx] =
                product_filtered[idx] - filtered_velocity[a][idx] * filtered_velocity[b][idx];
        }
        pool.release(product_filtered);
        product
    })
}

/// Strain tensors at both filter levels over interior cells
///
/// `A` comes from the unfiltered velocity and `B` from the already filtered
/// velocity's own strain; `B` is not a filtered `A`. Ghost cells stay zero.
pub fn strain_models(
    velocity: &[ScalarField; 3],
    filtered_velocity: &[ScalarField; 3],
    inv_2h: [f64; 3],
    pool: &mut FieldPool,
) -> StrainModels {
    let dims = pool.dims();
    let mut magnitude = pool.acquire();
    let mut grid_level = TensorField::acquire(pool);
    let mut test_level = TensorField::acquire(pool);

    for (i, j, k) in dims.interior() {
        let idx = dims.index(i, j, k);

        let s = strain_rate(&velocity_gradient(velocity, dims, inv_2h, idx));
        let s_mag = strain_magnitude(&s);
        magnitude[idx] = s_mag;
        grid_level.set_matrix_at(idx, &(s * s_mag));

        let s_hat = strain_rate(&velocity_gradient(filtered_velocity, dims, inv_2h, idx));
        test_level.set_matrix_at(idx, &(s_hat * strain_magnitude(&s_hat)));
    }

    StrainModels {
        magnitude,
        grid_level,
        test_level,
    }
}

/// Model tensor `M = Δ²(4B - Â)` over interior cells, written over `B`
///
/// Each `A_ij` is filtered, folded into `M_ij` and released before the next
/// component is touched.
pub fn model_tensor_field(
    grid_level: TensorField,
    test_level: TensorField,
    kernel: &FilterKernel,
    delta_sq: f64,
    pool: &mut FieldPool,
) -> TensorField {
    let dims = pool.dims();
    let mut model = test_level;

    for (slot, a_component) in grid_level.into_components().into_iter().enumerate() {
        let a_filtered = filter_field_pooled(&a_component, kernel, pool);
        pool.release(a_component);

        let m = model.component_mut(slot / 3, slot % 3);
        for (i, j, k) in dims.interior() {
            let idx = dims.index(i, j, k);
            m[idx] = model_tensor(m[idx], a_filtered[idx], delta_sq);
        }
        pool.release(a_filtered);
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridDimensions, GridSpacing};
    use approx::assert_relative_eq;

    fn uniform_state(dims: GridDimensions, rho: f64, vel: [f64; 3]) -> [ScalarField; 4] {
        [
            ScalarField::with_value(dims, rho),
            ScalarField::with_value(dims, rho * vel[0]),
            ScalarField::with_value(dims, rho * vel[1]),
            ScalarField::with_value(dims, rho * vel[2]),
        ]
    }

    #[test]
    fn test_uniform_flow_has_zero_viscosity() {
        let dims = GridDimensions::new(4, 4, 4);
        let [rho, ru, rv, rw] = uniform_state(dims, 1.2, [3.0, -1.0, 0.5]);
        let state = ConservativeState::new(&rho, &ru, &rv, &rw);
        let estimator =
            DynamicSmagorinsky::new(SgsConfig::new(dims, GridSpacing::uniform(0.1))).unwrap();

        let mut mu = ScalarField::with_value(dims, -1.0);
        let fields = estimator.compute_detailed(&state, &mut mu).unwrap();

        for (i, j, k) in dims.interior() {
            assert_eq!(fields.strain_magnitude.get(i, j, k), 0.0);
            assert_eq!(mu.get(i, j, k), 0.0);
        }
        assert_eq!(fields.report.interior_cells, 64);
        assert_eq!(fields.report.non_finite, 0);
    }

    #[test]
    fn test_ghost_cells_of_output_untouched() {
        let dims = GridDimensions::new(3, 3, 3);
        let [rho, ru, rv, rw] = uniform_state(dims, 1.0, [1.0, 0.0, 0.0]);
        let state = ConservativeState::new(&rho, &ru, &rv, &rw);
        let estimator = DynamicSmagorinsky::new(SgsConfig::new(dims, GridSpacing::default())).unwrap();

        let mut mu = ScalarField::with_value(dims, 42.0);
        estimator.compute(&state, &mut mu).unwrap();
        assert_eq!(mu.get(0, 2, 2), 42.0);
        assert_eq!(mu.get(4, 4, 4), 42.0);
        assert_eq!(mu.get(2, 2, 2), 0.0);
    }

    #[test]
    fn test_rejects_mismatched_output() {
        let dims = GridDimensions::new(3, 3, 3);
        let [rho, ru, rv, rw] = uniform_state(dims, 1.0, [0.0; 3]);
        let state = ConservativeState::new(&rho, &ru, &rv, &rw);
        let estimator = DynamicSmagorinsky::new(SgsConfig::new(dims, GridSpacing::default())).unwrap();

        let mut mu = ScalarField::new(GridDimensions::new(3, 3, 4));
        let err = estimator.compute(&state, &mut mu).unwrap_err();
        assert!(matches!(err, SgsError::ShapeMismatch { field: "mu_sgs", .. }));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SgsConfig::default().with_epsilon(-1.0);
        assert!(matches!(
            DynamicSmagorinsky::new(config),
            Err(SgsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_leonard_stress_of_linear_shear() {
        // u = y on unit spacing: box filter of y² adds 2/3, so L_xx = 2/3
        let dims = GridDimensions::new(4, 4, 4);
        let mut pool = FieldPool::new(dims);
        let velocity = [
            ScalarField::from_fn(dims, |_, j, _| j as f64),
            ScalarField::new(dims),
            ScalarField::new(dims),
        ];
        let filtered = filter_velocity(&velocity, &FilterKernel::BOX, &mut pool);
        let leonard = leonard_stress(&velocity, &filtered, &FilterKernel::BOX, &mut pool);

        for (i, j, k) in dims.interior() {
            let l = leonard.matrix_at(dims.index(i, j, k));
            assert_relative_eq!(l[(0, 0)], 2.0 / 3.0, epsilon = 1e-12);
            assert_relative_eq!(l[(0, 1)], 0.0, epsilon = 1e-12);
            assert_relative_eq!(l[(1, 1)], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_peak_buffer_bound() {
        let dims = GridDimensions::new(4, 3, 5);
        let rho = ScalarField::with_value(dims, 1.0);
        let ru = ScalarField::from_fn(dims, |i, j, k| ((i * j + k) as f64).sin());
        let rv = ScalarField::from_fn(dims, |i, j, k| ((i + 2 * j * k) as f64).cos());
        let rw = ScalarField::from_fn(dims, |i, j, k| ((i * k) as f64 - j as f64) * 0.1);
        let state = ConservativeState::new(&rho, &ru, &rv, &rw);
        let estimator = DynamicSmagorinsky::new(SgsConfig::new(dims, GridSpacing::default())).unwrap();

        let mut mu = ScalarField::new(dims);
        let report = estimator.compute(&state, &mut mu).unwrap();
        assert_eq!(report.peak_buffers, 34);
    }
}
