//! Shared fixtures for integration tests

#![allow(dead_code)]

use les_sgs_core::{GridDimensions, GridSpacing, ScalarField};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Install a test-writer subscriber once; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Conservative fields (ρ, ρu, ρv, ρw) built from primitive profiles
pub struct Flow {
    pub rho: ScalarField,
    pub ru: ScalarField,
    pub rv: ScalarField,
    pub rw: ScalarField,
}

impl Flow {
    /// Evaluate density and velocity at every padded cell centre
    pub fn from_primitive<R, V>(
        dims: GridDimensions,
        spacing: GridSpacing,
        mut density: R,
        mut velocity: V,
    ) -> Self
    where
        R: FnMut(f64, f64, f64) -> f64,
        V: FnMut(f64, f64, f64) -> [f64; 3],
    {
        let mut rho = ScalarField::new(dims);
        let mut ru = ScalarField::new(dims);
        let mut rv = ScalarField::new(dims);
        let mut rw = ScalarField::new(dims);
        let (px, py, pz) = dims.padded();
        for i in 0..px {
            for j in 0..py {
                for k in 0..pz {
                    let x = spacing.cell_center(les_sgs_core::Axis::X, i);
                    let y = spacing.cell_center(les_sgs_core::Axis::Y, j);
                    let z = spacing.cell_center(les_sgs_core::Axis::Z, k);
                    let r = density(x, y, z);
                    let [u, v, w] = velocity(x, y, z);
                    rho.set(i, j, k, r);
                    ru.set(i, j, k, r * u);
                    rv.set(i, j, k, r * v);
                    rw.set(i, j, k, r * w);
                }
            }
        }
        Self { rho, ru, rv, rw }
    }

    /// Random positive density and random velocity in every cell
    pub fn random(dims: GridDimensions, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut field = |lo: f64, hi: f64| {
            let values = (0..dims.cell_count())
                .map(|_| rng.random_range(lo..hi))
                .collect();
            ScalarField::from_vec(dims, values).unwrap()
        };
        let rho = field(0.5, 2.0);
        let ru = field(-3.0, 3.0);
        let rv = field(-3.0, 3.0);
        let rw = field(-3.0, 3.0);
        Self { rho, ru, rv, rw }
    }

    pub fn state(&self) -> les_sgs_core::ConservativeState<'_> {
        les_sgs_core::ConservativeState::new(&self.rho, &self.ru, &self.rv, &self.rw)
    }
}

/// Random field with values in `[lo, hi)`
pub fn random_field(dims: GridDimensions, seed: u64, lo: f64, hi: f64) -> ScalarField {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..dims.cell_count())
        .map(|_| rng.random_range(lo..hi))
        .collect();
    ScalarField::from_vec(dims, values).unwrap()
}
