//! Diagnostic output of the flow state

pub mod tecplot;

pub use tecplot::{write_tecplot, write_tecplot_file};

use crate::field::ScalarField;
use crate::sgs::ConservativeState;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Conservative state plus total energy, as needed for diagnostics
#[derive(Debug, Clone, Copy)]
pub struct FlowSnapshot<'a> {
    pub state: ConservativeState<'a>,
    /// Total energy per unit volume E
    pub energy: &'a ScalarField,
}

/// Ideal-gas properties used to derive pressure and temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasProperties {
    /// Ratio of specific heats γ
    pub gamma: f64,
    /// Specific gas constant R (J/(kg·K))
    pub gas_constant: f64,
}

impl GasProperties {
    /// Static pressure `(γ - 1)(E - ½ρ|u|²)`
    #[inline]
    pub fn pressure(&self, rho: f64, velocity: &Vector3<f64>, energy: f64) -> f64 {
        (self.gamma - 1.0) * (energy - 0.5 * rho * velocity.norm_squared())
    }

    /// Temperature `p / (R ρ)`
    #[inline]
    pub fn temperature(&self, rho: f64, pressure: f64) -> f64 {
        pressure / (self.gas_constant * rho)
    }
}

impl Default for GasProperties {
    /// Dry air
    fn default() -> Self {
        Self {
            gamma: 1.4,
            gas_constant: 287.0,
        }
    }
}
