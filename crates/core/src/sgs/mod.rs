//! Sub-grid-scale closure: dynamic Smagorinsky model
//!
//! - `config`: explicit configuration and the fixed model constants
//! - `state`: conservative input view and primitive velocity recovery
//! - `algebra`: per-cell strain, contraction and clipping
//! - `dynamic`: the Germano-Lilly pipeline producing `μ_SGS`

pub mod algebra;
pub mod config;
pub mod dynamic;
pub mod state;

pub use algebra::{
    clip_coefficient, deviatoric, lilly_coefficient, model_tensor, strain_magnitude, strain_rate,
    velocity_gradient, ClipOutcome,
};
pub use config::{
    filter_width_sq, CoefficientClip, SgsConfig, COEFFICIENT_MAX, COEFFICIENT_MIN,
    DEFAULT_EPSILON, TEST_FILTER_RATIO, TEST_FILTER_RATIO_SQ,
};
pub use dynamic::{
    dynamic_smagorinsky, filter_velocity, leonard_stress, model_tensor_field, strain_models,
    DynamicSmagorinsky, SgsFields, SgsReport, StrainModels,
};
pub use state::{primitive_velocity, ConservativeState};
