//! Large-Eddy Simulation Sub-Grid-Scale Core Library
//!
//! Computes a spatially varying eddy viscosity for a structured-grid
//! compressible flow solver using the dynamic Smagorinsky model (Germano
//! procedure with Lilly's least-squares contraction).
//!
//! ## Components
//!
//! - `filter`: separable three-point field filter (box, Gaussian, identity)
//! - `sgs`: dynamic coefficient estimator producing `μ_SGS` from ρ, ρu, ρv, ρw
//! - `io`: Tecplot diagnostic writer for primitive variables and vorticity
//!
//! Fields are stored over the padded grid, one ghost layer per face, which
//! the caller's boundary-condition pass must populate before each call.

// Grid geometry and field storage
pub mod field;
pub mod grid;

// Numerical kernels
pub mod filter;
pub mod sgs;

// Diagnostics output
pub mod io;

pub mod error;
pub mod profiler;

// Re-export main types
pub use error::SgsError;
pub use field::{FieldPool, ScalarField, TensorField};
pub use filter::{filter_field, filter_field_pooled, FilterKernel};
pub use grid::{Axis, GridDimensions, GridSpacing};
pub use io::{GasProperties, FlowSnapshot};
pub use sgs::{
    dynamic_smagorinsky, CoefficientClip, ConservativeState, DynamicSmagorinsky, SgsConfig,
    SgsFields, SgsReport,
};
