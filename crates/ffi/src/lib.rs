//! C ABI for the dynamic Smagorinsky estimator
//!
//! Every array argument is a padded `(lx+2)·(ly+2)·(lz+2)` block of `f64`
//! in x-slowest, z-fastest order. Functions return a [`LesSgsErrorCode`];
//! on failure a message is available from [`les_sgs_get_last_error`].
//!
//! ```c
//! size_t n = (lx + 2) * (ly + 2) * (lz + 2);
//! double* mu = calloc(n, sizeof(double));
//! if (les_sgs_dynamic_smagorinsky(rho, rho_u, rho_v, rho_w, mu,
//!                                 lx, ly, lz, hx, hy, hz, 0.0) != Ok) {
//!     fprintf(stderr, "%s\n", les_sgs_get_last_error());
//! }
//! ```

mod error;
mod helpers;

pub use error::{les_sgs_get_last_error, les_sgs_get_last_error_code, LesSgsErrorCode};

use error::DefaultLesSgsError;
use helpers::{field_from_raw, field_to_raw, grid_from_extents, require_non_null, track_result};
use les_sgs_core::{
    filter_field, ConservativeState, DynamicSmagorinsky, FilterKernel, GridSpacing, SgsConfig,
};

/// Compute `μ_SGS` for one conservative state.
///
/// # Arguments
/// * `rho`, `rho_u`, `rho_v`, `rho_w` - Padded density and momentum arrays (read only)
/// * `mu_sgs` - Padded output array; interior cells are overwritten, ghost cells keep their values
/// * `lx`, `ly`, `lz` - Interior cell counts
/// * `hx`, `hy`, `hz` - Grid spacing
/// * `delta_sq` - Squared grid filter width; `<= 0` derives `(hx·hy·hz)^(2/3)`
///
/// # Returns
/// - `Ok` on success
/// - `NullPointer` if any array is null
/// - `InvalidDimensions` if an extent is zero or the padded size overflows
/// - `InvalidParameter` if the spacing is not finite and positive, or `delta_sq` is not finite
///
/// # Safety
/// Every pointer must reference `(lx+2)·(ly+2)·(lz+2)` valid `f64` values.
/// `mu_sgs` must not overlap the input arrays.
#[no_mangle]
#[expect(clippy::too_many_arguments)]
pub unsafe extern "C" fn les_sgs_dynamic_smagorinsky(
    rho: *const f64,
    rho_u: *const f64,
    rho_v: *const f64,
    rho_w: *const f64,
    mu_sgs: *mut f64,
    lx: usize,
    ly: usize,
    lz: usize,
    hx: f64,
    hy: f64,
    hz: f64,
    delta_sq: f64,
) -> LesSgsErrorCode {
    track_result(estimate(
        [rho, rho_u, rho_v, rho_w],
        mu_sgs,
        [lx, ly, lz],
        GridSpacing::new(hx, hy, hz),
        delta_sq,
    ))
}

unsafe fn estimate(
    conservative: [*const f64; 4],
    mu_sgs: *mut f64,
    [lx, ly, lz]: [usize; 3],
    spacing: GridSpacing,
    delta_sq: f64,
) -> Result<(), DefaultLesSgsError> {
    for (ptr, name) in conservative.into_iter().zip(["rho", "rho_u", "rho_v", "rho_w"]) {
        require_non_null(ptr, name)?;
    }
    require_non_null(mu_sgs.cast_const(), "mu_sgs")?;
    let dims = grid_from_extents(lx, ly, lz)?;

    let mut config = SgsConfig::new(dims, spacing);
    if delta_sq > 0.0 || !delta_sq.is_finite() {
        config = config.with_delta_sq(delta_sq);
    }
    let estimator = DynamicSmagorinsky::new(config)?;

    let [rho, rho_u, rho_v, rho_w] = conservative;
    let density = field_from_raw(rho, dims)?;
    let momentum_x = field_from_raw(rho_u, dims)?;
    let momentum_y = field_from_raw(rho_v, dims)?;
    let momentum_z = field_from_raw(rho_w, dims)?;
    let mut mu = field_from_raw(mu_sgs.cast_const(), dims)?;

    let state = ConservativeState::new(&density, &momentum_x, &momentum_y, &momentum_z);
    estimator.compute(&state, &mut mu)?;
    field_to_raw(&mu, mu_sgs);
    Ok(())
}

/// Apply the separable three-point filter to one padded field.
///
/// `output` receives the filtered field in full, ghost cells included.
/// `input` and `output` may point to the same array.
///
/// # Returns
/// - `Ok` on success
/// - `NullPointer` if either array is null
/// - `InvalidDimensions` if an extent is zero or the padded size overflows
/// - `InvalidParameter` if a kernel weight is not finite
///
/// # Safety
/// Both pointers must reference `(lx+2)·(ly+2)·(lz+2)` valid `f64` values.
#[no_mangle]
#[expect(clippy::too_many_arguments)]
pub unsafe extern "C" fn les_sgs_filter_field(
    input: *const f64,
    output: *mut f64,
    lx: usize,
    ly: usize,
    lz: usize,
    h0: f64,
    h1: f64,
    h2: f64,
) -> LesSgsErrorCode {
    track_result(filter(input, output, [lx, ly, lz], FilterKernel::new(h0, h1, h2)))
}

unsafe fn filter(
    input: *const f64,
    output: *mut f64,
    [lx, ly, lz]: [usize; 3],
    kernel: FilterKernel,
) -> Result<(), DefaultLesSgsError> {
    require_non_null(input, "input")?;
    require_non_null(output.cast_const(), "output")?;
    let dims = grid_from_extents(lx, ly, lz)?;
    if !kernel.0.iter().all(|w| w.is_finite()) {
        return Err(DefaultLesSgsError::invalid_parameter(format!(
            "Filter weights must be finite, got {:?}",
            kernel.0
        )));
    }

    let field = field_from_raw(input, dims)?;
    let filtered = filter_field(&field, &kernel);
    field_to_raw(&filtered, output);
    Ok(())
}
