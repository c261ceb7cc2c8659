use crate::error::{with_last_error_mut, DefaultLesSgsError, LesSgsError, LesSgsErrorCode};
use les_sgs_core::{GridDimensions, ScalarField};
use std::ffi::CString;
use std::mem::size_of;
use std::slice;

/// Set the thread-local error message and code.
/// Accepts any type implementing `LesSgsError` trait.
pub(crate) fn set_last_error(error: &impl LesSgsError) {
    tracing::debug!(code = ?error.code(), "{}", error.msg());
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl LesSgsError) -> LesSgsErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = LesSgsErrorCode::Ok;
    });
}

/// Collapse a fallible body into an FFI return code, recording failures.
pub(crate) fn track_result(result: Result<(), DefaultLesSgsError>) -> LesSgsErrorCode {
    match result {
        Ok(()) => {
            clear_last_error();
            LesSgsErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// Validate interior extents; the padded array must be addressable in bytes
pub(crate) fn grid_from_extents(
    lx: usize,
    ly: usize,
    lz: usize,
) -> Result<GridDimensions, DefaultLesSgsError> {
    let invalid = || DefaultLesSgsError::invalid_dimensions(lx, ly, lz);
    if lx == 0 || ly == 0 || lz == 0 {
        return Err(invalid());
    }
    let bytes = [lx, ly, lz]
        .iter()
        .try_fold(size_of::<f64>(), |acc, &l| {
            l.checked_add(2).and_then(|padded| acc.checked_mul(padded))
        })
        .ok_or_else(invalid)?;
    if isize::try_from(bytes).is_err() {
        return Err(invalid());
    }
    Ok(GridDimensions::new(lx, ly, lz))
}

/// Reject a null pointer argument by name
pub(crate) fn require_non_null<T>(ptr: *const T, name: &str) -> Result<(), DefaultLesSgsError> {
    if ptr.is_null() {
        Err(DefaultLesSgsError::null_pointer(name))
    } else {
        Ok(())
    }
}

/// Copy a caller-owned padded array into a field
///
/// # Safety
/// `ptr` must be non-null and point to `dims.cell_count()` readable `f64` values.
pub(crate) unsafe fn field_from_raw(
    ptr: *const f64,
    dims: GridDimensions,
) -> Result<ScalarField, DefaultLesSgsError> {
    let values = slice::from_raw_parts(ptr, dims.cell_count());
    Ok(ScalarField::from_vec(dims, values.to_vec())?)
}

/// Copy a field back into a caller-owned padded array
///
/// # Safety
/// `ptr` must be non-null and point to `field.dims().cell_count()` writable
/// `f64` values not aliased by any live reference.
pub(crate) unsafe fn field_to_raw(field: &ScalarField, ptr: *mut f64) {
    let values = slice::from_raw_parts_mut(ptr, field.as_slice().len());
    values.copy_from_slice(field.as_slice());
}
