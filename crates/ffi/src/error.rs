use les_sgs_core::SgsError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// Errors crossing the C boundary carry a code for the return value and a
/// message stored for `les_sgs_get_last_error`.
///
/// # Example
/// ```rust,ignore
/// let err = DefaultLesSgsError::null_pointer("rho");
/// assert_eq!(err.code(), LesSgsErrorCode::NullPointer);
/// assert_eq!(err.msg(), "Parameter 'rho' cannot be null");
/// ```
pub(crate) trait LesSgsError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> LesSgsErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `LesSgsError` for the FFI entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultLesSgsError {
    code: LesSgsErrorCode,
    msg: String,
}

impl DefaultLesSgsError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"rho"`, `"mu_sgs"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: LesSgsErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for grid dimensions that are zero or too large to index.
    pub fn invalid_dimensions(lx: usize, ly: usize, lz: usize) -> Self {
        Self {
            code: LesSgsErrorCode::InvalidDimensions,
            msg: format!(
                "Grid dimensions {lx}x{ly}x{lz} must be positive and addressable with ghost layers"
            ),
        }
    }

    /// Create error for invalid parameter.
    ///
    /// # Arguments
    /// * `message` - Description of the error
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: LesSgsErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<SgsError> for DefaultLesSgsError {
    fn from(error: SgsError) -> Self {
        let code = match error {
            SgsError::ShapeMismatch { .. } => LesSgsErrorCode::InvalidDimensions,
            SgsError::InvalidConfig(_) | SgsError::Io(_) => LesSgsErrorCode::InvalidParameter,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl LesSgsError for DefaultLesSgsError {
    fn code(&self) -> LesSgsErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by the estimator entry points.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LesSgsErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Grid dimensions are zero or the padded cell count overflows.
    InvalidDimensions = 2,

    /// Invalid parameter passed to function (spacing, filter width).
    InvalidParameter = 3,
}

impl From<DefaultLesSgsError> for LesSgsErrorCode {
    fn from(error: DefaultLesSgsError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is kept here so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, LesSgsErrorCode)> = const { RefCell::new((None, LesSgsErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, LesSgsErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, LesSgsErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded or no call has been made.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// LesSgsErrorCode err = les_sgs_dynamic_smagorinsky(rho, ru, rv, rw, mu,
///                                                   lx, ly, lz, hx, hy, hz, 0.0);
/// if (err != Ok) {
///     const char* error = les_sgs_get_last_error();
///     if (error) {
///         fprintf(stderr, "SGS estimate failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn les_sgs_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn les_sgs_get_last_error_code() -> LesSgsErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
