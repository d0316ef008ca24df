//! Unified error interface for mousetrap.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so that
//! logs and the CLI can report a stable, machine-readable code next to
//! the human message.
//!
//! | Crate | Prefix |
//! |-------|--------|
//! | `mousetrap-event` | `EVENT_` |
//! | `mousetrap-component` | `COMPONENT_` |
//! | `mousetrap-runtime` | `ENGINE_`, `CONFIG_` |
//!
//! # Example
//!
//! ```
//! use mousetrap_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum CameraError {
//!     DeviceBusy,
//!     NoDevice,
//! }
//!
//! impl ErrorCode for CameraError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::DeviceBusy => "CAMERA_DEVICE_BUSY",
//!             Self::NoDevice => "CAMERA_NO_DEVICE",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::DeviceBusy)
//!     }
//! }
//!
//! assert_eq!(CameraError::DeviceBusy.code(), "CAMERA_DEVICE_BUSY");
//! assert!(!CameraError::NoDevice.is_recoverable());
//! ```

/// Machine-readable error classification.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**, e.g. `"EVENT_CALLBACK_NOT_REGISTERED"`
/// - **Prefixed** with the owning crate's namespace
/// - **Stable**: codes are part of the public contract
pub trait ErrorCode {
    /// Returns the error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying (or fixing input and retrying) may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, prefixed and UPPER_SNAKE_CASE.
///
/// # Panics
///
/// Panics with a descriptive message if any check fails.
///
/// ```
/// use mousetrap_types::{assert_error_code, ErrorCode};
///
/// struct Timeout;
///
/// impl ErrorCode for Timeout {
///     fn code(&self) -> &'static str { "MY_TIMEOUT" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Timeout, "MY_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Runs [`assert_error_code`] over every variant in `errors`.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
