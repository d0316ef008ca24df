//! Component layer errors.
//!
//! # Error Code Convention
//!
//! All component errors use the `COMPONENT_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`ExecutionFailed`](ComponentError::ExecutionFailed) | `COMPONENT_EXECUTION_FAILED` | Yes |
//! | [`InitFailed`](ComponentError::InitFailed) | `COMPONENT_INIT_FAILED` | Yes |
//! | [`InvalidConfig`](ComponentError::InvalidConfig) | `COMPONENT_INVALID_CONFIG` | No |
//! | [`NotRegistered`](ComponentError::NotRegistered) | `COMPONENT_NOT_REGISTERED` | No |
//! | [`Event`](ComponentError::Event) | `COMPONENT_EVENT` | Same as the inner error |
//!
//! # Example
//!
//! ```
//! use mousetrap_component::ComponentError;
//! use mousetrap_types::ErrorCode;
//!
//! let err = ComponentError::ExecutionFailed("camera busy".into());
//! assert_eq!(err.code(), "COMPONENT_EXECUTION_FAILED");
//! assert!(err.is_recoverable());
//! ```

use mousetrap_event::{CallbackError, EventError};
use mousetrap_types::ErrorCode;
use thiserror::Error;

/// Component layer error.
///
/// Hooks return it; the lifecycle driver and the plugin API produce it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// A hook or callback could not do its work.
    ///
    /// The generic variant for component authors.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// `init` failed; the component was rolled back and not loaded.
    #[error("initialization of '{component}' failed: {source}")]
    InitFailed {
        component: String,
        #[source]
        source: Box<ComponentError>,
    },

    /// The component's settings section does not match what it expects.
    #[error("invalid config for '{component}': {message}")]
    InvalidConfig { component: String, message: String },

    /// `dont_call` for a registration the component never declared.
    #[error("'{component}' has no registration of '{callback}' for '{event}'")]
    NotRegistered {
        component: String,
        event: String,
        callback: String,
    },

    /// A bus operation failed.
    #[error(transparent)]
    Event(#[from] EventError),
}

impl ComponentError {
    /// Convenience constructor for [`ComponentError::ExecutionFailed`].
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::ExecutionFailed(message.into())
    }
}

impl ErrorCode for ComponentError {
    fn code(&self) -> &'static str {
        match self {
            Self::ExecutionFailed(_) => "COMPONENT_EXECUTION_FAILED",
            Self::InitFailed { .. } => "COMPONENT_INIT_FAILED",
            Self::InvalidConfig { .. } => "COMPONENT_INVALID_CONFIG",
            Self::NotRegistered { .. } => "COMPONENT_NOT_REGISTERED",
            Self::Event(_) => "COMPONENT_EVENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::ExecutionFailed(_) | Self::InitFailed { .. } => true,
            Self::InvalidConfig { .. } | Self::NotRegistered { .. } => false,
            Self::Event(inner) => inner.is_recoverable(),
        }
    }
}

impl From<ComponentError> for CallbackError {
    fn from(err: ComponentError) -> Self {
        CallbackError::new(err.to_string())
    }
}
