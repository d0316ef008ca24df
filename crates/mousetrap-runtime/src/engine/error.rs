//! Engine Layer Errors.
//!
//! All errors implement [`ErrorCode`] for standardized handling.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`EngineError::UnknownComponent`] | `ENGINE_UNKNOWN_COMPONENT` | No |
//! | [`EngineError::ComponentLoad`] | `ENGINE_COMPONENT_LOAD` | No |
//! | [`EngineError::ComponentFailed`] | `ENGINE_COMPONENT_FAILED` | No |
//! | [`EngineError::Dispatch`] | `ENGINE_DISPATCH` | Yes |
//! | [`EngineError::Config`] | `ENGINE_CONFIG` | Depends on source |
//!
//! # Recoverability
//!
//! A failed dispatch leaves the bus intact; the next tick may succeed.
//! Load failures need a config change.

use crate::config::ConfigError;
use mousetrap_component::ComponentError;
use mousetrap_event::EventError;
use mousetrap_types::ErrorCode;
use thiserror::Error;

/// Engine layer error.
///
/// # Example
///
/// ```
/// use mousetrap_runtime::EngineError;
/// use mousetrap_types::ErrorCode;
///
/// let err = EngineError::UnknownComponent {
///     name: "camera".into(),
///     known: "noop".into(),
/// };
/// assert_eq!(err.code(), "ENGINE_UNKNOWN_COMPONENT");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configured identifier is not in the registry.
    #[error("unknown component '{name}' (known: {known})")]
    UnknownComponent { name: String, known: String },

    /// Component could not be constructed or initialized.
    #[error("failed to load component '{name}': {source}")]
    ComponentLoad {
        name: String,
        #[source]
        source: ComponentError,
    },

    /// Loaded component failed while being detached.
    #[error("component '{name}' failed: {source}")]
    ComponentFailed {
        name: String,
        #[source]
        source: ComponentError,
    },

    /// A subscriber failed while the engine was firing.
    #[error(transparent)]
    Dispatch(#[from] EventError),

    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownComponent { .. } => "ENGINE_UNKNOWN_COMPONENT",
            Self::ComponentLoad { .. } => "ENGINE_COMPONENT_LOAD",
            Self::ComponentFailed { .. } => "ENGINE_COMPONENT_FAILED",
            Self::Dispatch(_) => "ENGINE_DISPATCH",
            Self::Config(_) => "ENGINE_CONFIG",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Dispatch(_) => true,
            Self::Config(e) => e.is_recoverable(),
            Self::UnknownComponent { .. }
            | Self::ComponentLoad { .. }
            | Self::ComponentFailed { .. } => false,
        }
    }
}
