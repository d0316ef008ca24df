//! Event layer errors.
//!
//! # Error Code Convention
//!
//! All event errors use the `EVENT_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`EventError::CallbackNotRegistered`] | `EVENT_CALLBACK_NOT_REGISTERED` | No |
//! | [`EventError::PublisherNotDeclared`] | `EVENT_PUBLISHER_NOT_DECLARED` | No |
//! | [`EventError::MissingKey`] | `EVENT_MISSING_KEY` | No |
//! | [`EventError::CallbackFailed`] | `EVENT_CALLBACK_FAILED` | Yes |
//!
//! The first two are lookup failures: removing something that was
//! never added. They indicate a wiring bug in the caller.
//!
//! `CallbackFailed` is what a subscriber's error becomes on its way back
//! to the caller of `fire`. The bus never swallows it.

use crate::CallbackError;
use mousetrap_types::ErrorCode;
use thiserror::Error;

/// Event layer error.
///
/// # Example
///
/// ```
/// use mousetrap_event::EventError;
/// use mousetrap_types::ErrorCode;
///
/// let err = EventError::PublisherNotDeclared {
///     event: "tick".into(),
///     publisher: "builtin::engine".into(),
/// };
/// assert_eq!(err.code(), "EVENT_PUBLISHER_NOT_DECLARED");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// `dont_call` for a callback that is not registered for the event.
    #[error("callback '{callback}' is not registered for '{event}'")]
    CallbackNotRegistered { event: String, callback: String },

    /// `wont_fire` for a publisher that never declared the event.
    #[error("'{publisher}' never declared it may fire '{event}'")]
    PublisherNotDeclared { event: String, publisher: String },

    /// Payload lookup for a key the event does not carry.
    #[error("event '{event}' has no key '{key}'")]
    MissingKey { event: String, key: String },

    /// A subscriber failed; dispatch of the event was aborted.
    #[error("callback '{callback}' failed while handling '{event}': {source}")]
    CallbackFailed {
        event: String,
        callback: String,
        #[source]
        source: CallbackError,
    },
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::CallbackNotRegistered { .. } => "EVENT_CALLBACK_NOT_REGISTERED",
            Self::PublisherNotDeclared { .. } => "EVENT_PUBLISHER_NOT_DECLARED",
            Self::MissingKey { .. } => "EVENT_MISSING_KEY",
            Self::CallbackFailed { .. } => "EVENT_CALLBACK_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::CallbackFailed { .. } => true,
            Self::CallbackNotRegistered { .. }
            | Self::PublisherNotDeclared { .. }
            | Self::MissingKey { .. } => false,
        }
    }
}
