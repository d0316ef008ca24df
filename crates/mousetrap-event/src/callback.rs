//! Subscriber callbacks.

use crate::{Event, EventError};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use thiserror::Error;

type CallbackFn = dyn Fn(&Event) -> Result<(), CallbackError> + Send + Sync;

/// A shareable event handler.
///
/// Identity is the identity of the wrapped closure: clones of one
/// `Callback` are equal, while two callbacks built from identical code
/// are not. This is what lets [`Bus::dont_call`](crate::Bus::dont_call)
/// remove exactly the registration it was given.
///
/// The label is only used in logs and error messages.
#[derive(Clone)]
pub struct Callback {
    label: Arc<str>,
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Wraps a closure.
    pub fn new<F>(label: impl AsRef<str>, func: F) -> Self
    where
        F: Fn(&Event) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self {
            label: Arc::from(label.as_ref()),
            func: Arc::new(func),
        }
    }

    /// Returns the diagnostic label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invokes the callback.
    ///
    /// # Errors
    ///
    /// Returns whatever the wrapped closure returns.
    pub fn invoke(&self, event: &Event) -> Result<(), CallbackError> {
        (self.func)(event)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.func).cast::<()>()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("label", &self.label)
            .field("addr", &self.addr())
            .finish()
    }
}

/// Error returned by a callback.
///
/// Aborts the dispatch it happened in and reaches the caller of `fire`
/// wrapped in [`EventError::CallbackFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EventError> for CallbackError {
    fn from(err: EventError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Diagnostic tag recorded with a required registration.
///
/// Reported by the unpublished-subscription audit so the offending
/// `call` site can be found. Defaults to the caller's source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(Arc<str>);

impl Origin {
    /// Creates an origin from an explicit tag.
    #[must_use]
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    /// Captures the source location of the (tracked) caller.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(format!(
            "{}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ))
    }

    /// Returns the tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Callback::new("noop", |_| Ok(()))
    }

    #[test]
    fn clones_are_equal() {
        let cb = noop();
        assert_eq!(cb, cb.clone());
    }

    #[test]
    fn separate_callbacks_differ() {
        assert_ne!(noop(), noop());
    }

    #[test]
    fn invoke_passes_event() {
        let cb = Callback::new("needs_x", |event: &Event| {
            event.get("x")?;
            Ok(())
        });
        assert!(cb.invoke(&Event::new("e").with("x", 1)).is_ok());

        let err = cb.invoke(&Event::new("e")).expect_err("x missing");
        assert!(err.message().contains("'x'"));
    }

    #[test]
    fn origin_points_at_caller() {
        let origin = Origin::caller();
        assert!(origin.as_str().contains("callback.rs"));
        assert_eq!(Origin::new("camera::init").to_string(), "camera::init");
    }
}
