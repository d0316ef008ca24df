//! Declared subscriptions.

use mousetrap_event::{Bus, Callback, EventError, EventName, Origin};

/// A subscription a component has declared.
///
/// The component keeps its registrations across state changes; the
/// lifecycle driver registers them with the bus on entering `Running`
/// and unregisters them on leaving it.
///
/// Two registrations are equal when they pair the same callback with
/// the same event; optionality and origin are ignored.
#[derive(Debug, Clone)]
pub struct EventRegistration {
    /// The callback to invoke.
    pub callback: Callback,
    /// The event it listens for.
    pub event_name: EventName,
    /// `false` if the integrity audit should expect a publisher.
    pub optional: bool,
    /// Where the component declared it.
    pub origin: Origin,
}

impl EventRegistration {
    /// Creates a declaration; nothing touches the bus until
    /// [`register`](Self::register).
    #[must_use]
    pub fn new(callback: Callback, event_name: EventName, optional: bool, origin: Origin) -> Self {
        Self {
            callback,
            event_name,
            optional,
            origin,
        }
    }

    /// Returns `true` if this registration pairs `callback` with `event`.
    #[must_use]
    pub fn matches(&self, callback: &Callback, event: &EventName) -> bool {
        &self.callback == callback && &self.event_name == event
    }

    /// Makes the registration live on `bus`.
    pub fn register(&self, bus: &Bus) {
        bus.call_with(
            self.callback.clone(),
            self.event_name.clone(),
            self.optional,
            Some(self.origin.clone()),
        );
    }

    /// Removes one live instance of the registration from `bus`.
    ///
    /// # Errors
    ///
    /// [`EventError::CallbackNotRegistered`] if it is not live.
    pub fn unregister(&self, bus: &Bus) -> Result<(), EventError> {
        bus.dont_call(&self.callback, self.event_name.clone())
    }
}

impl PartialEq for EventRegistration {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.callback, &other.event_name)
    }
}

impl Eq for EventRegistration {}
