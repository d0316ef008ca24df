//! Bus - in-process publish/subscribe dispatcher.
//!
//! # Registries
//!
//! ```text
//! callbacks:  event name → [Callback]              (ordered, duplicates kept)
//! required:   event name → [RequiredRegistration]  (non-optional calls only)
//! publishers: event name → [ComponentId]           (may_fire declarations)
//! ```
//!
//! # Dispatch Contract
//!
//! - Callbacks run synchronously, in registration order, once per
//!   registration (registering twice means being called twice).
//! - The callback list is snapshotted when `fire` starts and the registry
//!   lock is released before any callback runs. Callbacks may therefore
//!   fire, subscribe or unsubscribe freely; such changes apply from the
//!   next `fire` on.
//! - The first failing callback aborts the rest of the dispatch and its
//!   error is returned to the caller. Subscribers are not isolated from
//!   each other.

use crate::{Callback, Event, EventData, EventError, EventName, Origin};
use mousetrap_types::ComponentId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};

/// A subscription that expects some publisher to exist.
#[derive(Debug, Clone)]
pub struct RequiredRegistration {
    /// The subscribed callback.
    pub callback: Callback,
    /// Where the subscription was made.
    pub origin: Origin,
}

#[derive(Debug, Default)]
struct Registry {
    callbacks: HashMap<EventName, Vec<Callback>>,
    required: HashMap<EventName, Vec<RequiredRegistration>>,
    publishers: HashMap<EventName, Vec<ComponentId>>,
}

/// Central event registry and dispatcher.
///
/// Cloning a `Bus` yields another handle to the same registry. The
/// engine owns the first handle and every component context holds a
/// clone; there is no global instance.
///
/// # Example
///
/// ```
/// use mousetrap_event::{Bus, Callback};
///
/// let bus = Bus::new();
/// let cb = Callback::new("noop", |_| Ok(()));
///
/// bus.call(cb.clone(), "captured_image");
/// bus.call(cb.clone(), "captured_image");
/// assert_eq!(bus.callback_count("captured_image"), 2);
///
/// bus.dont_call(&cb, "captured_image").unwrap();
/// assert_eq!(bus.callback_count("captured_image"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bus {
    registry: Arc<Mutex<Registry>>,
}

impl Bus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback` to `on` as a required registration.
    ///
    /// The caller's source location is recorded as the origin.
    #[track_caller]
    pub fn call(&self, callback: Callback, on: impl Into<EventName>) {
        self.call_with(callback, on, false, None);
    }

    /// Subscribes `callback` to `on` without a publisher expectation.
    #[track_caller]
    pub fn call_optional(&self, callback: Callback, on: impl Into<EventName>) {
        self.call_with(callback, on, true, None);
    }

    /// Subscribes `callback` to `on`.
    ///
    /// Appends to the event's callback list. Unless `optional`, also
    /// records a [`RequiredRegistration`] tagged with `origin` (or the
    /// caller's location when `None`).
    #[track_caller]
    pub fn call_with(
        &self,
        callback: Callback,
        on: impl Into<EventName>,
        optional: bool,
        origin: Option<Origin>,
    ) {
        let on = on.into();
        let origin = match origin {
            Some(origin) => origin,
            None => Origin::caller(),
        };
        debug!(event = %on, callback = callback.label(), optional, %origin, "call");

        let mut registry = self.registry.lock();
        if !optional {
            registry
                .required
                .entry(on.clone())
                .or_default()
                .push(RequiredRegistration {
                    callback: callback.clone(),
                    origin,
                });
        }
        registry.callbacks.entry(on).or_default().push(callback);
    }

    /// Unsubscribes one registration of `callback` from `on`.
    ///
    /// Removes the first matching entry of the callback list and every
    /// required record for that callback.
    ///
    /// # Errors
    ///
    /// [`EventError::CallbackNotRegistered`] if `callback` is not
    /// subscribed to `on`. Nothing is changed in that case.
    pub fn dont_call(&self, callback: &Callback, on: impl Into<EventName>) -> Result<(), EventError> {
        let on = on.into();
        let mut registry = self.registry.lock();

        let removed = registry.callbacks.get_mut(&on).and_then(|list| {
            list.iter()
                .position(|cb| cb == callback)
                .map(|index| list.remove(index))
        });
        if removed.is_none() {
            debug!(event = %on, callback = callback.label(), "dont_call: not registered");
            return Err(EventError::CallbackNotRegistered {
                event: on.to_string(),
                callback: callback.label().to_string(),
            });
        }
        if registry.callbacks.get(&on).is_some_and(Vec::is_empty) {
            registry.callbacks.remove(&on);
        }

        if let Some(required) = registry.required.get_mut(&on) {
            required.retain(|record| &record.callback != callback);
            if required.is_empty() {
                registry.required.remove(&on);
            }
        }

        debug!(event = %on, callback = callback.label(), "dont_call");
        Ok(())
    }

    /// Fires an event with no data.
    ///
    /// # Errors
    ///
    /// See [`fire_event`](Self::fire_event).
    pub fn fire(&self, name: impl Into<EventName>) -> Result<(), EventError> {
        self.fire_event(Event::new(name))
    }

    /// Fires an event carrying `data`.
    ///
    /// # Errors
    ///
    /// See [`fire_event`](Self::fire_event).
    pub fn fire_with(&self, name: impl Into<EventName>, data: EventData) -> Result<(), EventError> {
        self.fire_event(Event::new(name).with_data(data))
    }

    /// Dispatches `event` to every callback registered for its name.
    ///
    /// # Errors
    ///
    /// [`EventError::CallbackFailed`] for the first callback that fails.
    /// Later callbacks are not invoked.
    pub fn fire_event(&self, event: Event) -> Result<(), EventError> {
        let snapshot = self
            .registry
            .lock()
            .callbacks
            .get(event.name())
            .cloned()
            .unwrap_or_default();

        trace!(event = %event.name(), subscribers = snapshot.len(), "fire");

        for callback in &snapshot {
            callback
                .invoke(&event)
                .map_err(|source| EventError::CallbackFailed {
                    event: event.name().to_string(),
                    callback: callback.label().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Declares that `publisher` may fire `name`.
    pub fn may_fire(&self, publisher: &ComponentId, name: impl Into<EventName>) {
        let name = name.into();
        debug!(event = %name, publisher = %publisher.fqn(), "may_fire");
        self.registry
            .lock()
            .publishers
            .entry(name)
            .or_default()
            .push(publisher.clone());
    }

    /// Withdraws one `may_fire` declaration.
    ///
    /// # Errors
    ///
    /// [`EventError::PublisherNotDeclared`] if `publisher` never declared
    /// `name`.
    pub fn wont_fire(&self, publisher: &ComponentId, name: impl Into<EventName>) -> Result<(), EventError> {
        let name = name.into();
        let mut registry = self.registry.lock();

        let removed = registry.publishers.get_mut(&name).and_then(|list| {
            list.iter()
                .position(|p| p == publisher)
                .map(|index| list.remove(index))
        });
        if removed.is_none() {
            return Err(EventError::PublisherNotDeclared {
                event: name.to_string(),
                publisher: publisher.fqn(),
            });
        }
        if registry.publishers.get(&name).is_some_and(Vec::is_empty) {
            registry.publishers.remove(&name);
        }

        debug!(event = %name, publisher = %publisher.fqn(), "wont_fire");
        Ok(())
    }

    /// Returns `true` if at least one publisher declared `name`.
    #[must_use]
    pub fn has_publisher(&self, name: &str) -> bool {
        self.registry
            .lock()
            .publishers
            .get(name)
            .is_some_and(|list| !list.is_empty())
    }

    /// Returns the publishers that declared `name`, in declaration order.
    #[must_use]
    pub fn publishers(&self, name: &str) -> Vec<ComponentId> {
        self.registry
            .lock()
            .publishers
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns how many registrations `name` currently has.
    #[must_use]
    pub fn callback_count(&self, name: &str) -> usize {
        self.registry
            .lock()
            .callbacks
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Returns `true` if `callback` is currently registered for `name`.
    #[must_use]
    pub fn is_registered(&self, callback: &Callback, name: &str) -> bool {
        self.registry
            .lock()
            .callbacks
            .get(name)
            .is_some_and(|list| list.contains(callback))
    }

    /// Lists required registrations for events nobody may fire.
    ///
    /// Advisory: such subscriptions can never be triggered, which usually
    /// means a component is missing from the configuration.
    #[must_use]
    pub fn unpublished_required_registrations(
        &self,
    ) -> BTreeMap<EventName, Vec<RequiredRegistration>> {
        let registry = self.registry.lock();
        registry
            .required
            .iter()
            .filter(|(name, records)| {
                !records.is_empty()
                    && registry
                        .publishers
                        .get(*name)
                        .map_or(true, |list| list.is_empty())
            })
            .map(|(name, records)| (name.clone(), records.clone()))
            .collect()
    }
}
