//! The plugin API handed to every component hook.

use crate::{ComponentError, EventRegistration, LifecycleState};
use mousetrap_event::{Bus, Callback, Event, EventData, EventName, Origin, SOURCE_KEY};
use mousetrap_types::ComponentId;
use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info_span, Span};

/// Per-component view of the bus, its settings and its logger.
///
/// Cheap to clone; clones share state. The engine creates one context
/// per component and passes it to every [`Lifecycle`](crate::Lifecycle)
/// hook.
///
/// # Subscriptions
///
/// [`call`](Self::call) declares a registration. It is live on the bus
/// only while the component is `Running`; the
/// [`LifecycleDriver`](crate::LifecycleDriver) toggles liveness on every
/// transition. Calling it while already running makes the new
/// registration live at once.
///
/// # Example
///
/// ```
/// use mousetrap_component::ComponentContext;
/// use mousetrap_event::{Bus, Callback};
/// use mousetrap_types::ComponentId;
///
/// let ctx = ComponentContext::new(ComponentId::builtin("nose"), Bus::new());
/// ctx.call(Callback::new("track", |_| Ok(())), "captured_image");
/// ctx.may_fire("nose_moved");
///
/// // Declared, but not live until the component starts.
/// assert_eq!(ctx.registrations().len(), 1);
/// assert!(!ctx.is_running());
/// ```
#[derive(Clone)]
pub struct ComponentContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    id: ComponentId,
    bus: Bus,
    config: Value,
    span: Span,
    state: Mutex<ContextState>,
}

#[derive(Debug, Default)]
pub(crate) struct ContextState {
    pub(crate) lifecycle: LifecycleState,
    pub(crate) registrations: Vec<EventRegistration>,
    pub(crate) publications: Vec<EventName>,
}

impl ComponentContext {
    /// Creates a context with an empty settings section.
    #[must_use]
    pub fn new(id: ComponentId, bus: Bus) -> Self {
        Self::with_config(id, bus, Value::Null)
    }

    /// Creates a context with the given settings section.
    #[must_use]
    pub fn with_config(id: ComponentId, bus: Bus, config: Value) -> Self {
        let span = info_span!("component", id = %id.fqn());
        Self {
            inner: Arc::new(ContextInner {
                id,
                bus,
                config,
                span,
                state: Mutex::new(ContextState::default()),
            }),
        }
    }

    /// Returns the component's identity.
    #[must_use]
    pub fn id(&self) -> &ComponentId {
        &self.inner.id
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.inner.state.lock().lifecycle
    }

    /// Returns `true` while the component is `Running`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Declares a required subscription of `callback` to `on`.
    #[track_caller]
    pub fn call(&self, callback: Callback, on: impl Into<EventName>) {
        self.call_with(callback, on, false, None);
    }

    /// Declares an optional subscription of `callback` to `on`.
    #[track_caller]
    pub fn call_optional(&self, callback: Callback, on: impl Into<EventName>) {
        self.call_with(callback, on, true, None);
    }

    /// Declares a subscription.
    ///
    /// The origin defaults to the caller's source location.
    #[track_caller]
    pub fn call_with(
        &self,
        callback: Callback,
        on: impl Into<EventName>,
        optional: bool,
        origin: Option<Origin>,
    ) {
        let origin = match origin {
            Some(origin) => origin,
            None => Origin::caller(),
        };
        let registration = EventRegistration::new(callback, on.into(), optional, origin);

        let mut state = self.inner.state.lock();
        if state.lifecycle.is_running() {
            registration.register(&self.inner.bus);
        }
        debug!(
            parent: &self.inner.span,
            event = %registration.event_name,
            callback = registration.callback.label(),
            live = state.lifecycle.is_running(),
            "declared registration"
        );
        state.registrations.push(registration);
    }

    /// Removes a declared subscription.
    ///
    /// The bus is only touched while the component is running. In any
    /// other state the registration is not live, and removing it from
    /// the bus anyway could take out an identical callback someone else
    /// registered for the same event.
    ///
    /// # Errors
    ///
    /// [`ComponentError::NotRegistered`] if no such registration was
    /// declared.
    pub fn dont_call(
        &self,
        callback: &Callback,
        on: impl Into<EventName>,
    ) -> Result<(), ComponentError> {
        let on = on.into();
        let mut state = self.inner.state.lock();

        let Some(index) = state
            .registrations
            .iter()
            .position(|reg| reg.matches(callback, &on))
        else {
            return Err(ComponentError::NotRegistered {
                component: self.inner.id.fqn(),
                event: on.to_string(),
                callback: callback.label().to_string(),
            });
        };

        let registration = state.registrations.remove(index);
        if state.lifecycle.is_running() {
            registration.unregister(&self.inner.bus)?;
        }
        Ok(())
    }

    /// Fires `name` with no data besides the `source` tag.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Event`] if a subscriber fails.
    pub fn fire(&self, name: impl Into<EventName>) -> Result<(), ComponentError> {
        self.fire_with(name, EventData::new())
    }

    /// Fires `name` with `data`, tagged with `source` set to this
    /// component's fully qualified name.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Event`] if a subscriber fails.
    pub fn fire_with(
        &self,
        name: impl Into<EventName>,
        data: EventData,
    ) -> Result<(), ComponentError> {
        let event = Event::new(name)
            .with_data(data)
            .with(SOURCE_KEY, self.inner.id.fqn());
        self.inner.bus.fire_event(event)?;
        Ok(())
    }

    /// Declares that this component may fire `name`.
    pub fn may_fire(&self, name: impl Into<EventName>) {
        let name = name.into();
        self.inner.bus.may_fire(&self.inner.id, name.clone());
        self.inner.state.lock().publications.push(name);
    }

    /// Withdraws one [`may_fire`](Self::may_fire) declaration.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Event`] if the component never declared `name`.
    pub fn wont_fire(&self, name: impl Into<EventName>) -> Result<(), ComponentError> {
        let name = name.into();
        self.inner.bus.wont_fire(&self.inner.id, name.clone())?;

        let mut state = self.inner.state.lock();
        if let Some(index) = state.publications.iter().position(|n| n == &name) {
            state.publications.remove(index);
        }
        Ok(())
    }

    /// Returns the component's settings section (`Null` if none).
    #[must_use]
    pub fn config(&self) -> &Value {
        &self.inner.config
    }

    /// Deserializes the settings section.
    ///
    /// A missing section deserializes like an empty table, so settings
    /// structs with `#[serde(default)]` work unconfigured.
    ///
    /// # Errors
    ///
    /// [`ComponentError::InvalidConfig`] if the section does not match `T`.
    pub fn settings<T: DeserializeOwned>(&self) -> Result<T, ComponentError> {
        let value = match &self.inner.config {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| ComponentError::InvalidConfig {
            component: self.inner.id.fqn(),
            message: e.to_string(),
        })
    }

    /// Returns the tracing span all of this component's hooks run in.
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.inner.span
    }

    /// Returns a snapshot of the declared registrations.
    #[must_use]
    pub fn registrations(&self) -> Vec<EventRegistration> {
        self.inner.state.lock().registrations.clone()
    }

    /// Returns the events this component declared it may fire.
    #[must_use]
    pub fn publications(&self) -> Vec<EventName> {
        self.inner.state.lock().publications.clone()
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, ContextState> {
        self.inner.state.lock()
    }
}

impl std::fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentContext")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.try_lock().map(|s| s.lifecycle))
            .finish_non_exhaustive()
    }
}
