//! Test harness for [`Lifecycle`] implementations.
//!
//! Runs one component on a private [`Bus`] without an engine. The
//! harness declares itself as a publisher of the meta-events, fires them
//! on request and records every transition.
//!
//! # Example
//!
//! ```
//! use mousetrap_component::testing::LifecycleHarness;
//! use mousetrap_component::{ComponentContext, ComponentError, Lifecycle, LifecycleState};
//! use mousetrap_event::{Callback, EventData};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Nose {
//!     frames: Arc<AtomicUsize>,
//! }
//!
//! impl Lifecycle for Nose {
//!     fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
//!         let frames = Arc::clone(&self.frames);
//!         ctx.call(
//!             Callback::new("on_image", move |_| {
//!                 frames.fetch_add(1, Ordering::SeqCst);
//!                 Ok(())
//!             }),
//!             "captured_image",
//!         );
//!         Ok(())
//!     }
//! }
//!
//! let harness = LifecycleHarness::new(Nose::default()).unwrap();
//! harness.fire("captured_image", EventData::new()).unwrap();
//! assert_eq!(harness.component().frames.load(Ordering::SeqCst), 0);
//!
//! harness.start().unwrap();
//! harness.fire("captured_image", EventData::new()).unwrap();
//! assert_eq!(harness.component().frames.load(Ordering::SeqCst), 1);
//!
//! harness.pause().unwrap();
//! harness.fire("captured_image", EventData::new()).unwrap();
//! assert_eq!(harness.component().frames.load(Ordering::SeqCst), 1);
//! assert_eq!(harness.state(), LifecycleState::Paused);
//! ```

use crate::{ComponentContext, ComponentError, Lifecycle, LifecycleDriver, LifecycleState, ManagedComponent};
use mousetrap_event::{Bus, Callback, Event, EventData, EventError, EventName, LifecycleEvent};
use mousetrap_types::ComponentId;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// One meta-event fired through the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    /// The meta-event fired.
    pub trigger: LifecycleEvent,
    /// State before firing.
    pub from: LifecycleState,
    /// State after the dispatch returned.
    pub to: LifecycleState,
    /// Error message, if the dispatch failed.
    pub error: Option<String>,
}

/// Test harness for a single component.
pub struct LifecycleHarness<L: Lifecycle> {
    bus: Bus,
    publisher: ComponentId,
    driver: Arc<LifecycleDriver<L>>,
    transitions: Mutex<Vec<TransitionRecord>>,
}

impl<L: Lifecycle> LifecycleHarness<L> {
    /// Attaches `component` with an empty settings section.
    ///
    /// # Errors
    ///
    /// The component's `init` failure.
    pub fn new(component: L) -> Result<Self, ComponentError> {
        Self::with_config(component, Value::Null)
    }

    /// Attaches `component` with the given settings section.
    ///
    /// # Errors
    ///
    /// The component's `init` failure.
    pub fn with_config(component: L, config: Value) -> Result<Self, ComponentError> {
        let bus = Bus::new();
        let publisher = ComponentId::builtin("harness");
        for event in LifecycleEvent::ALL {
            bus.may_fire(&publisher, event);
        }
        let ctx = ComponentContext::with_config(ComponentId::new("test", "component"), bus.clone(), config);
        let driver = LifecycleDriver::attach(component, ctx)?;
        Ok(Self {
            bus,
            publisher,
            driver,
            transitions: Mutex::new(Vec::new()),
        })
    }

    /// Returns the component under test.
    pub fn component(&self) -> &L {
        self.driver.component()
    }

    /// Returns the component's context.
    pub fn context(&self) -> &ComponentContext {
        self.driver.context()
    }

    /// Returns the private bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.driver.state()
    }

    /// Fires `start_components`.
    ///
    /// # Errors
    ///
    /// The hook's failure, wrapped by the bus.
    pub fn start(&self) -> Result<(), EventError> {
        self.lifecycle(LifecycleEvent::StartComponents)
    }

    /// Fires `stop_components`.
    ///
    /// # Errors
    ///
    /// The hook's failure, wrapped by the bus.
    pub fn stop(&self) -> Result<(), EventError> {
        self.lifecycle(LifecycleEvent::StopComponents)
    }

    /// Fires `pause_components`.
    ///
    /// # Errors
    ///
    /// The hook's failure, wrapped by the bus.
    pub fn pause(&self) -> Result<(), EventError> {
        self.lifecycle(LifecycleEvent::PauseComponents)
    }

    /// Fires `resume_components`.
    ///
    /// # Errors
    ///
    /// The hook's failure, wrapped by the bus.
    pub fn resume(&self) -> Result<(), EventError> {
        self.lifecycle(LifecycleEvent::ResumeComponents)
    }

    /// Fires a domain event on the private bus.
    ///
    /// The harness declares itself as publisher of `name` first, so the
    /// component's required registrations count as published.
    ///
    /// # Errors
    ///
    /// The first subscriber failure.
    pub fn fire(&self, name: impl Into<EventName>, data: EventData) -> Result<(), EventError> {
        let name = name.into();
        if !self.bus.publishers(name.as_str()).contains(&self.publisher) {
            self.bus.may_fire(&self.publisher, name.clone());
        }
        self.bus.fire_with(name, data)
    }

    /// Subscribes a recording callback to `name` (optional registration).
    pub fn probe(&self, name: impl Into<EventName>) -> Probe {
        let probe = Probe::default();
        let sink = Arc::clone(&probe.events);
        self.bus.call_optional(
            Callback::new("harness-probe", move |event: &Event| {
                sink.lock().push(event.clone());
                Ok(())
            }),
            name,
        );
        probe
    }

    /// Returns every meta-event fired through the harness.
    pub fn transitions(&self) -> Vec<TransitionRecord> {
        self.transitions.lock().clone()
    }

    /// Detaches the component from the private bus.
    ///
    /// # Errors
    ///
    /// The `stop` hook's failure.
    pub fn detach(&self) -> Result<(), ComponentError> {
        self.driver.detach()
    }

    fn lifecycle(&self, trigger: LifecycleEvent) -> Result<(), EventError> {
        let from = self.state();
        let result = self.bus.fire(trigger);
        self.transitions.lock().push(TransitionRecord {
            trigger,
            from,
            to: self.state(),
            error: result.as_ref().err().map(ToString::to_string),
        });
        result
    }
}

/// Events captured by [`LifecycleHarness::probe`].
#[derive(Debug, Clone, Default)]
pub struct Probe {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Probe {
    /// Number of events received.
    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    /// All events received, in order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// The most recent event.
    pub fn last(&self) -> Option<Event> {
        self.events.lock().last().cloned()
    }
}
