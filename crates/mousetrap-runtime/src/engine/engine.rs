//! Engine - Main Runtime.
//!
//! The [`Engine`] is the only publisher of the meta-events and of
//! [`TICK_EVENT`]. It never runs a loop of its own: the host calls
//! [`Engine::tick`] on its timer and maps outside triggers onto the
//! other operations.
//!
//! # Startup
//!
//! ```text
//! start()
//!   1. load_components()   fail-fast, in configured order
//!   2. fire start_components
//!   3. audit()             warn about required subscriptions nobody feeds
//! ```
//!
//! Declared subscriptions only reach the bus once their component is
//! running, so the audit has to follow `start_components`.
//!
//! # Reload
//!
//! ```text
//! reload(config)
//!   1. fire pause_components
//!   2. swap config
//!   3. detach components no longer configured (or whose settings changed)
//!   4. load_components()
//!   5. fire resume_components, then start_components
//!   6. audit()
//! ```
//!
//! If step 4 fails the surviving components stay paused; the host
//! decides whether to [`resume`](Engine::resume) them.

use super::error::EngineError;
use crate::config::MousetrapConfig;
use crate::registry::ComponentRegistry;
use mousetrap_component::{ComponentContext, LifecycleState, ManagedComponent};
use mousetrap_event::{
    Bus, Event, EventData, EventName, LifecycleEvent, RequiredRegistration, SOURCE_KEY,
};
use mousetrap_types::ComponentId;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Event fired by [`Engine::tick`], carrying `seq`.
pub const TICK_EVENT: &str = "tick";

/// Builtin name of the engine's own [`ComponentId`].
pub const ENGINE_NAME: &str = "engine";

struct Loaded {
    identifier: String,
    settings: Value,
    handle: Arc<dyn ManagedComponent>,
}

/// Snapshot of one loaded component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStatus {
    /// Registry identifier it was loaded under.
    pub identifier: String,
    /// Its id on the bus.
    pub id: ComponentId,
    /// Current lifecycle state.
    pub state: LifecycleState,
}

/// The supervisor.
///
/// # Example
///
/// ```
/// use mousetrap_runtime::{Engine, MousetrapConfig};
/// use mousetrap_component::LifecycleState;
///
/// let mut config = MousetrapConfig::default();
/// config.components.load = vec!["noop".into()];
///
/// let mut engine = Engine::new(config);
/// engine.start().unwrap();
/// assert_eq!(engine.components()[0].state, LifecycleState::Running);
///
/// engine.shutdown().unwrap();
/// assert!(engine.components().is_empty());
/// ```
pub struct Engine {
    id: ComponentId,
    bus: Bus,
    config: MousetrapConfig,
    registry: ComponentRegistry,
    loaded: Vec<Loaded>,
    seq: u64,
}

impl Engine {
    /// Creates an engine with the builtin components available.
    #[must_use]
    pub fn new(config: MousetrapConfig) -> Self {
        Self::with_registry(config, ComponentRegistry::with_builtins())
    }

    /// Creates an engine loading from `registry`.
    #[must_use]
    pub fn with_registry(config: MousetrapConfig, registry: ComponentRegistry) -> Self {
        let bus = Bus::new();
        let id = ComponentId::builtin(ENGINE_NAME);

        for event in LifecycleEvent::ALL {
            bus.may_fire(&id, event);
        }
        bus.may_fire(&id, TICK_EVENT);

        debug!(id = %id, registry = ?registry, "Engine created");
        Self {
            id,
            bus,
            config,
            registry,
            loaded: Vec::new(),
            seq: 0,
        }
    }

    /// Returns the engine's own id, the `source` of everything it fires.
    #[must_use]
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    /// Returns the bus.
    #[must_use]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &MousetrapConfig {
        &self.config
    }

    /// Returns the registry components are loaded from.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Number of ticks fired so far.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Loads every configured component that is not loaded yet.
    ///
    /// Components come up `Stopped`. Returns how many were loaded.
    ///
    /// # Errors
    ///
    /// The first [`EngineError::UnknownComponent`] or
    /// [`EngineError::ComponentLoad`]. Components loaded before it stay
    /// loaded.
    pub fn load_components(&mut self) -> Result<usize, EngineError> {
        let mut count = 0;
        for identifier in self.config.components.load.clone() {
            if self.is_loaded(&identifier) {
                debug!(component = %identifier, "Component already loaded");
                continue;
            }

            let settings = self.config.components.settings_for(&identifier);
            let handle = self
                .instantiate(&identifier, settings.clone())
                .map_err(|e| {
                    error!(component = %identifier, error = %e, "Failed to load component");
                    e
                })?;

            info!(component = %identifier, id = %handle.id(), "Loaded component");
            self.loaded.push(Loaded {
                identifier,
                settings,
                handle,
            });
            count += 1;
        }
        Ok(count)
    }

    fn instantiate(
        &self,
        identifier: &str,
        settings: Value,
    ) -> Result<Arc<dyn ManagedComponent>, EngineError> {
        let id = self.registry.component_id(identifier)?;
        let ctx = ComponentContext::with_config(id, self.bus.clone(), settings);
        self.registry.instantiate(identifier, ctx)
    }

    fn is_loaded(&self, identifier: &str) -> bool {
        self.loaded.iter().any(|l| l.identifier == identifier)
    }

    /// Reports required subscriptions to events nobody declared they may
    /// fire.
    ///
    /// Each finding is logged at `warn`. This is advisory only.
    pub fn audit(&self) -> BTreeMap<EventName, Vec<RequiredRegistration>> {
        let findings = self.bus.unpublished_required_registrations();
        for (event, registrations) in &findings {
            for registration in registrations {
                warn!(
                    event = %event,
                    callback = registration.callback.label(),
                    origin = %registration.origin,
                    "Required registration has no publisher"
                );
            }
        }
        findings
    }

    /// Loads the configured components, fires `start_components` and
    /// audits the now-live wiring.
    ///
    /// Returns the [`audit`](Self::audit) findings.
    ///
    /// # Errors
    ///
    /// A load failure (nothing is started), or a failing subscriber.
    pub fn start(
        &mut self,
    ) -> Result<BTreeMap<EventName, Vec<RequiredRegistration>>, EngineError> {
        self.load_components()?;
        info!(components = self.loaded.len(), "Starting components");
        self.emit(LifecycleEvent::StartComponents, EventData::new())?;
        Ok(self.audit())
    }

    /// Fires `stop_components`.
    ///
    /// # Errors
    ///
    /// A failing subscriber.
    pub fn stop(&self) -> Result<(), EngineError> {
        info!("Stopping components");
        self.emit(LifecycleEvent::StopComponents, EventData::new())
    }

    /// Fires `pause_components`.
    ///
    /// # Errors
    ///
    /// A failing subscriber.
    pub fn pause(&self) -> Result<(), EngineError> {
        info!("Pausing components");
        self.emit(LifecycleEvent::PauseComponents, EventData::new())
    }

    /// Fires `resume_components`.
    ///
    /// # Errors
    ///
    /// A failing subscriber.
    pub fn resume(&self) -> Result<(), EngineError> {
        info!("Resuming components");
        self.emit(LifecycleEvent::ResumeComponents, EventData::new())
    }

    /// Applies a new configuration to the running system.
    ///
    /// Components that are still configured with unchanged settings keep
    /// their state across the reload; the rest are detached and, if still
    /// configured, loaded afresh.
    ///
    /// # Errors
    ///
    /// A load failure or a failing subscriber. See the module docs for
    /// the state left behind.
    pub fn reload(&mut self, config: MousetrapConfig) -> Result<(), EngineError> {
        info!("Reloading configuration");
        self.pause()?;
        self.config = config;

        let mut kept = Vec::with_capacity(self.loaded.len());
        for loaded in std::mem::take(&mut self.loaded) {
            let wanted = self.config.components.load.contains(&loaded.identifier);
            if wanted && self.config.components.settings_for(&loaded.identifier) == loaded.settings
            {
                kept.push(loaded);
                continue;
            }

            let reason = if wanted {
                "settings changed"
            } else {
                "no longer configured"
            };
            info!(component = %loaded.identifier, reason, "Unloading component");
            if let Err(e) = loaded.handle.detach() {
                warn!(component = %loaded.identifier, error = %e, "Component failed while unloading");
            }
        }
        self.loaded = kept;

        self.load_components()?;
        let order = &self.config.components.load;
        self.loaded.sort_by_key(|l| {
            order
                .iter()
                .position(|identifier| identifier == &l.identifier)
                .unwrap_or(usize::MAX)
        });

        self.resume()?;
        self.emit(LifecycleEvent::StartComponents, EventData::new())?;
        self.audit();
        Ok(())
    }

    /// Fires [`TICK_EVENT`] with the next `seq` and returns it.
    ///
    /// # Errors
    ///
    /// A failing subscriber. The sequence number is consumed regardless.
    pub fn tick(&mut self) -> Result<u64, EngineError> {
        self.seq += 1;
        let mut data = EventData::new();
        data.insert("seq".into(), self.seq.into());
        self.emit(TICK_EVENT, data)?;
        Ok(self.seq)
    }

    /// Fires an arbitrary event with `source` set to the engine.
    ///
    /// # Errors
    ///
    /// A failing subscriber.
    pub fn fire(&self, name: impl Into<EventName>, data: EventData) -> Result<(), EngineError> {
        self.emit(name, data)
    }

    fn emit(&self, name: impl Into<EventName>, data: EventData) -> Result<(), EngineError> {
        let event = Event::new(name)
            .with_data(data)
            .with(SOURCE_KEY, self.id.fqn());
        self.bus.fire_event(event)?;
        Ok(())
    }

    /// Lists loaded components in configured order.
    #[must_use]
    pub fn components(&self) -> Vec<ComponentStatus> {
        self.loaded
            .iter()
            .map(|l| ComponentStatus {
                identifier: l.identifier.clone(),
                id: l.handle.id().clone(),
                state: l.handle.state(),
            })
            .collect()
    }

    /// Stops and detaches every component.
    ///
    /// Every component is detached even if some fail.
    ///
    /// # Errors
    ///
    /// The first failure: a subscriber failing on `stop_components`, or a
    /// component failing while detached.
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        info!("Shutting down all components");
        let mut first_error = self.stop().err();

        for loaded in self.loaded.drain(..) {
            if let Err(source) = loaded.handle.detach() {
                warn!(component = %loaded.identifier, error = %source, "Component failed during shutdown");
                first_error.get_or_insert(EngineError::ComponentFailed {
                    name: loaded.identifier,
                    source,
                });
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("id", &self.id)
            .field("components", &self.components())
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(load: &[&str]) -> MousetrapConfig {
        let mut config = MousetrapConfig::default();
        config.components.load = load.iter().map(|s| s.to_string()).collect();
        config
    }

    #[test]
    fn engine_declares_meta_events_and_tick() {
        let engine = Engine::new(config(&[]));
        for event in LifecycleEvent::ALL {
            assert_eq!(engine.bus().publishers(event.as_str()), vec![engine.id().clone()]);
        }
        assert!(engine.bus().has_publisher(TICK_EVENT));
    }

    #[test]
    fn load_skips_duplicates() {
        let mut engine = Engine::new(config(&["noop", "noop"]));
        assert_eq!(engine.load_components().unwrap(), 1);
        assert_eq!(engine.load_components().unwrap(), 0);
        assert_eq!(engine.components().len(), 1);
    }

    #[test]
    fn lifecycle_operations_drive_components() {
        let mut engine = Engine::new(config(&["noop", "heartbeat"]));
        engine.start().unwrap();
        assert!(engine
            .components()
            .iter()
            .all(|c| c.state == LifecycleState::Running));

        engine.pause().unwrap();
        assert!(engine
            .components()
            .iter()
            .all(|c| c.state == LifecycleState::Paused));

        engine.resume().unwrap();
        engine.stop().unwrap();
        assert!(engine
            .components()
            .iter()
            .all(|c| c.state == LifecycleState::Stopped));
    }

    #[test]
    fn tick_carries_seq_and_source() {
        let mut engine = Engine::new(config(&[]));
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.bus().call_optional(
            mousetrap_event::Callback::new("probe", move |event| {
                sink.lock().push(event.clone());
                Ok(())
            }),
            TICK_EVENT,
        );

        assert_eq!(engine.tick().unwrap(), 1);
        assert_eq!(engine.tick().unwrap(), 2);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1]["seq"], json!(2));
        assert_eq!(seen[1].source(), Some(engine.id().fqn().as_str()));
    }

    #[test]
    fn audit_clean_with_engine_ticking() {
        let mut engine = Engine::new(config(&["heartbeat"]));
        assert!(engine.start().unwrap().is_empty());
        assert!(engine.audit().is_empty());
    }

    #[test]
    fn shutdown_detaches_everything() {
        let mut engine = Engine::new(config(&["heartbeat", "event_logger"]));
        engine.start().unwrap();

        engine.shutdown().unwrap();

        assert!(engine.components().is_empty());
        for event in LifecycleEvent::ALL {
            assert_eq!(engine.bus().callback_count(event.as_str()), 0);
        }
        assert_eq!(engine.bus().callback_count(TICK_EVENT), 0);
        assert!(!engine
            .bus()
            .publishers(crate::components::HEARTBEAT_EVENT)
            .iter()
            .any(|id| id.name == "heartbeat"));
    }
}
