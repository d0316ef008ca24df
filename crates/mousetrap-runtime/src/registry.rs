//! Explicit component registry.
//!
//! Maps the identifiers used in `components.load` to factories. Every
//! loadable component type is linked in statically and registered up
//! front; nothing is resolved by path at runtime.
//!
//! ```text
//! "heartbeat" ──▶ factory() ──▶ HeartbeatComponent
//!                                     │ LifecycleDriver::attach
//!                                     ▼
//!                          Arc<dyn ManagedComponent>
//! ```

use crate::components::{EventLoggerComponent, HeartbeatComponent, NoopComponent};
use crate::engine::EngineError;
use mousetrap_component::{
    ComponentContext, ComponentError, Lifecycle, LifecycleDriver, ManagedComponent,
};
use mousetrap_types::ComponentId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Namespace for components registered through [`ComponentRegistry::register`].
pub const PLUGIN_NAMESPACE: &str = "plugin";

type Factory =
    Box<dyn Fn(ComponentContext) -> Result<Arc<dyn ManagedComponent>, ComponentError> + Send + Sync>;

struct Entry {
    builtin: bool,
    factory: Factory,
}

/// Identifier → factory table.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<String, Entry>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the builtin components.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("noop", true, NoopComponent::default);
        registry.insert("event_logger", true, EventLoggerComponent::default);
        registry.insert("heartbeat", true, HeartbeatComponent::default);
        registry
    }

    /// Registers `factory` under `identifier`, replacing any previous
    /// entry.
    pub fn register<L, F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        L: Lifecycle,
        F: Fn() -> L + Send + Sync + 'static,
    {
        self.insert(identifier, false, factory);
    }

    fn insert<L, F>(&mut self, identifier: impl Into<String>, builtin: bool, factory: F)
    where
        L: Lifecycle,
        F: Fn() -> L + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        debug!(component = %identifier, builtin, "registered component");
        let factory: Factory = Box::new(move |ctx| {
            let driver = LifecycleDriver::attach(factory(), ctx)?;
            Ok(driver as Arc<dyn ManagedComponent>)
        });
        self.entries.insert(identifier, Entry { builtin, factory });
    }

    /// Returns `true` if `identifier` is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// The id a component loaded under `identifier` gets.
    ///
    /// Builtins get their deterministic builtin id, everything else a
    /// fresh id in [`PLUGIN_NAMESPACE`].
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownComponent`] if `identifier` is not registered.
    pub fn component_id(&self, identifier: &str) -> Result<ComponentId, EngineError> {
        let entry = self.entry(identifier)?;
        Ok(if entry.builtin {
            ComponentId::builtin(identifier)
        } else {
            ComponentId::new(PLUGIN_NAMESPACE, identifier)
        })
    }

    /// Constructs the component registered as `identifier` and attaches
    /// it to `ctx`, which runs its `init` hook.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownComponent`] if `identifier` is not registered,
    /// [`EngineError::ComponentLoad`] if `init` fails.
    pub fn instantiate(
        &self,
        identifier: &str,
        ctx: ComponentContext,
    ) -> Result<Arc<dyn ManagedComponent>, EngineError> {
        let entry = self.entry(identifier)?;
        (entry.factory)(ctx).map_err(|source| EngineError::ComponentLoad {
            name: identifier.to_string(),
            source,
        })
    }

    fn entry(&self, identifier: &str) -> Result<&Entry, EngineError> {
        self.entries
            .get(identifier)
            .ok_or_else(|| EngineError::UnknownComponent {
                name: identifier.to_string(),
                known: self.identifiers().join(", "),
            })
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mousetrap_component::LifecycleState;
    use mousetrap_event::Bus;

    struct Broken;

    impl Lifecycle for Broken {
        fn init(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
            Err(ComponentError::failed("no device"))
        }
    }

    fn context_for(registry: &ComponentRegistry, identifier: &str, bus: &Bus) -> ComponentContext {
        let id = registry.component_id(identifier).unwrap();
        ComponentContext::new(id, bus.clone())
    }

    #[test]
    fn builtins_registered() {
        let registry = ComponentRegistry::with_builtins();
        assert_eq!(
            registry.identifiers(),
            vec!["event_logger", "heartbeat", "noop"]
        );
        assert!(registry.contains("noop"));
        assert!(!registry.contains("camera"));
    }

    #[test]
    fn builtin_ids_are_deterministic() {
        let registry = ComponentRegistry::with_builtins();
        let a = registry.component_id("noop").unwrap();
        let b = registry.component_id("noop").unwrap();
        assert_eq!(a, b);
        assert!(a.is_builtin());
    }

    #[test]
    fn plugin_ids_use_plugin_namespace() {
        let mut registry = ComponentRegistry::new();
        registry.register("custom", NoopComponent::default);
        let id = registry.component_id("custom").unwrap();
        assert_eq!(id.namespace, PLUGIN_NAMESPACE);
        assert_eq!(id.name, "custom");
    }

    #[test]
    fn instantiate_attaches_stopped_component() {
        let registry = ComponentRegistry::with_builtins();
        let bus = Bus::new();
        let ctx = context_for(&registry, "noop", &bus);

        let component = registry.instantiate("noop", ctx).unwrap();

        assert_eq!(component.state(), LifecycleState::Stopped);
        assert_eq!(bus.callback_count("start_components"), 1);
    }

    #[test]
    fn unknown_identifier_lists_known() {
        let registry = ComponentRegistry::with_builtins();
        let err = registry.component_id("camera").unwrap_err();
        match err {
            EngineError::UnknownComponent { name, known } => {
                assert_eq!(name, "camera");
                assert!(known.contains("heartbeat"));
            }
            other => panic!("expected UnknownComponent, got {other:?}"),
        }
    }

    #[test]
    fn failing_init_is_load_error() {
        let mut registry = ComponentRegistry::new();
        registry.register("broken", || Broken);
        let bus = Bus::new();
        let ctx = context_for(&registry, "broken", &bus);

        let err = registry.instantiate("broken", ctx).err().unwrap();

        assert!(matches!(err, EngineError::ComponentLoad { ref name, .. } if name == "broken"));
        // Rolled back: nothing left listening for start
        assert_eq!(bus.callback_count("start_components"), 0);
    }
}
