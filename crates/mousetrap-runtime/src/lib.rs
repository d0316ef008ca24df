//! mousetrap Runtime - supervisor, registry and configuration.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Component SDK Layer                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  mousetrap-types     : ComponentId, ErrorCode               │
//! │  mousetrap-event     : Bus, Event, Callback                 │
//! │  mousetrap-component : Lifecycle, ComponentContext, driver  │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  config/     : MousetrapConfig, ConfigLoader, ConfigError   │
//! │  engine/     : Engine, EngineError                          │
//! │  registry    : ComponentRegistry                            │
//! │  components/ : noop, event_logger, heartbeat                │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                            │
//! │  (mousetrap-cli)                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use mousetrap_runtime::{ComponentRegistry, Engine, MousetrapConfig};
//! use mousetrap_component::{ComponentContext, ComponentError, Lifecycle};
//!
//! struct Camera;
//!
//! impl Lifecycle for Camera {
//!     fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
//!         ctx.may_fire("captured_image");
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = ComponentRegistry::with_builtins();
//! registry.register("camera", || Camera);
//!
//! let mut config = MousetrapConfig::default();
//! config.components.load = vec!["camera".into(), "heartbeat".into()];
//!
//! let mut engine = Engine::with_registry(config, registry);
//! engine.start().unwrap();
//! assert!(engine.bus().has_publisher("captured_image"));
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod logging;
mod registry;

pub use config::{ConfigError, ConfigLoader, ConfigResolver, MousetrapConfig};
pub use engine::{ComponentStatus, Engine, EngineError, ENGINE_NAME, TICK_EVENT};
pub use registry::{ComponentRegistry, PLUGIN_NAMESPACE};
