//! Shared types for mousetrap.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Plugin SDK Layer                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  mousetrap-types     : ComponentId, ErrorCode  ◄── HERE      │
//! │  mousetrap-event     : Event, Bus                            │
//! │  mousetrap-component : Lifecycle, LifecycleDriver            │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  mousetrap-runtime   : Engine, registry, config              │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  mousetrap-cli       : `mousetrap` binary                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Plugins only need the SDK layer. Everything a component can name
//! about another party on the bus (its publisher identity, the origin
//! tag of an event) is a [`ComponentId`].
//!
//! # Example
//!
//! ```
//! use mousetrap_types::ComponentId;
//!
//! let engine = ComponentId::builtin("engine");
//! assert_eq!(engine, ComponentId::builtin("engine"));
//!
//! let plugin = ComponentId::new("plugin", "nose");
//! assert_eq!(plugin.fqn(), "plugin::nose");
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ComponentId, BUILTIN_NAMESPACE};
