//! Component lifecycle for mousetrap.
//!
//! A component is a unit of pluggable functionality with a three-state
//! lifecycle (stopped, running, paused) and its own declared event
//! subscriptions. This crate splits it in two:
//!
//! - [`Lifecycle`]: the capability a plugin implements (hooks only)
//! - [`LifecycleDriver`]: the reusable state machine that reacts to the
//!   four meta-events and toggles the plugin's subscriptions
//!
//! # Architecture
//!
//! ```text
//!   Engine                  Bus                    LifecycleDriver<L>
//!     │                      │                            │
//!     │ fire(start_comp.)    │                            │
//!     │─────────────────────►│  trigger callback          │
//!     │                      │───────────────────────────►│ Stopped → Running
//!     │                      │◄── call(registrations) ────│ (bookkeeping)
//!     │                      │                            │── L::start(&ctx)
//!     │ fire("tick")         │                            │
//!     │─────────────────────►│── registered callbacks ───►│ (only if Running)
//! ```
//!
//! Because every component is subscribed to exactly the meta-events that
//! can move it out of its current state, the engine broadcasts
//! meta-events without knowing which component is in which state.
//!
//! # Plugin API
//!
//! Hooks receive a [`ComponentContext`], the component's handle on the
//! world:
//!
//! | Method | Purpose |
//! |--------|---------|
//! | `call` / `call_optional` / `dont_call` | declare subscriptions |
//! | `fire` / `fire_with` | publish, tagged with `source` |
//! | `may_fire` / `wont_fire` | publisher declarations |
//! | `config` / `settings` | per-component settings |
//! | `span` | tracing span for the component's logs |
//!
//! # Testing
//!
//! [`testing::LifecycleHarness`] runs a single component against a
//! private bus, without an engine.

mod context;
mod driver;
mod error;
mod lifecycle;
mod registration;
mod state;
pub mod testing;

pub use context::ComponentContext;
pub use driver::{LifecycleDriver, ManagedComponent};
pub use error::ComponentError;
pub use lifecycle::Lifecycle;
pub use registration::EventRegistration;
pub use state::LifecycleState;
