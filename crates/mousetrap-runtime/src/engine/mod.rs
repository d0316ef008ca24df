//! Engine - the supervisor.
//!
//! Owns the single [`Bus`](mousetrap_event::Bus), loads the configured
//! components through the [`ComponentRegistry`](crate::ComponentRegistry)
//! and drives them with the meta-events.
//!
//! ```text
//!                 ┌─────────────────────────────┐
//!  config ──────▶ │           Engine            │
//!                 │  start / pause / resume     │
//!  host (CLI) ──▶ │  stop / reload / tick       │
//!                 └──────────────┬──────────────┘
//!                                │ fire
//!                                ▼
//!                 ┌─────────────────────────────┐
//!                 │             Bus             │
//!                 └──┬───────────┬───────────┬──┘
//!                    ▼           ▼           ▼
//!               component   component   component
//! ```

#[allow(clippy::module_inception)]
mod engine;
mod error;

pub use engine::{ComponentStatus, Engine, ENGINE_NAME, TICK_EVENT};
pub use error::EngineError;
