//! Event layer for mousetrap.
//!
//! Components cooperate by exchanging named [`Event`]s over a shared,
//! in-process [`Bus`]. The bus is synchronous: [`Bus::fire`] runs every
//! callback registered for the event, in registration order, on the
//! caller's thread, before it returns.
//!
//! # Message Flow
//!
//! ```text
//! ┌─────────────┐  may_fire("tick")        ┌─────────────────────┐
//! │  Publisher  │ ───────────────────────► │        Bus          │
//! │             │  fire("tick", {x: 5})    │                     │
//! │             │ ───────────────────────► │  tick → [cb1, cb2]  │
//! └─────────────┘                          │  required: tick     │
//!                                          │  publishers: tick   │
//! ┌─────────────┐  call(cb1, on="tick")    │                     │
//! │ Subscriber  │ ───────────────────────► │                     │
//! │             │ ◄─────────────────────── │                     │
//! └─────────────┘         cb1(&event)      └─────────────────────┘
//! ```
//!
//! # Publisher Contract
//!
//! Subscribing ([`Bus::call`]) and declaring a publisher
//! ([`Bus::may_fire`]) are independent, so wiring can happen in any
//! order. After startup, [`Bus::unpublished_required_registrations`]
//! lists every required subscription that nobody declared they may
//! fire: a subscription that can never be triggered.
//!
//! # Lifecycle Meta-Events
//!
//! The four [`LifecycleEvent`]s drive component state machines. They
//! are ordinary events on the bus; only their names are reserved.
//!
//! # Example
//!
//! ```
//! use mousetrap_event::{Bus, Callback, Event};
//! use mousetrap_types::ComponentId;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use std::sync::Arc;
//!
//! let bus = Bus::new();
//! let seen = Arc::new(AtomicI64::new(0));
//!
//! let sink = Arc::clone(&seen);
//! let on_tick = Callback::new("on_tick", move |event: &Event| {
//!     let x = event.get("x")?.as_i64().unwrap_or_default();
//!     sink.store(x, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! bus.call(on_tick, "tick");
//! assert_eq!(bus.unpublished_required_registrations().len(), 1);
//!
//! bus.may_fire(&ComponentId::builtin("clock"), "tick");
//! assert!(bus.unpublished_required_registrations().is_empty());
//!
//! bus.fire_event(Event::new("tick").with("x", 5)).unwrap();
//! assert_eq!(seen.load(Ordering::SeqCst), 5);
//! ```

mod bus;
mod callback;
mod error;
mod event;
mod name;

pub use bus::{Bus, RequiredRegistration};
pub use callback::{Callback, CallbackError, Origin};
pub use error::EventError;
pub use event::{Event, EventData};
pub use name::{EventName, LifecycleEvent};

/// Key under which the firing component's identity is stored.
pub const SOURCE_KEY: &str = "source";
