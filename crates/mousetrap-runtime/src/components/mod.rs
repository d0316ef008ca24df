//! Builtin components.
//!
//! Registered by [`ComponentRegistry::with_builtins`](crate::ComponentRegistry::with_builtins):
//!
//! | Identifier | Type | Purpose |
//! |------------|------|---------|
//! | `noop` | [`NoopComponent`] | Does nothing; checks wiring |
//! | `event_logger` | [`EventLoggerComponent`] | Logs selected events |
//! | `heartbeat` | [`HeartbeatComponent`] | Fires `heartbeat` every n ticks |
//!
//! None of them perform I/O beyond logging.

mod event_logger;
mod heartbeat;
mod noop;

pub use event_logger::EventLoggerComponent;
pub use heartbeat::{HeartbeatComponent, HEARTBEAT_EVENT};
pub use noop::NoopComponent;
