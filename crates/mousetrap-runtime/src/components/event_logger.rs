//! EventLoggerComponent - logs selected events.
//!
//! # Settings
//!
//! ```toml
//! [components.settings.event_logger]
//! events = ["heartbeat", "tick"]
//! level = "debug"   # trace | debug | info | warn | error
//! ```
//!
//! Subscriptions are optional: nothing is wrong if no one ever fires a
//! listed event.

use mousetrap_component::{ComponentContext, ComponentError, Lifecycle};
use mousetrap_event::{Callback, Event};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Settings {
    events: Vec<String>,
    level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            events: vec![super::HEARTBEAT_EVENT.to_string()],
            level: LogLevel::default(),
        }
    }
}

/// Logs every configured event, with its data, while running.
#[derive(Debug, Default)]
pub struct EventLoggerComponent {
    logged: Arc<AtomicU64>,
}

impl EventLoggerComponent {
    /// Number of events logged so far.
    #[must_use]
    pub fn logged(&self) -> u64 {
        self.logged.load(Ordering::SeqCst)
    }
}

impl Lifecycle for EventLoggerComponent {
    fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
        let settings: Settings = ctx.settings()?;
        let level = settings.level;

        for name in settings.events {
            let logged = Arc::clone(&self.logged);
            ctx.call_optional(
                Callback::new("event_logger/log", move |event| {
                    log_event(level, event);
                    logged.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
                name,
            );
        }
        Ok(())
    }
}

fn log_event(level: LogLevel, event: &Event) {
    let name = event.name().as_str();
    let source = event.source().unwrap_or("-");
    match level {
        LogLevel::Trace => trace!(event = %name, source = %source, data = %event, "event"),
        LogLevel::Debug => debug!(event = %name, source = %source, data = %event, "event"),
        LogLevel::Info => info!(event = %name, source = %source, data = %event, "event"),
        LogLevel::Warn => warn!(event = %name, source = %source, data = %event, "event"),
        LogLevel::Error => error!(event = %name, source = %source, data = %event, "event"),
    }
}
