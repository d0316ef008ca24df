//! HeartbeatComponent - turns engine ticks into a slower pulse.
//!
//! Fires [`HEARTBEAT_EVENT`] with `{ beats, seq }` on every `every`-th
//! `tick` seen while running. `beats` counts heartbeats since the last
//! start; `seq` echoes the tick that triggered it.
//!
//! | Hook | Counters |
//! |------|----------|
//! | `start` | reset |
//! | `pause` / `resume` | kept |
//!
//! # Settings
//!
//! ```toml
//! [components.settings.heartbeat]
//! every = 10
//! ```

use crate::engine::TICK_EVENT;
use mousetrap_component::{ComponentContext, ComponentError, Lifecycle};
use mousetrap_event::{Callback, EventData};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Event fired by [`HeartbeatComponent`].
pub const HEARTBEAT_EVENT: &str = "heartbeat";

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Settings {
    every: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self { every: 10 }
    }
}

/// Fires `heartbeat` every n ticks.
///
/// Requires a `tick` publisher; loaded without the engine it shows up
/// in the integrity audit.
#[derive(Debug, Default)]
pub struct HeartbeatComponent {
    ticks: Arc<AtomicU64>,
    beats: Arc<AtomicU64>,
}

impl HeartbeatComponent {
    /// Heartbeats fired since the last start.
    #[must_use]
    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::SeqCst)
    }

    /// Ticks seen since the last start.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl Lifecycle for HeartbeatComponent {
    fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
        let Settings { every } = ctx.settings()?;
        if every == 0 {
            return Err(ComponentError::InvalidConfig {
                component: ctx.id().fqn(),
                message: "`every` must be at least 1".into(),
            });
        }

        ctx.may_fire(HEARTBEAT_EVENT);

        let ticks = Arc::clone(&self.ticks);
        let beats = Arc::clone(&self.beats);
        let publisher = ctx.clone();
        ctx.call(
            Callback::new("heartbeat/on_tick", move |event| {
                let seen = ticks.fetch_add(1, Ordering::SeqCst) + 1;
                if seen % every != 0 {
                    return Ok(());
                }

                let beat = beats.fetch_add(1, Ordering::SeqCst) + 1;
                let mut data = EventData::new();
                data.insert("beats".into(), beat.into());
                if let Some(seq) = event.data().get("seq") {
                    data.insert("seq".into(), seq.clone());
                }
                publisher.fire_with(HEARTBEAT_EVENT, data)?;
                Ok(())
            }),
            TICK_EVENT,
        );
        Ok(())
    }

    fn start(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
        self.ticks.store(0, Ordering::SeqCst);
        self.beats.store(0, Ordering::SeqCst);
        debug!(component = %ctx.id().fqn(), "heartbeat counters reset");
        Ok(())
    }
}
