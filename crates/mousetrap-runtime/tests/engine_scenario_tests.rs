//! Engine integration tests.
//!
//! Drive complete configurations through start, tick, reload and
//! shutdown on a real bus.

use mousetrap_component::{ComponentContext, ComponentError, Lifecycle, LifecycleState};
use mousetrap_event::{Callback, Event, EventData, LifecycleEvent};
use mousetrap_runtime::components::HEARTBEAT_EVENT;
use mousetrap_runtime::{ComponentRegistry, Engine, EngineError, MousetrapConfig, TICK_EVENT};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

type Seen = Arc<Mutex<Vec<Event>>>;

/// Declares that it may fire `event`; fires nothing by itself.
struct Publisher {
    event: &'static str,
}

impl Lifecycle for Publisher {
    fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
        ctx.may_fire(self.event);
        Ok(())
    }
}

/// Fires `event` with `{"x": 5}` on every tick.
struct Relay {
    event: &'static str,
}

impl Lifecycle for Relay {
    fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
        ctx.may_fire(self.event);
        let publisher = ctx.clone();
        let event = self.event;
        ctx.call_optional(
            Callback::new("relay/on_tick", move |_| {
                let mut data = EventData::new();
                data.insert("x".into(), json!(5));
                publisher.fire_with(event, data)?;
                Ok(())
            }),
            TICK_EVENT,
        );
        Ok(())
    }
}

/// Requires `event` and records every delivery.
struct Listener {
    event: &'static str,
    seen: Seen,
}

impl Lifecycle for Listener {
    fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
        let seen = Arc::clone(&self.seen);
        ctx.call(
            Callback::new("on_event", move |event| {
                seen.lock().push(event.clone());
                Ok(())
            }),
            self.event,
        );
        Ok(())
    }
}

struct Broken;

impl Lifecycle for Broken {
    fn init(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
        Err(ComponentError::failed("sensor missing"))
    }
}

fn config(load: &[&str]) -> MousetrapConfig {
    let mut config = MousetrapConfig::default();
    config.components.load = load.iter().map(|s| s.to_string()).collect();
    config
}

fn probe(engine: &Engine, event: &str) -> Seen {
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    engine.bus().call_optional(
        Callback::new("probe", move |event| {
            sink.lock().push(event.clone());
            Ok(())
        }),
        event,
    );
    seen
}

fn states(engine: &Engine) -> Vec<(String, LifecycleState)> {
    engine
        .components()
        .into_iter()
        .map(|c| (c.identifier, c.state))
        .collect()
}

// =============================================================================
// Publish / subscribe through the engine
// =============================================================================

mod wiring {
    use super::*;

    #[test]
    fn component_event_reaches_required_subscriber() {
        let seen: Seen = Arc::default();
        let mut registry = ComponentRegistry::new();
        registry.register("a", || Relay {
            event: "captured_image",
        });
        let sink = Arc::clone(&seen);
        registry.register("b", move || Listener {
            event: "captured_image",
            seen: Arc::clone(&sink),
        });

        let mut engine = Engine::with_registry(config(&["a", "b"]), registry);
        let findings = engine.start().unwrap();
        assert!(findings.is_empty());
        assert!(engine.audit().is_empty());

        engine.tick().unwrap();

        let a = engine
            .components()
            .into_iter()
            .find(|c| c.identifier == "a")
            .unwrap();
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["x"], json!(5));
        assert_eq!(seen[0].source(), Some(a.id.fqn().as_str()));
    }

    #[test]
    fn engine_tick_reaches_required_subscriber() {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        let mut registry = ComponentRegistry::new();
        registry.register("b", move || Listener {
            event: TICK_EVENT,
            seen: Arc::clone(&sink),
        });

        let mut engine = Engine::with_registry(config(&["b"]), registry);
        assert!(engine.start().unwrap().is_empty());

        let mut data = EventData::new();
        data.insert("x".into(), json!(5));
        engine.fire(TICK_EVENT, data).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["x"], json!(5));
        assert_eq!(seen[0].source(), Some(engine.id().fqn().as_str()));
    }

    #[test]
    fn audit_reports_missing_publisher() {
        let mut registry = ComponentRegistry::new();
        registry.register("b", || Listener {
            event: "captured_image",
            seen: Arc::default(),
        });
        registry.register("camera", || Publisher {
            event: "captured_image",
        });

        let mut engine = Engine::with_registry(config(&["b"]), registry);
        let findings = engine.start().unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings.contains_key("captured_image"));

        let findings = engine.audit();
        assert_eq!(findings.len(), 1);
        let registrations = &findings["captured_image"];
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].callback.label(), "on_event");

        engine.reload(config(&["b", "camera"])).unwrap();
        assert!(engine.audit().is_empty());
    }

    #[test]
    fn nothing_delivered_before_start() {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        let mut registry = ComponentRegistry::new();
        registry.register("b", move || Listener {
            event: TICK_EVENT,
            seen: Arc::clone(&sink),
        });

        let mut engine = Engine::with_registry(config(&["b"]), registry);
        engine.load_components().unwrap();
        engine.tick().unwrap();
        assert!(seen.lock().is_empty());

        engine.start().unwrap();
        engine.tick().unwrap();
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0]["seq"], json!(2));
    }
}

// =============================================================================
// Fail-fast loading
// =============================================================================

mod loading {
    use super::*;

    #[test]
    fn unknown_component_aborts_start() {
        let mut engine = Engine::new(config(&["noop", "camera", "heartbeat"]));

        let err = engine.start().unwrap_err();

        assert!(matches!(err, EngineError::UnknownComponent { ref name, .. } if name == "camera"));
        assert_eq!(
            states(&engine),
            vec![("noop".to_string(), LifecycleState::Stopped)]
        );
    }

    #[test]
    fn failing_init_aborts_start() {
        let mut registry = ComponentRegistry::with_builtins();
        registry.register("broken", || Broken);

        let mut engine = Engine::with_registry(config(&["broken", "noop"]), registry);
        let err = engine.start().unwrap_err();

        match err {
            EngineError::ComponentLoad { name, source } => {
                assert_eq!(name, "broken");
                assert!(matches!(source, ComponentError::InitFailed { .. }));
            }
            other => panic!("expected ComponentLoad, got {other:?}"),
        }
        assert!(engine.components().is_empty());
        assert_eq!(
            engine
                .bus()
                .callback_count(LifecycleEvent::StartComponents.as_str()),
            0
        );
    }

    #[test]
    fn invalid_settings_fail_load() {
        let mut config = config(&["heartbeat"]);
        config
            .components
            .settings
            .insert("heartbeat".into(), json!({"every": "often"}));

        let mut engine = Engine::new(config);
        assert!(matches!(
            engine.start(),
            Err(EngineError::ComponentLoad { .. })
        ));
    }
}

// =============================================================================
// Builtins under the engine
// =============================================================================

mod builtins {
    use super::*;

    #[test]
    fn heartbeat_follows_ticks() {
        let mut config = config(&["heartbeat", "event_logger"]);
        config
            .components
            .settings
            .insert("heartbeat".into(), json!({"every": 3}));
        let mut engine = Engine::new(config);
        let beats = probe(&engine, HEARTBEAT_EVENT);

        engine.start().unwrap();
        for _ in 0..10 {
            engine.tick().unwrap();
        }

        let beats = beats.lock();
        let seqs: Vec<_> = beats.iter().map(|e| e["seq"].clone()).collect();
        assert_eq!(seqs, vec![json!(3), json!(6), json!(9)]);
        assert_eq!(beats[2]["beats"], json!(3));
        assert_eq!(beats[2].source(), Some("builtin::heartbeat"));
    }

    #[test]
    fn paused_engine_stops_heartbeats() {
        let mut config = config(&["heartbeat"]);
        config
            .components
            .settings
            .insert("heartbeat".into(), json!({"every": 1}));
        let mut engine = Engine::new(config);
        let beats = probe(&engine, HEARTBEAT_EVENT);

        engine.start().unwrap();
        engine.tick().unwrap();
        engine.pause().unwrap();
        engine.tick().unwrap();
        engine.tick().unwrap();
        engine.resume().unwrap();
        engine.tick().unwrap();

        let seqs: Vec<_> = beats.lock().iter().map(|e| e["seq"].clone()).collect();
        assert_eq!(seqs, vec![json!(1), json!(4)]);
    }
}

// =============================================================================
// Reload
// =============================================================================

mod reload {
    use super::*;

    fn heartbeat_config(load: &[&str], every: u64) -> MousetrapConfig {
        let mut config = config(load);
        config
            .components
            .settings
            .insert("heartbeat".into(), json!({ "every": every }));
        config
    }

    #[test]
    fn swaps_components_in_configured_order() {
        let mut engine = Engine::new(heartbeat_config(&["heartbeat", "event_logger"], 2));
        engine.start().unwrap();

        engine
            .reload(heartbeat_config(&["noop", "heartbeat"], 2))
            .unwrap();

        assert_eq!(
            states(&engine),
            vec![
                ("noop".to_string(), LifecycleState::Running),
                ("heartbeat".to_string(), LifecycleState::Running),
            ]
        );
        assert_eq!(engine.bus().callback_count(HEARTBEAT_EVENT), 0);
    }

    #[test]
    fn unchanged_component_keeps_its_counters() {
        let mut engine = Engine::new(heartbeat_config(&["heartbeat"], 2));
        let beats = probe(&engine, HEARTBEAT_EVENT);
        engine.start().unwrap();
        engine.tick().unwrap();
        engine.tick().unwrap();
        engine.tick().unwrap();

        engine
            .reload(heartbeat_config(&["heartbeat", "noop"], 2))
            .unwrap();
        engine.tick().unwrap();

        let counts: Vec<_> = beats.lock().iter().map(|e| e["beats"].clone()).collect();
        assert_eq!(counts, vec![json!(1), json!(2)]);
    }

    #[test]
    fn changed_settings_reload_component() {
        let mut engine = Engine::new(heartbeat_config(&["heartbeat"], 2));
        let beats = probe(&engine, HEARTBEAT_EVENT);
        engine.start().unwrap();
        engine.tick().unwrap();
        engine.tick().unwrap();

        engine.reload(heartbeat_config(&["heartbeat"], 1)).unwrap();
        engine.tick().unwrap();

        let counts: Vec<_> = beats.lock().iter().map(|e| e["beats"].clone()).collect();
        assert_eq!(counts, vec![json!(1), json!(1)]);
        assert_eq!(engine.config().components.settings_for("heartbeat"), json!({"every": 1}));
    }

    #[test]
    fn failed_reload_leaves_survivors_paused() {
        let mut engine = Engine::new(config(&["noop"]));
        engine.start().unwrap();

        let err = engine.reload(config(&["noop", "camera"])).unwrap_err();
        assert!(matches!(err, EngineError::UnknownComponent { .. }));
        assert_eq!(
            states(&engine),
            vec![("noop".to_string(), LifecycleState::Paused)]
        );

        engine.resume().unwrap();
        assert_eq!(
            states(&engine),
            vec![("noop".to_string(), LifecycleState::Running)]
        );
    }
}

// =============================================================================
// Shutdown
// =============================================================================

mod shutdown {
    use super::*;

    #[test]
    fn stop_then_start_again() {
        let mut engine = Engine::new(config(&["noop", "heartbeat"]));
        engine.start().unwrap();
        engine.stop().unwrap();
        assert!(states(&engine)
            .iter()
            .all(|(_, s)| *s == LifecycleState::Stopped));

        engine.start().unwrap();
        assert!(states(&engine)
            .iter()
            .all(|(_, s)| *s == LifecycleState::Running));
    }

    #[test]
    fn shutdown_leaves_only_engine_on_bus() {
        let mut engine = Engine::new(config(&["heartbeat", "event_logger"]));
        engine.start().unwrap();
        engine.shutdown().unwrap();

        assert!(engine.components().is_empty());
        assert_eq!(engine.bus().callback_count(TICK_EVENT), 0);
        assert!(engine.bus().publishers(HEARTBEAT_EVENT).is_empty());
    }
}
