//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Root configuration.
///
/// All fields have defaults, so a partial (or empty) TOML file is a
/// valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MousetrapConfig {
    /// Debug mode. Forces the `debug` log level.
    pub debug: bool,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Engine configuration.
    pub engine: EngineConfig,

    /// Which components to load and how to configure them.
    pub components: ComponentsConfig,
}

impl MousetrapConfig {
    /// Parses a config from TOML.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the content is malformed or a field has
    /// the wrong type.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Merges `other` into `self`.
    ///
    /// Fields of `other` that differ from the defaults win; component
    /// settings merge recursively.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.logging.merge(&other.logging);
        self.engine.merge(&other.engine);
        self.components.merge(&other.components);
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `mousetrap_runtime=debug,warn`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        if other.level != Self::default().level {
            self.level = other.level.clone();
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Milliseconds between `tick` events.
    pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
        }
    }
}

impl EngineConfig {
    /// Tick interval as a [`Duration`], never shorter than 1ms.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    fn merge(&mut self, other: &Self) {
        if other.tick_interval_ms != Self::default().tick_interval_ms {
            self.tick_interval_ms = other.tick_interval_ms;
        }
    }
}

/// Component selection and per-component settings.
///
/// ```toml
/// [components]
/// load = ["heartbeat", "event_logger"]
///
/// [components.settings.heartbeat]
/// every = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Registry identifiers to load, in order.
    pub load: Vec<String>,

    /// Settings section per identifier.
    pub settings: BTreeMap<String, Value>,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            load: vec!["heartbeat".into(), "event_logger".into()],
            settings: BTreeMap::new(),
        }
    }
}

impl ComponentsConfig {
    /// Returns the settings section for `name`, `Null` if none.
    #[must_use]
    pub fn settings_for(&self, name: &str) -> Value {
        self.settings.get(name).cloned().unwrap_or(Value::Null)
    }

    fn merge(&mut self, other: &Self) {
        if other.load != Self::default().load {
            self.load = other.load.clone();
        }
        for (name, overlay) in &other.settings {
            match self.settings.get_mut(name) {
                Some(base) => merge_value(base, overlay),
                None => {
                    self.settings.insert(name.clone(), overlay.clone());
                }
            }
        }
    }
}

/// Objects merge key by key; anything else is replaced.
fn merge_value(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_toml_is_default() {
        let config = MousetrapConfig::from_toml("").unwrap();
        assert_eq!(config, MousetrapConfig::default());
    }

    #[test]
    fn parse_full_toml() {
        let config = MousetrapConfig::from_toml(
            r#"
debug = true

[logging]
level = "warn"

[engine]
tick_interval_ms = 250

[components]
load = ["noop"]

[components.settings.heartbeat]
every = 3
"#,
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.engine.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.components.load, vec!["noop"]);
        assert_eq!(
            config.components.settings_for("heartbeat"),
            json!({"every": 3})
        );
        assert_eq!(config.components.settings_for("missing"), Value::Null);
    }

    #[test]
    fn wrong_type_rejected() {
        assert!(MousetrapConfig::from_toml("debug = \"maybe\"").is_err());
    }

    #[test]
    fn zero_interval_clamped() {
        let engine = EngineConfig {
            tick_interval_ms: 0,
        };
        assert_eq!(engine.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn merge_keeps_base_when_overlay_default() {
        let mut base = MousetrapConfig::default();
        base.debug = true;
        base.logging.level = "trace".into();

        base.merge(&MousetrapConfig::default());

        assert!(base.debug);
        assert_eq!(base.logging.level, "trace");
    }

    #[test]
    fn merge_overrides_non_default() {
        let mut base = MousetrapConfig::default();
        let mut overlay = MousetrapConfig::default();
        overlay.engine.tick_interval_ms = 20;
        overlay.components.load = vec!["noop".into()];

        base.merge(&overlay);

        assert_eq!(base.engine.tick_interval_ms, 20);
        assert_eq!(base.components.load, vec!["noop"]);
    }

    #[test]
    fn settings_merge_recursively() {
        let mut base = MousetrapConfig::default();
        base.components.settings.insert(
            "event_logger".into(),
            json!({"level": "info", "events": ["a"], "nested": {"x": 1, "y": 2}}),
        );

        let mut overlay = MousetrapConfig::default();
        overlay.components.settings.insert(
            "event_logger".into(),
            json!({"events": ["b", "c"], "nested": {"y": 3}}),
        );
        overlay
            .components
            .settings
            .insert("heartbeat".into(), json!({"every": 2}));

        base.merge(&overlay);

        assert_eq!(
            base.components.settings_for("event_logger"),
            json!({"level": "info", "events": ["b", "c"], "nested": {"x": 1, "y": 3}})
        );
        assert_eq!(base.components.settings_for("heartbeat"), json!({"every": 2}));
    }
}
