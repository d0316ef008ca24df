//! Events carried by the bus.

use crate::{EventError, EventName, SOURCE_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::Index;

/// Key/value payload of an [`Event`].
///
/// Insertion order is kept for display; equality ignores it.
pub type EventData = serde_json::Map<String, Value>;

/// A named bag of data, created per dispatch.
///
/// The name is fixed at construction. Data accumulates from an optional
/// base mapping, then from overrides; an override shadows a base entry
/// with the same key.
///
/// # Example
///
/// ```
/// use mousetrap_event::{Event, EventData};
/// use serde_json::json;
///
/// let mut base = EventData::new();
/// base.insert("x".into(), json!(1));
///
/// let event = Event::new("e").with_data(base).with("y", 2);
/// assert_eq!(event["x"], json!(1));
/// assert_eq!(event["y"], json!(2));
///
/// let shadowed = Event::new("e").with("x", 1).with("x", 2);
/// assert_eq!(shadowed["x"], json!(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    name: EventName,
    #[serde(default)]
    data: EventData,
}

impl Event {
    /// Creates an event with no data.
    #[must_use]
    pub fn new(name: impl Into<EventName>) -> Self {
        Self {
            name: name.into(),
            data: EventData::new(),
        }
    }

    /// Creates an event from an optional base mapping plus overrides.
    #[must_use]
    pub fn compose(
        name: impl Into<EventName>,
        base: Option<EventData>,
        overrides: EventData,
    ) -> Self {
        let mut data = base.unwrap_or_default();
        data.extend(overrides);
        Self {
            name: name.into(),
            data,
        }
    }

    /// Adds (or overrides) one entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Merges `data` in, overriding existing keys.
    #[must_use]
    pub fn with_data(mut self, data: EventData) -> Self {
        self.data.extend(data);
        self
    }

    /// Returns the event name.
    #[must_use]
    pub fn name(&self) -> &EventName {
        &self.name
    }

    /// Returns the payload.
    #[must_use]
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Consumes the event and returns the payload.
    #[must_use]
    pub fn into_data(self) -> EventData {
        self.data
    }

    /// Looks up a payload entry.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MissingKey`] when `key` is absent.
    pub fn get(&self, key: &str) -> Result<&Value, EventError> {
        self.data.get(key).ok_or_else(|| EventError::MissingKey {
            event: self.name.to_string(),
            key: key.to_string(),
        })
    }

    /// Returns `true` if the payload has an entry for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the `source` tag set by the firing component, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.data.get(SOURCE_KEY).and_then(Value::as_str)
    }
}

/// Panics when the key is absent; use [`Event::get`] for a fallible lookup.
impl Index<&str> for Event {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self.data.get(key) {
            Some(value) => value,
            None => panic!("event '{}' has no key '{key}'", self.name),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.data.is_empty() {
            write!(f, " {}", Value::Object(self.data.clone()))?;
        }
        Ok(())
    }
}
