//! Event names.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of an event on the bus.
///
/// Cheap to clone; compares and hashes like the underlying string, so
/// registries keyed by `EventName` can be queried with a `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventName(Arc<str>);

impl EventName {
    /// Creates a name from any string-like value.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lifecycle meta-event this name denotes, if any.
    #[must_use]
    pub fn lifecycle(&self) -> Option<LifecycleEvent> {
        LifecycleEvent::from_name(&self.0)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&String> for EventName {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}

impl PartialEq<str> for EventName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for EventName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Serialize for EventName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EventName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// The four meta-events that drive component lifecycles.
///
/// | Event | Wire name | Fired by |
/// |-------|-----------|----------|
/// | `StartComponents` | `start_components` | process start, reload |
/// | `StopComponents` | `stop_components` | shutdown signal, reload |
/// | `PauseComponents` | `pause_components` | reload, pause signal |
/// | `ResumeComponents` | `resume_components` | reload, resume signal |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleEvent {
    StartComponents,
    StopComponents,
    PauseComponents,
    ResumeComponents,
}

impl LifecycleEvent {
    /// Every meta-event, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::StartComponents,
        Self::StopComponents,
        Self::PauseComponents,
        Self::ResumeComponents,
    ];

    /// Returns the wire name of the meta-event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartComponents => "start_components",
            Self::StopComponents => "stop_components",
            Self::PauseComponents => "pause_components",
            Self::ResumeComponents => "resume_components",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }

    /// Returns the event name used on the bus.
    #[must_use]
    pub fn name(self) -> EventName {
        EventName::from(self.as_str())
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LifecycleEvent> for EventName {
    fn from(event: LifecycleEvent) -> Self {
        event.name()
    }
}
