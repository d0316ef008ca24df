//! Lifecycle states and the transition table.

use mousetrap_event::LifecycleEvent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a component is in its lifecycle.
///
/// ```text
///              start_components
///   ┌─────────┐ ─────────────────► ┌─────────┐
///   │ Stopped │                    │ Running │
///   └─────────┘ ◄───────────────── └─────────┘
///        ▲       stop_components     │     ▲
///        │                   pause_  │     │ resume_
///        │ stop_components   components    │ components
///        │                           ▼     │
///        │                         ┌─────────┐
///        └──────────────────────── │ Paused  │
///                                  └─────────┘
/// ```
///
/// A component is subscribed to exactly the meta-events returned by
/// [`triggers`](Self::triggers) for its current state, and its domain
/// registrations are live only while `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl LifecycleState {
    /// Meta-events that may move a component out of this state.
    #[must_use]
    pub const fn triggers(self) -> &'static [LifecycleEvent] {
        match self {
            Self::Stopped => &[LifecycleEvent::StartComponents],
            Self::Running => &[
                LifecycleEvent::StopComponents,
                LifecycleEvent::PauseComponents,
            ],
            Self::Paused => &[
                LifecycleEvent::StopComponents,
                LifecycleEvent::ResumeComponents,
            ],
        }
    }

    /// Returns the state `trigger` leads to, or `None` if it is not a
    /// legal transition from this state.
    #[must_use]
    pub const fn next(self, trigger: LifecycleEvent) -> Option<Self> {
        match (self, trigger) {
            (Self::Stopped, LifecycleEvent::StartComponents) => Some(Self::Running),
            (Self::Running, LifecycleEvent::StopComponents)
            | (Self::Paused, LifecycleEvent::StopComponents) => Some(Self::Stopped),
            (Self::Running, LifecycleEvent::PauseComponents) => Some(Self::Paused),
            (Self::Paused, LifecycleEvent::ResumeComponents) => Some(Self::Running),
            _ => None,
        }
    }

    /// Returns `true` for [`LifecycleState::Running`].
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Lowercase name, as used in logs and status output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
