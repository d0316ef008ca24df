//! Component identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::{uuid, Uuid};

/// Namespace UUID for deterministic UUID v5 generation of builtin ids.
const MOUSETRAP_NAMESPACE: Uuid = uuid!("6f0d3f1e-5a57-4c1b-9d0e-2b8e3c7a91d4");

/// Namespace used by [`ComponentId::builtin`].
pub const BUILTIN_NAMESPACE: &str = "builtin";

/// Identifier for anything that participates on the bus.
///
/// Components, the engine and test probes all carry one. It is the
/// publisher identity recorded by `may_fire` and the `source` tag
/// attached to events a component fires.
///
/// # UUID Strategy
///
/// - **Builtin ids**: UUID v5, derived from the name (stable across runs)
/// - **Other ids**: UUID v4 (one per instance)
///
/// # Equality Semantics
///
/// `PartialEq` compares all fields including the UUID, so two
/// instances of the same plugin type are distinct publishers. Use
/// [`fqn_eq`](Self::fqn_eq) to compare by name only.
///
/// # Example
///
/// ```
/// use mousetrap_types::ComponentId;
///
/// let a = ComponentId::new("plugin", "camera");
/// let b = ComponentId::new("plugin", "camera");
/// assert_ne!(a, b);
/// assert!(a.fqn_eq(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    /// Globally unique identifier.
    pub uuid: Uuid,
    /// Namespace (e.g., "builtin", "plugin").
    pub namespace: String,
    /// Name within the namespace.
    pub name: String,
}

impl ComponentId {
    /// Creates an id with a random UUID v4.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Creates a builtin id with a deterministic UUID v5.
    ///
    /// ```
    /// use mousetrap_types::ComponentId;
    ///
    /// let a = ComponentId::builtin("heartbeat");
    /// let b = ComponentId::builtin("heartbeat");
    /// assert_eq!(a.uuid, b.uuid);
    /// assert!(a.is_builtin());
    /// ```
    #[must_use]
    pub fn builtin(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v5(&MOUSETRAP_NAMESPACE, name.as_bytes()),
            namespace: BUILTIN_NAMESPACE.to_string(),
            name,
        }
    }

    /// Returns the fully qualified name in `namespace::name` format.
    #[must_use]
    pub fn fqn(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }

    /// Compares two ids by namespace and name, ignoring the UUID.
    #[must_use]
    pub fn fqn_eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }

    /// Returns `true` if this id lives in the builtin namespace.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.namespace == BUILTIN_NAMESPACE
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}@{}", self.namespace, self.name, self.uuid)
    }
}
