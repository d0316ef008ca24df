//! Configuration resolver trait.
//!
//! # Architecture
//!
//! ```text
//! startup ──┐
//!           ├──▶ ConfigResolver.resolve() ──▶ MousetrapConfig ──▶ Engine
//! SIGHUP ───┘
//! ```
//!
//! The engine never reads files itself. Whoever hosts it decides where
//! configuration comes from and hands the result to
//! [`Engine::reload`](crate::Engine::reload).

use super::{ConfigError, MousetrapConfig};

/// Produces a complete configuration on demand.
///
/// Called once at startup and again on every reload, so implementors
/// must re-read their sources each time.
pub trait ConfigResolver {
    /// Resolves the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be read or parsed.
    fn resolve(&self) -> Result<MousetrapConfig, ConfigError>;
}

/// Resolver returning a fixed configuration.
///
/// Useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver(pub MousetrapConfig);

impl ConfigResolver for StaticResolver {
    fn resolve(&self) -> Result<MousetrapConfig, ConfigError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_resolver_returns_clone() {
        let mut config = MousetrapConfig::default();
        config.debug = true;
        let resolver = StaticResolver(config.clone());

        assert_eq!(resolver.resolve().unwrap(), config);
        assert_eq!(resolver.resolve().unwrap(), config);
    }
}
