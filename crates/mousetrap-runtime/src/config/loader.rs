//! Configuration loader.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. User config: the explicit file if one was given, otherwise the
//!    global config (`~/.mousetrap/config.toml`)
//! 3. Environment variables (`MOUSETRAP_*`)
//!
//! Each layer overrides the previous.

use super::{default_config_path, ConfigError, ConfigResolver, MousetrapConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```ignore
/// use mousetrap_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_config_file("/etc/mousetrap.toml")
///     .skip_env_vars()  // For testing
///     .load()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.mousetrap/config.toml).
    global_config_path: Option<PathBuf>,

    /// Explicit config file. Replaces the global config when set.
    config_file: Option<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,

    /// Skip global config loading.
    skip_global: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets an explicit config file.
    ///
    /// Unlike the global config, this file must exist.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file exists but cannot be read
    /// or parsed, if the explicit config file is missing, or if an
    /// environment variable holds an invalid value. A missing global
    /// config is silently ignored.
    pub fn load(&self) -> Result<MousetrapConfig, ConfigError> {
        let mut config = MousetrapConfig::default();

        if let Some(ref path) = self.config_file {
            let file_config = self
                .load_file(path)?
                .ok_or_else(|| ConfigError::NotFound { path: path.clone() })?;
            debug!(path = %path.display(), "Loaded config file");
            config.merge(&file_config);
        } else if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = self.load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global_config);
            }
        }

        if !self.skip_env {
            self.apply_env_vars(&mut config)?;
        }

        Ok(config)
    }

    /// Loads a config file, returning None if it doesn't exist.
    fn load_file(&self, path: &Path) -> Result<Option<MousetrapConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

        let config =
            MousetrapConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

        Ok(Some(config))
    }

    /// Applies environment variable overrides.
    fn apply_env_vars(&self, config: &mut MousetrapConfig) -> Result<(), ConfigError> {
        parse_env_bool!(config.debug, "MOUSETRAP_DEBUG");

        if let Ok(val) = std::env::var("MOUSETRAP_LOG_LEVEL") {
            config.logging.level = val;
        }

        if let Ok(val) = std::env::var("MOUSETRAP_COMPONENTS") {
            config.components.load = parse_list(&val);
        }

        if let Ok(val) = std::env::var("MOUSETRAP_TICK_INTERVAL_MS") {
            config.engine.tick_interval_ms = val.trim().parse().map_err(|_| {
                ConfigError::invalid_env_var("MOUSETRAP_TICK_INTERVAL_MS", "expected milliseconds")
            })?;
        }

        Ok(())
    }
}

impl ConfigResolver for ConfigLoader {
    fn resolve(&self) -> Result<MousetrapConfig, ConfigError> {
        self.load()
    }
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off"
/// (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma-separated list, dropping empty entries.
pub(crate) fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
