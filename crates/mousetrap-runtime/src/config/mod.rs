//! Configuration with layered loading.
//!
//! # Layers
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌──────────────────────────────────────────────┐
//! │  1. Environment Variables (MOUSETRAP_*)      │  Runtime override
//! ├──────────────────────────────────────────────┤
//! │  2. User Config                              │  --config <PATH>, or
//! │                                              │  ~/.mousetrap/config.toml
//! ├──────────────────────────────────────────────┤
//! │  3. Default Values (compile-time)            │  Fallback
//! └──────────────────────────────────────────────┘
//! ```
//!
//! An explicit config file replaces the global one rather than layering
//! on top of it.
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `MOUSETRAP_DEBUG` | `debug` | bool |
//! | `MOUSETRAP_LOG_LEVEL` | `logging.level` | String |
//! | `MOUSETRAP_COMPONENTS` | `components.load` | comma-separated list |
//! | `MOUSETRAP_TICK_INTERVAL_MS` | `engine.tick_interval_ms` | u64 |
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//!
//! [logging]
//! level = "info"
//!
//! [engine]
//! tick_interval_ms = 100
//!
//! [components]
//! load = ["heartbeat", "event_logger"]
//!
//! [components.settings.heartbeat]
//! every = 10
//!
//! [components.settings.event_logger]
//! events = ["heartbeat"]
//! level = "info"
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::{ConfigResolver, StaticResolver};
pub use types::{ComponentsConfig, EngineConfig, LoggingConfig, MousetrapConfig};

/// Global config directory (`~/.mousetrap`).
#[must_use]
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".mousetrap")
}

/// Global config file (`~/.mousetrap/config.toml`).
#[must_use]
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}
