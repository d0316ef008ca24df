//! Log filter selection.
//!
//! The runtime only decides *which* directive applies. Installing a
//! subscriber (and swapping its filter on reload) is the host's job.

use crate::config::MousetrapConfig;

/// Returns the `EnvFilter` directive for `config`.
///
/// `debug = true` wins over `logging.level`; an empty level falls back
/// to `info`.
#[must_use]
pub fn filter_directive(config: &MousetrapConfig) -> String {
    if config.debug {
        return "debug".to_string();
    }
    let level = config.logging.level.trim();
    if level.is_empty() {
        "info".to_string()
    } else {
        level.to_string()
    }
}
