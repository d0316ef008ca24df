//! Config loading errors.
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`ConfigError::NotFound`] | `CONFIG_NOT_FOUND` | No |
//! | [`ConfigError::ReadFile`] | `CONFIG_READ_FILE` | Yes |
//! | [`ConfigError::ParseToml`] | `CONFIG_PARSE_TOML` | No |
//! | [`ConfigError::InvalidEnvVar`] | `CONFIG_INVALID_ENV_VAR` | No |
//!
//! A read failure may be a transient permission or I/O problem, so the
//! host can retry a reload. The others need the file or environment
//! fixed first.

use mousetrap_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Why a [`MousetrapConfig`](super::MousetrapConfig) could not be resolved.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--config` named a file that is not there. The global file may
    /// be absent; an explicit one may not.
    #[error("no config file at '{path}'")]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("cannot read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid mousetrap config.
    #[error("'{path}' is not a valid mousetrap config: {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A `MOUSETRAP_*` variable could not be parsed.
    #[error("environment variable {name}: {message}")]
    InvalidEnvVar { name: String, message: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    /// `message` says what was expected, e.g. `"expected bool"`.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "CONFIG_NOT_FOUND",
            Self::ReadFile { .. } => "CONFIG_READ_FILE",
            Self::ParseToml { .. } => "CONFIG_PARSE_TOML",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::ReadFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mousetrap_types::assert_error_codes;

    fn broken_toml() -> toml::de::Error {
        toml::from_str::<toml::Table>("= broken").unwrap_err()
    }

    #[test]
    fn messages_name_the_culprit() {
        let err = ConfigError::invalid_env_var("MOUSETRAP_DEBUG", "expected bool");
        assert_eq!(
            err.to_string(),
            "environment variable MOUSETRAP_DEBUG: expected bool"
        );

        let err = ConfigError::parse_toml("/etc/mousetrap.toml", broken_toml());
        assert!(err
            .to_string()
            .starts_with("'/etc/mousetrap.toml' is not a valid mousetrap config"));
    }

    #[test]
    fn only_read_failures_recoverable() {
        assert!(ConfigError::read_file("x.toml", std::io::Error::other("denied")).is_recoverable());
        assert!(!ConfigError::NotFound {
            path: "x.toml".into()
        }
        .is_recoverable());
        assert!(!ConfigError::parse_toml("x.toml", broken_toml()).is_recoverable());
    }

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(
            &[
                ConfigError::NotFound {
                    path: "x.toml".into(),
                },
                ConfigError::read_file("x.toml", std::io::Error::other("denied")),
                ConfigError::parse_toml("x.toml", broken_toml()),
                ConfigError::invalid_env_var("X", "y"),
            ],
            "CONFIG_",
        );
    }
}
