//! Error types for flag registration, resolution and options loading.

use std::path::PathBuf;

use thiserror::Error;

use super::value::ValueKind;

/// Error type for configuration operations.
///
/// `DuplicateSetting`, `UnregisteredFlag` and `TypeMismatch` indicate
/// programmer errors in how the catalog is declared or queried. They are
/// fatal at startup and never caused by user input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A flag name was registered more than once.
    #[error("Flag '{name}' is already registered")]
    DuplicateSetting {
        /// The colliding name (canonical or alias)
        name: String,
    },

    /// A flag name was queried that the catalog does not know.
    #[error("Flag '{name}' is not registered")]
    UnregisteredFlag {
        /// The unknown name
        name: String,
    },

    /// A value's type does not match the setting's declared type.
    #[error("Flag '{flag}' expects a {expected} value, got {found}")]
    TypeMismatch {
        /// Canonical name of the setting
        flag: &'static str,
        /// Declared kind
        expected: ValueKind,
        /// Kind actually supplied
        found: ValueKind,
    },

    /// An integer does not fit the target field.
    #[error("Value {value} for '{flag}' is out of range")]
    OutOfRange {
        /// Canonical name of the setting
        flag: &'static str,
        /// The offending value
        value: i64,
    },

    /// Invalid duration syntax.
    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration {
        /// The raw input
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid ansible log events level.
    #[error("Invalid ansible log events '{value}': expected Nothing, Tasks, or Everything")]
    InvalidLogEvents {
        /// The invalid value provided
        value: String,
    },

    /// Failed to read the options file.
    #[error("Failed to read options file '{}': {source}", path.display())]
    FileRead {
        /// Path to the options file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML options file.
    #[error("Failed to parse TOML options: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Creates an `UnregisteredFlag` error.
    #[must_use]
    pub fn unregistered(name: &str) -> Self {
        Self::UnregisteredFlag {
            name: name.to_string(),
        }
    }

    /// Returns true for errors caused by how the catalog is declared or
    /// queried rather than by user-supplied input.
    #[must_use]
    pub const fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSetting { .. }
                | Self::UnregisteredFlag { .. }
                | Self::TypeMismatch { .. }
        )
    }
}
