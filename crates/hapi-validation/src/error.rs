//! # Error Types
//!
//! Failures of the validation layer itself. A document that does not
//! conform to its schema is NOT an error here: violations are returned as
//! data inside a [`ValidationResult`](crate::ValidationResult). Only a
//! schema or configuration that cannot be used ends up in these types.

use thiserror::Error;

/// A schema document could not be loaded, parsed, or compiled.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to load schema {path}: {reason}")]
    Load {
        /// Path of the schema file.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The schema text or mapping could not be turned into a JSON value.
    #[error("failed to parse schema as {format}: {reason}")]
    Parse {
        /// Source format (`json`, `yaml`, `mapping`).
        format: &'static str,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The JSON Schema validator rejected the schema.
    #[error("failed to compile schema: {reason}")]
    Compile {
        /// Error reported by the validator.
        reason: String,
    },
}

/// The validator configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid.
    #[error("invalid validator config: {0}")]
    Invalid(String),
}
