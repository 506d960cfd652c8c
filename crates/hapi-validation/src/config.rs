//! # Validator Configuration
//!
//! Settings shared by every validation call made through one
//! [`HttpApiValidator`](crate::HttpApiValidator). Loadable from JSON or
//! YAML; every field has a default so an empty document is a valid config.
//!
//! ```yaml
//! draft: draft2020-12
//! default_check_mode: "COERCE_TYPES | APPLY_DEFAULTS"
//! cache_capacity: 64
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mode::CheckMode;

/// Default number of compiled schemas kept per engine.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// JSON Schema draft used to interpret schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaDraft {
    /// Draft 4.
    #[serde(rename = "draft4")]
    Draft4,
    /// Draft 6.
    #[serde(rename = "draft6")]
    Draft6,
    /// Draft 7.
    #[serde(rename = "draft7")]
    Draft7,
    /// Draft 2019-09.
    #[serde(rename = "draft2019-09")]
    Draft201909,
    /// Draft 2020-12.
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

impl From<SchemaDraft> for jsonschema::Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
            SchemaDraft::Draft6 => jsonschema::Draft::Draft6,
            SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
            SchemaDraft::Draft201909 => jsonschema::Draft::Draft201909,
            SchemaDraft::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

/// Validator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Draft to force. `None` detects it from `$schema`, falling back to
    /// Draft 2020-12.
    pub draft: Option<SchemaDraft>,
    /// Mode used when a call does not pass one.
    pub default_check_mode: CheckMode,
    /// Compiled schemas kept per engine. Zero disables the cache.
    pub cache_capacity: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            draft: None,
            default_check_mode: CheckMode::NORMAL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ValidatorConfig {
    /// Parse a configuration from YAML (or JSON, which is valid YAML).
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Load a configuration file. `.json` files are parsed as JSON, all
    /// others as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                serde_json::from_str(&text).map_err(|e| ConfigError::Invalid(e.to_string()))
            }
            _ => Self::from_yaml_str(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.draft, None);
        assert_eq!(config.default_check_mode, CheckMode::NORMAL);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(
            ValidatorConfig::from_yaml_str("").unwrap(),
            ValidatorConfig::default()
        );
    }

    #[test]
    fn parses_yaml() {
        let config = ValidatorConfig::from_yaml_str(
            "draft: draft7\ndefault_check_mode: \"COERCE_TYPES | APPLY_DEFAULTS\"\ncache_capacity: 4\n",
        )
        .unwrap();
        assert_eq!(config.draft, Some(SchemaDraft::Draft7));
        assert_eq!(
            config.default_check_mode,
            CheckMode::COERCE_TYPES | CheckMode::APPLY_DEFAULTS
        );
        assert_eq!(config.cache_capacity, 4);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = ValidatorConfig::from_yaml_str("cache_capacity: 0").unwrap();
        assert_eq!(config.cache_capacity, 0);
        assert_eq!(config.draft, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ValidatorConfig::from_yaml_str("strictness: high").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"draft": "draft2019-09"}}"#).unwrap();
        let config = ValidatorConfig::from_path(file.path()).unwrap();
        assert_eq!(config.draft, Some(SchemaDraft::Draft201909));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ValidatorConfig::from_path("/nonexistent/validator.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn draft_maps_to_validator_draft() {
        assert_eq!(
            jsonschema::Draft::from(SchemaDraft::Draft202012),
            jsonschema::Draft::Draft202012
        );
    }
}
