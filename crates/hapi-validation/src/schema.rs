//! # Schema Documents
//!
//! An immutable JSON Schema plus the SHA-256 digest of its JSON text. The
//! digest keys the engine's compiled-schema cache, so the same schema
//! passed on every request is compiled once.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::SchemaError;

/// A JSON Schema document.
#[derive(Debug, Clone)]
pub struct Schema {
    value: Value,
    digest: [u8; 32],
}

impl Schema {
    /// Wrap an already-parsed schema.
    pub fn from_value(value: Value) -> Self {
        let digest = Sha256::digest(value.to_string().as_bytes()).into();
        Self { value, digest }
    }

    /// Build a schema from any serializable nested mapping.
    pub fn from_mapping<T: Serialize + ?Sized>(mapping: &T) -> Result<Self, SchemaError> {
        serde_json::to_value(mapping)
            .map(Self::from_value)
            .map_err(|e| SchemaError::Parse {
                format: "mapping",
                reason: e.to_string(),
            })
    }

    /// Parse a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(text)
            .map(Self::from_value)
            .map_err(|e| SchemaError::Parse {
                format: "json",
                reason: e.to_string(),
            })
    }

    /// Parse a schema from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(text)
            .map(Self::from_value)
            .map_err(|e| SchemaError::Parse {
                format: "yaml",
                reason: e.to_string(),
            })
    }

    /// Load a schema file. `.yaml`/`.yml` files are parsed as YAML, all
    /// others as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// The schema as a JSON value.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Consume the schema, returning its JSON value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// SHA-256 digest of the schema's compact JSON text.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for Schema {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::io::Write;

    fn person() -> Value {
        json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"],
        })
    }

    #[test]
    fn json_and_yaml_sources_agree() {
        let from_json = Schema::from_json_str(&person().to_string()).unwrap();
        let from_yaml = Schema::from_yaml_str(
            "type: object\nproperties:\n  name:\n    type: string\nrequired: [name]\n",
        )
        .unwrap();
        assert_eq!(from_json.as_value(), from_yaml.as_value());
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn from_mapping_accepts_rust_maps() {
        let mut mapping = BTreeMap::new();
        mapping.insert("type", "string");
        let schema = Schema::from_mapping(&mapping).unwrap();
        assert_eq!(schema.as_value(), &json!({ "type": "string" }));
    }

    #[test]
    fn digest_tracks_content() {
        let a = Schema::from_value(person());
        let b = Schema::from_value(person());
        let c = Schema::from_value(json!({ "type": "string" }));
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn invalid_text_is_parse_error() {
        let err = Schema::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::Parse { format: "json", .. }));

        let err = Schema::from_yaml_str("type: [unclosed").unwrap_err();
        assert!(matches!(err, SchemaError::Parse { format: "yaml", .. }));
    }

    #[test]
    fn loads_yaml_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "type: integer").unwrap();
        let schema = Schema::from_path(file.path()).unwrap();
        assert_eq!(schema.as_value(), &json!({ "type": "integer" }));
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = Schema::from_path("/nonexistent/person.schema.json").unwrap_err();
        assert!(matches!(err, SchemaError::Load { .. }));
    }
}
