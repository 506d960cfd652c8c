//! # Validation Engine
//!
//! Wraps a compiled [`jsonschema::Validator`] behind a small stateful
//! interface: `validate` accumulates violations, `violations` reads them,
//! `reset` clears them. One engine is owned by each
//! [`HttpApiValidator`](crate::HttpApiValidator) and reused across calls.
//!
//! ## Violation order
//!
//! Violations are reported in document-tree order: the violations of an
//! object (missing properties from `required` or `dependentRequired`
//! first) come before those of its
//! children, and children appear in the order the validator first reached
//! them, which is the schema's property declaration order. A missing
//! required property is therefore reported before a type error on a later
//! property.
//!
//! ## Compiled-schema cache
//!
//! Compiled validators are cached by the SHA-256 digest of the schema and
//! the compile options. The cache is cleared when it reaches
//! [`ValidatorConfig::cache_capacity`].

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::coerce;
use crate::config::ValidatorConfig;
use crate::error::SchemaError;
use crate::mode::CheckMode;
use crate::schema::Schema;
use crate::violation::{escape_segment, pointer_segments, property_path, Violation};

type CacheKey = [u8; 32];

/// Stateful JSON Schema validator.
pub struct ValidationEngine {
    config: ValidatorConfig,
    compiled: HashMap<CacheKey, Arc<Validator>>,
    violations: Vec<Violation>,
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("config", &self.config)
            .field("compiled_count", &self.compiled.len())
            .field("violations", &self.violations)
            .finish()
    }
}

impl ValidationEngine {
    /// Create an engine with an empty cache and no violations.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            compiled: HashMap::new(),
            violations: Vec::new(),
        }
    }

    /// Clear violations left by a previous call. The compiled-schema cache
    /// is kept.
    pub fn reset(&mut self) {
        self.violations.clear();
    }

    /// Violations accumulated since the last [`reset`](Self::reset).
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Move the accumulated violations out, leaving the engine clean.
    pub fn take_violations(&mut self) -> Vec<Violation> {
        std::mem::take(&mut self.violations)
    }

    /// Number of compiled schemas currently cached.
    pub fn cached_schemas(&self) -> usize {
        self.compiled.len()
    }

    /// Validate `document` against `schema`, appending any violations.
    ///
    /// With a rewriting [`CheckMode`], `document` is modified in place
    /// before the schema is evaluated, whether or not it ends up valid.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] if the schema itself is invalid.
    /// A non-conforming document is not an error.
    pub fn validate(
        &mut self,
        document: &mut Value,
        schema: &Schema,
        mode: CheckMode,
    ) -> Result<(), SchemaError> {
        let validator = self.compiled_validator(schema, mode)?;

        coerce::prepare(document, schema.as_value(), mode);

        let document: &Value = document;
        let mut tree = LocationNode::default();
        for error in validator.iter_errors(document) {
            let (location, located) = locate(&error, document);
            tree.insert(&location, located);
        }

        let before = self.violations.len();
        tree.flatten_into(&mut self.violations);
        tracing::debug!(
            mode = ?mode,
            violations = self.violations.len() - before,
            "validated document"
        );
        Ok(())
    }

    /// Convert any serializable value into a document.
    ///
    /// Mappings convert recursively, keeping key order and any nested
    /// sequences. Anything else at the top level (sequences, scalars, null,
    /// values that fail to serialize) becomes an empty object, so that
    /// validation reports missing required properties instead of a type
    /// error on the root.
    pub fn to_document<T: Serialize + ?Sized>(input: &T) -> Value {
        match serde_json::to_value(input) {
            Ok(value @ Value::Object(_)) => value,
            Ok(other) => {
                tracing::warn!(
                    kind = json_kind(&other),
                    "non-mapping input replaced by an empty document"
                );
                Value::Object(Map::new())
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "unserializable input replaced by an empty document"
                );
                Value::Object(Map::new())
            }
        }
    }

    fn compiled_validator(
        &mut self,
        schema: &Schema,
        mode: CheckMode,
    ) -> Result<Arc<Validator>, SchemaError> {
        let validate_formats = mode.validates_formats();
        let key = cache_key(schema, &self.config, validate_formats);

        if let Some(validator) = self.compiled.get(&key) {
            tracing::trace!("compiled schema cache hit");
            return Ok(Arc::clone(validator));
        }
        tracing::trace!("compiled schema cache miss");

        let mut options = jsonschema::options();
        if let Some(draft) = self.config.draft {
            options.with_draft(draft.into());
        }
        options.should_validate_formats(validate_formats);
        let validator = options
            .build(schema.as_value())
            .map(Arc::new)
            .map_err(|e| SchemaError::Compile {
                reason: e.to_string(),
            })?;

        if self.config.cache_capacity > 0 {
            if self.compiled.len() >= self.config.cache_capacity {
                tracing::debug!(
                    capacity = self.config.cache_capacity,
                    "compiled schema cache full, clearing"
                );
                self.compiled.clear();
            }
            self.compiled.insert(key, Arc::clone(&validator));
        }
        Ok(validator)
    }
}

fn cache_key(schema: &Schema, config: &ValidatorConfig, validate_formats: bool) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(schema.digest());
    hasher.update(format!("{:?}", config.draft).as_bytes());
    hasher.update([u8::from(validate_formats)]);
    hasher.finalize().into()
}

/// A violation and whether it reports a missing property.
struct Located {
    missing: bool,
    violation: Violation,
}

/// Turn a validator error into a violation plus the pointer segments of
/// the node it belongs to.
fn locate(error: &ValidationError<'_>, document: &Value) -> (Vec<String>, Located) {
    let node_pointer = error.instance_path.to_string();
    let location = pointer_segments(&node_pointer);
    let mut segments = location.clone();
    let mut pointer = node_pointer.clone();
    let mut pattern = None;
    let mut missing = false;

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_owned)
                .unwrap_or_else(|| property.to_string());
            pointer = format!("{node_pointer}/{}", escape_segment(&name));
            segments.push(name);
            missing = true;
        }
        ValidationErrorKind::Pattern { pattern: regex } => {
            pattern = Some(regex.clone());
        }
        _ => {}
    }

    let constraint = constraint_name(error);
    missing |= constraint == "dependentRequired";

    let violation = Violation {
        property: property_path(document, &segments),
        pointer,
        message: error.to_string(),
        constraint,
        pattern,
    };
    (location, Located { missing, violation })
}

/// The keyword that produced an error: the last segment of its schema path.
fn constraint_name(error: &ValidationError<'_>) -> String {
    if matches!(error.kind, ValidationErrorKind::FalseSchema) {
        return "false".to_string();
    }
    let schema_path = error.schema_path.to_string();
    pointer_segments(&schema_path)
        .pop()
        .unwrap_or_else(|| "schema".to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Violations grouped by the document node they belong to.
#[derive(Default)]
struct LocationNode {
    here: Vec<Located>,
    children: Vec<(String, LocationNode)>,
}

impl LocationNode {
    fn insert(&mut self, path: &[String], located: Located) {
        let Some((head, rest)) = path.split_first() else {
            self.here.push(located);
            return;
        };
        let index = match self.children.iter().position(|(key, _)| key == head) {
            Some(index) => index,
            None => {
                self.children.push((head.clone(), LocationNode::default()));
                self.children.len() - 1
            }
        };
        self.children[index].1.insert(rest, located);
    }

    fn flatten_into(mut self, out: &mut Vec<Violation>) {
        // Stable: keeps validator order among the remaining constraints.
        self.here.sort_by_key(|located| !located.missing);
        out.extend(self.here.into_iter().map(|located| located.violation));
        for (_, child) in self.children {
            child.flatten_into(out);
        }
    }
}
