//! # Validation Adapter
//!
//! [`HttpApiValidator`] is the entry point for request handlers. It accepts
//! a payload in whichever shape the handler has it (a parsed value, JSON
//! text, YAML text, or any serializable Rust value), normalizes it into a
//! document, and validates it with its [`ValidationEngine`].
//!
//! ## Engine reuse
//!
//! The engine is created on first use and reused, so compiled schemas are
//! cached across calls. It is held under a mutex for the whole of
//! reset-validate-collect, and reset at the start of every call, so
//! violations never leak from one call into the next, including when one
//! validator is shared between threads.
//!
//! ## Document rewriting
//!
//! Rewriting check modes (`COERCE_TYPES`, `APPLY_DEFAULTS`) only ever
//! modify the value passed to [`HttpApiValidator::validate_structure`].
//! The text and mapping entry points validate a document of their own and
//! drop it afterwards.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ValidatorConfig;
use crate::engine::ValidationEngine;
use crate::error::SchemaError;
use crate::mode::CheckMode;
use crate::result::ValidationResult;
use crate::schema::Schema;

/// Validates HTTP API payloads against JSON Schemas.
///
/// `Send + Sync`; share one instance (e.g. in Axum state behind an `Arc`).
#[derive(Debug, Default)]
pub struct HttpApiValidator {
    config: ValidatorConfig,
    engine: Mutex<Option<ValidationEngine>>,
}

impl HttpApiValidator {
    /// Create a validator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with the given configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            config,
            engine: Mutex::new(None),
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a structured document.
    ///
    /// `check_mode` defaults to the configured mode. With a rewriting mode,
    /// `document` is modified in place (e.g. `"42"` becomes `42` under
    /// [`CheckMode::COERCE_TYPES`]).
    ///
    /// # Errors
    ///
    /// Only an unusable schema is an error; violations are returned in the
    /// [`ValidationResult`].
    pub fn validate_structure(
        &self,
        document: &mut Value,
        schema: &Schema,
        check_mode: Option<CheckMode>,
    ) -> Result<ValidationResult, SchemaError> {
        let mode = check_mode.unwrap_or(self.config.default_check_mode);
        let mut engine = self.engine();
        engine.validate(document, schema, mode)?;
        Ok(ValidationResult::new(engine.take_violations()))
    }

    /// Validate JSON text.
    ///
    /// Text that is not valid JSON is validated as an empty object, so the
    /// result reports missing required properties.
    pub fn validate_json_text(
        &self,
        payload: &str,
        schema: &Schema,
        check_mode: Option<CheckMode>,
    ) -> Result<ValidationResult, SchemaError> {
        let mut document = serde_json::from_str(payload).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "malformed JSON payload validated as an empty document");
            Value::Object(Map::new())
        });
        self.validate_structure(&mut document, schema, check_mode)
    }

    /// Validate YAML text.
    ///
    /// Text that is not valid YAML is validated as an empty object.
    pub fn validate_yaml_text(
        &self,
        payload: &str,
        schema: &Schema,
        check_mode: Option<CheckMode>,
    ) -> Result<ValidationResult, SchemaError> {
        let mut document = serde_yaml::from_str(payload).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "malformed YAML payload validated as an empty document");
            Value::Object(Map::new())
        });
        self.validate_structure(&mut document, schema, check_mode)
    }

    /// Validate any serializable value: maps, vectors, structs, scalars.
    ///
    /// Mappings convert recursively; anything else at the top level is
    /// validated as an empty object (see [`ValidationEngine::to_document`]).
    pub fn validate_mapping<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        schema: &Schema,
        check_mode: Option<CheckMode>,
    ) -> Result<ValidationResult, SchemaError> {
        let mut document = ValidationEngine::to_document(payload);
        self.validate_structure(&mut document, schema, check_mode)
    }

    /// Lock the engine, creating it on first use, and clear its state.
    fn engine(&self) -> MappedMutexGuard<'_, ValidationEngine> {
        MutexGuard::map(self.engine.lock(), |slot| {
            let engine = slot.get_or_insert_with(|| ValidationEngine::new(self.config.clone()));
            engine.reset();
            engine
        })
    }
}
