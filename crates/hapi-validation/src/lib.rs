//! # hapi-validation: Schema Validation for HTTP API Payloads
//!
//! Validates request payloads against JSON Schemas and turns the
//! violations into a JSON:API error response.
//!
//! ## Flow
//!
//! ```text
//! payload ─▶ HttpApiValidator ─▶ ValidationEngine (jsonschema)
//!                                      │
//!                   ValidationResult ◀─┘ ordered violations
//!                          │
//!                          ▼
//!            Option<ErrorResponse> (422, one error object per violation)
//! ```
//!
//! ## Entry points
//!
//! - [`HttpApiValidator::validate_structure`]: a `serde_json::Value`,
//!   rewritten in place under coercing/defaulting [`CheckMode`]s.
//! - [`HttpApiValidator::validate_json_text`]: JSON text.
//! - [`HttpApiValidator::validate_yaml_text`]: YAML text.
//! - [`HttpApiValidator::validate_mapping`]: any `Serialize` value.
//!
//! All of them return `Result<ValidationResult, SchemaError>`. A document
//! that violates its schema is never an `Err`; malformed text and
//! non-mapping values are validated as an empty object so the caller gets
//! ordinary "required" violations back. Only an unusable schema is an error.
//!
//! ## Example
//!
//! ```no_run
//! use hapi_validation::{HttpApiValidator, Schema};
//! use hapi_jsonapi::HeaderMap;
//!
//! let schema = Schema::from_json_str(
//!     r#"{"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]}"#,
//! )?;
//! let validator = HttpApiValidator::new();
//!
//! let result = validator.validate_json_text(r#"{"description": false}"#, &schema, None)?;
//! if let Some(response) = result.to_error_response(HeaderMap::new()) {
//!     assert_eq!(response.status().as_u16(), 422);
//! }
//! # Ok::<(), hapi_validation::SchemaError>(())
//! ```

pub mod adapter;
mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod mode;
pub mod result;
pub mod schema;
pub mod violation;

pub use adapter::HttpApiValidator;
pub use config::{SchemaDraft, ValidatorConfig};
pub use engine::ValidationEngine;
pub use error::{ConfigError, SchemaError};
pub use mode::CheckMode;
pub use result::ValidationResult;
pub use schema::Schema;
pub use violation::Violation;
