//! # Validation Results
//!
//! The outcome of one validation call, and its rendering as a JSON:API
//! error response.

use hapi_jsonapi::{ErrorObject, ErrorResponse, ErrorSource, HeaderMap};

use crate::violation::Violation;

/// HTTP status of every validation error object.
pub const VALIDATION_ERROR_STATUS: u16 = 422;
/// Machine-readable code of every validation error object.
pub const VALIDATION_ERROR_CODE: &str = "validation_error";
/// Title of every validation error object.
pub const VALIDATION_ERROR_TITLE: &str = "Validation error";

/// Ordered violations from one validation call.
///
/// Valid if and only if there are no violations; fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<Violation>,
    is_valid: bool,
}

impl ValidationResult {
    /// Wrap the violations reported by one validation call.
    pub fn new(errors: Vec<Violation>) -> Self {
        let is_valid = errors.is_empty();
        Self { errors, is_valid }
    }

    /// Whether the document satisfied the schema.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The violations, in reported order.
    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    /// Consume the result, returning the violations.
    pub fn into_errors(self) -> Vec<Violation> {
        self.errors
    }

    /// Build a 422 error response with one error object per violation.
    ///
    /// Returns `None` when the document is valid. `headers` are passed
    /// through to the response unmodified.
    pub fn to_error_response(&self, headers: HeaderMap) -> Option<ErrorResponse> {
        if self.is_valid {
            return None;
        }
        let errors = self.errors.iter().map(error_object).collect();
        Some(ErrorResponse::new(errors, headers))
    }

    /// `Ok(())` when valid, otherwise the error response.
    ///
    /// Lets handlers returning `Result<_, ErrorResponse>` use `?`.
    pub fn ensure_valid(&self, headers: HeaderMap) -> Result<(), ErrorResponse> {
        match self.to_error_response(headers) {
            Some(response) => Err(response),
            None => Ok(()),
        }
    }
}

fn error_object(violation: &Violation) -> ErrorObject {
    ErrorObject::new(VALIDATION_ERROR_STATUS)
        .with_code(VALIDATION_ERROR_CODE)
        .with_source(ErrorSource::pointer(violation.pointer.clone()))
        .with_title(VALIDATION_ERROR_TITLE)
        .with_detail(format!(
            "Invalid property value for \"{}\": {}",
            violation.property, violation.message
        ))
        .with_meta("constraint", violation.constraint.clone())
}
