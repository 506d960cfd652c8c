//! # hapi-jsonapi: JSON:API Error Envelopes
//!
//! Error objects and error-response documents in the shape JSON:API
//! consumers expect:
//!
//! ```text
//! {"errors": [{"status": 422, "code": "...", "source": {"pointer": "..."},
//!              "title": "...", "detail": "...", "meta": {...}}]}
//! ```
//!
//! ## Types
//!
//! - [`ErrorObject`]: one error, with a fixed member order.
//! - [`ErrorDocument`]: the serializable `{"errors": [...]}` body.
//! - [`ErrorResponse`]: errors plus HTTP status and extra headers;
//!   implements Axum's `IntoResponse`.
//!
//! ## Crate Policy
//!
//! - No resource documents, relationships, or links. Only error envelopes.
//! - Header and status types are re-exported from `axum::http` so callers
//!   do not need a direct `http` dependency.

pub mod error;
pub mod response;

pub use axum::http::{HeaderMap, HeaderValue, StatusCode};
pub use error::{ErrorObject, ErrorSource};
pub use response::{ErrorDocument, ErrorResponse, JSONAPI_MEDIA_TYPE};
