//! # Error Responses
//!
//! Bundles error objects with an overall HTTP status and caller-supplied
//! headers, and renders them as an Axum [`Response`].

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ErrorObject;

/// Media type of JSON:API documents.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Top-level JSON:API error document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDocument {
    /// All reported errors, in order.
    pub errors: Vec<ErrorObject>,
}

/// An error document ready to be sent as an HTTP response.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    status: StatusCode,
    errors: Vec<ErrorObject>,
    headers: HeaderMap,
}

impl ErrorResponse {
    /// Build a response from error objects and additional headers.
    ///
    /// The overall status is the status shared by every error. Mixed 4xx
    /// statuses collapse to 400; any other mix collapses to 500.
    pub fn new(errors: Vec<ErrorObject>, headers: HeaderMap) -> Self {
        let status = overall_status(&errors);
        Self {
            status,
            errors,
            headers,
        }
    }

    /// Overall HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The error objects, in order.
    pub fn errors(&self) -> &[ErrorObject] {
        &self.errors
    }

    /// The additional headers supplied by the caller.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response body as a serializable document.
    pub fn body(&self) -> ErrorDocument {
        ErrorDocument {
            errors: self.errors.clone(),
        }
    }

    /// The response body as compact JSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&ErrorDocumentRef {
            errors: &self.errors,
        })
    }
}

/// Borrowing twin of [`ErrorDocument`] used for serialization.
#[derive(Serialize)]
struct ErrorDocumentRef<'a> {
    errors: &'a [ErrorObject],
}

fn overall_status(errors: &[ErrorObject]) -> StatusCode {
    let Some(first) = errors.first().map(|e| e.status) else {
        tracing::warn!("error response built without any error objects");
        return StatusCode::INTERNAL_SERVER_ERROR;
    };

    if errors.iter().all(|e| e.status == first) {
        return StatusCode::from_u16(first).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    if errors.iter().all(|e| (400..500).contains(&e.status)) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let body = match self.to_json() {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize error document");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let mut response = (
            self.status,
            [(CONTENT_TYPE, HeaderValue::from_static(JSONAPI_MEDIA_TYPE))],
            body,
        )
            .into_response();

        // Caller headers win over the defaults above.
        response.headers_mut().extend(self.headers);
        response
    }
}
