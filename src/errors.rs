//! # Error handling
//!
//! A single [`ApiError`] enum covers the whole error taxonomy of the crate:
//!
//! - **Validation** (400) - the client sent a bad filter or a malformed body.
//! - **Not found** (404) - the requested id matches no document.
//! - **Conflict** (409) - the store reported a uniqueness violation.
//! - **Document rejected** (400) - the store rejected a write for schema reasons.
//! - **Configuration** (500) - the representation registry cannot satisfy the
//!   request; a setup bug, not a client mistake.
//! - **Internal** (500) - anything else.
//!
//! Every error carries a short title and a human-readable detail string, rendered
//! as an `application/problem+json` body. Internal details are logged with
//! `tracing` and never sent to clients.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Structured error value returned by every fallible operation in the crate.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - invalid filter, operator value or request body.
    Validation {
        /// Short summary, e.g. "Invalid search criteria".
        title: String,
        /// Human-readable explanation of this occurrence.
        detail: String,
    },

    /// 404 Not Found - no document matches the requested id.
    NotFound {
        /// Resource type name, e.g. "cats".
        resource: String,
        /// The id that was looked up.
        id: String,
        /// The verb of the failed operation ("update", "delete"), when the
        /// lookup was part of a write.
        action: Option<String>,
    },

    /// 409 Conflict - the store reported a uniqueness violation.
    Conflict { detail: String },

    /// 400 Bad Request - the store rejected the document shape (cast/schema
    /// failure). The driver diagnostic is preserved in the detail.
    DocumentRejected { title: String, detail: String },

    /// 500 Internal Server Error - the representation registry cannot satisfy
    /// the negotiated content type or capability. Signals a setup bug.
    Configuration { detail: String },

    /// 500 Internal Server Error - unexpected failure. Internal details are
    /// logged, never rendered.
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    /// Create a 400 validation error with a title and detail.
    pub fn validation(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Validation {
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// Create a 404 error for a resource/id pair.
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
            action: None,
        }
    }

    /// Create a 404 error for a write that found nothing to act on.
    pub fn not_found_for(
        resource: impl Into<String>,
        id: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
            action: Some(action.into()),
        }
    }

    /// Create a 409 conflict error.
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict {
            detail: detail.into(),
        }
    }

    /// Create a 400 error for a store-rejected document, preserving the driver
    /// diagnostic.
    pub fn document_rejected(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DocumentRejected {
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// Create a 500 configuration error (registry/capability mismatch).
    pub fn configuration(detail: impl Into<String>) -> Self {
        Self::Configuration {
            detail: detail.into(),
        }
    }

    /// Create a 500 internal error with optional details for the log.
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// The HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::DocumentRejected { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Configuration { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short, user-facing summary of the problem.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Validation { title, .. } | Self::DocumentRejected { title, .. } => title.clone(),
            Self::NotFound { .. } => "Entity not found".to_string(),
            Self::Conflict { .. } => "Duplicate document".to_string(),
            Self::Configuration { .. } => "Configuration error".to_string(),
            Self::Internal { .. } => "Internal error".to_string(),
        }
    }

    /// Human-readable, sanitized explanation of this occurrence.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Validation { detail, .. }
            | Self::Conflict { detail }
            | Self::DocumentRejected { detail, .. }
            | Self::Configuration { detail } => detail.clone(),
            Self::NotFound {
                resource,
                id,
                action,
            } => match action {
                Some(action) => {
                    format!("Unable to find an entity {resource} with id \"{id}\" to {action}")
                }
                None => format!("Unable to find an entity {resource} with id \"{id}\""),
            },
            Self::Internal { message, .. } => message.clone(),
        }
    }

    /// Log internal details. Configuration errors are logged as server faults so
    /// they stay distinguishable from client errors in logs and metrics.
    fn log_internal(&self) {
        match self {
            Self::Configuration { detail } => {
                tracing::error!(detail = %detail, "representation registry misconfiguration");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "internal error");
            }
            _ => {
                tracing::debug!(
                    status = %self.status_code(),
                    detail = %self.detail(),
                    "request failed"
                );
            }
        }
    }
}

/// RFC 9457 style body sent to clients. Never contains stack traces.
#[derive(Serialize)]
struct ProblemDetail {
    status: u16,
    title: String,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let body = ProblemDetail {
            status: status.as_u16(),
            title: self.title(),
            detail: self.detail(),
        };

        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(body),
        )
            .into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.detail())
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_400() {
        let err = ApiError::validation("Invalid search criteria", "The field \"x\" is not allowed");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.title(), "Invalid search criteria");
        assert_eq!(err.detail(), "The field \"x\" is not allowed");
    }

    #[test]
    fn test_not_found_message() {
        let err = ApiError::not_found("cats", "abc123");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.detail(),
            "Unable to find an entity cats with id \"abc123\""
        );
    }

    #[test]
    fn test_not_found_with_action() {
        let err = ApiError::not_found_for("cats", "abc123", "update");
        assert_eq!(
            err.detail(),
            "Unable to find an entity cats with id \"abc123\" to update"
        );
    }

    #[test]
    fn test_conflict_is_409() {
        let err = ApiError::conflict("A document with the keys (name: \"a\") already exist");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.title(), "Duplicate document");
    }

    #[test]
    fn test_configuration_is_500() {
        let err = ApiError::configuration("No representation can render a page");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_document_rejected_is_400() {
        let err = ApiError::document_rejected("Cast Error", "cannot cast \"x\" to number");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "cannot cast \"x\" to number");
    }

    #[test]
    fn test_internal_hides_details() {
        let err = ApiError::internal("Unexpected failure", Some("stack trace here".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        // The internal payload never reaches title or detail.
        assert!(!err.detail().contains("stack trace"));
    }

    #[test]
    fn test_display() {
        let err = ApiError::validation("Invalid body", "missing data");
        assert_eq!(format!("{err}"), "Invalid body: missing data");
    }
}
