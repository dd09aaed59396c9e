//! Gateway error types.
//!
//! Transport-agnostic error definitions for the TMF gateway. A non-2xx
//! upstream response is NOT an error at this layer — it is a real answer from
//! a reachable backend. Only the cases below are failures.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{RequestContext, Violation};

/// Error type for gateway operations.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// No response was obtained from the backend after exhausting all
    /// attempts. Distinct from a backend error response.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// An inbound payload failed validation against the live schema.
    #[error("request payload failed validation for '{resource}'")]
    ValidationFailed {
        resource: String,
        violations: Vec<Violation>,
    },

    /// A backend response failed validation against the live schema.
    #[error("response payload failed validation for '{resource}'")]
    ResponseValidationFailed {
        resource: String,
        /// Status code the backend answered with.
        upstream_status: u16,
    },

    /// Internal error with a short stable message; raw internals never leak.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Create an upstream-unavailable error.
    #[must_use]
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create a request-validation failure.
    #[must_use]
    pub fn validation_failed(resource: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self::ValidationFailed {
            resource: resource.into(),
            violations,
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable { .. } => "UpstreamUnavailable",
            Self::ValidationFailed { .. } | Self::ResponseValidationFailed { .. } => {
                "ValidationFailed"
            }
            Self::Internal { .. } => "InternalServerError",
        }
    }

    /// HTTP status class the external-facing layer should render.
    ///
    /// Response-validation failures keep the upstream's own status when it
    /// was already 5xx, and are rendered as a gateway error otherwise.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UpstreamUnavailable { .. } => 502,
            Self::ValidationFailed { .. } => 400,
            Self::ResponseValidationFailed {
                upstream_status, ..
            } => {
                if *upstream_status >= 500 {
                    *upstream_status
                } else {
                    502
                }
            }
            Self::Internal { .. } => 500,
        }
    }

    /// Render this error as an external problem document, threading the
    /// request's correlation id.
    #[must_use]
    pub fn to_problem(&self, ctx: &RequestContext) -> Problem {
        let details = match self {
            Self::ValidationFailed { violations, .. } => {
                violations.iter().map(ToString::to_string).collect()
            }
            _ => Vec::new(),
        };
        Problem {
            code: self.code().to_owned(),
            message: self.to_string(),
            correlation_id: ctx.correlation_id,
            details,
        }
    }
}

/// External problem document: stable code, human-readable message, and the
/// correlation id of the request that failed.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    pub code: String,
    pub message: String,
    pub correlation_id: Uuid,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(GatewayError::upstream_unavailable("x").status_code(), 502);
        assert_eq!(
            GatewayError::validation_failed("Item", vec![]).status_code(),
            400
        );
        assert_eq!(GatewayError::internal("x").status_code(), 500);
    }

    #[test]
    fn response_validation_keeps_5xx_upstream_status() {
        let e = GatewayError::ResponseValidationFailed {
            resource: "Item".into(),
            upstream_status: 503,
        };
        assert_eq!(e.status_code(), 503);

        let e = GatewayError::ResponseValidationFailed {
            resource: "Item".into(),
            upstream_status: 200,
        };
        assert_eq!(e.status_code(), 502);
    }

    #[test]
    fn problem_carries_correlation_id_and_details() {
        let ctx = RequestContext::new();
        let e = GatewayError::validation_failed("Item", vec![Violation::new("", "'id' is required")]);
        let problem = e.to_problem(&ctx);
        assert_eq!(problem.code, "ValidationFailed");
        assert_eq!(problem.correlation_id, ctx.correlation_id);
        assert_eq!(problem.details, vec![": 'id' is required"]);
    }
}
