//! Domain errors for the gateway.

use thiserror::Error;

use tmfgw_sdk::{GatewayError, Violation};

/// Domain-level errors for gateway operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// An inbound payload failed validation before forwarding.
    #[error("request payload failed validation for '{resource}'")]
    RequestValidationFailed {
        resource: String,
        violations: Vec<Violation>,
    },

    /// A backend response failed validation after translation.
    #[error("response payload failed validation for '{resource}'")]
    ResponseValidationFailed {
        resource: String,
        upstream_status: u16,
    },

    /// No response was obtained from the backend after all attempts.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Internal error.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    /// Create a request-validation failure.
    #[must_use]
    pub fn request_validation(resource: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self::RequestValidationFailed {
            resource: resource.into(),
            violations,
        }
    }
}

/// Convert `DomainError` to the SDK `GatewayError`.
impl From<DomainError> for GatewayError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::RequestValidationFailed {
                resource,
                violations,
            } => Self::validation_failed(resource, violations),
            DomainError::ResponseValidationFailed {
                resource,
                upstream_status,
            } => Self::ResponseValidationFailed {
                resource,
                upstream_status,
            },
            DomainError::UpstreamUnavailable { message } => Self::upstream_unavailable(message),
            // Short stable message only; raw internals stay in the logs.
            DomainError::Internal(_) => Self::internal("unexpected gateway failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_does_not_leak_details() {
        let e = DomainError::Internal(anyhow::anyhow!("connection pool exploded at 0x7f"));
        let gateway: GatewayError = e.into();
        assert_eq!(gateway.code(), "InternalServerError");
        assert!(!gateway.to_string().contains("0x7f"));
    }

    #[test]
    fn validation_failure_keeps_violations() {
        let e = DomainError::request_validation("Item", vec![Violation::new("", "'id' missing")]);
        let gateway: GatewayError = e.into();
        match gateway {
            GatewayError::ValidationFailed { violations, .. } => {
                assert_eq!(violations.len(), 1);
            }
            other => panic!("unexpected variant: {other}"),
        }
    }
}
