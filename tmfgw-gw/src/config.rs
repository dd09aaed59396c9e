//! Gateway configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Gateway configuration.
///
/// Loading this from files or the environment is the host's job; the gateway
/// only consumes the values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    // === Backend ===
    /// Base URL of the backend all operations are forwarded to.
    pub backend_base_url: String,

    // === Schema source ===
    /// Remote URL to fetch the backend's OpenAPI document from.
    pub schema_url: Option<String>,
    /// Local path to an OpenAPI document. Takes priority only when no
    /// remote URL is configured; otherwise it is the fallback.
    pub schema_path: Option<PathBuf>,
    /// Timeout for one schema fetch in milliseconds.
    pub schema_fetch_timeout_ms: u64,

    // === Forwarding ===
    /// Per-attempt timeout in milliseconds.
    pub upstream_timeout_ms: u64,
    /// Number of retries after the initial attempt.
    pub upstream_retry_count: u32,
    /// Base delay for the incremental inter-attempt backoff in milliseconds.
    pub upstream_backoff_base_ms: u64,

    // === Static credentials ===
    /// Bearer token injected as `Authorization: Bearer <token>`.
    pub upstream_bearer_token: Option<String>,
    /// API key injected under `api_key_header`.
    pub upstream_api_key: Option<String>,
    /// Header name the API key is sent under.
    pub api_key_header: String,

    // === Validation toggles ===
    /// Validate inbound payloads before forwarding.
    pub validate_requests: bool,
    /// Validate backend responses after translation.
    pub validate_responses: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8000".to_owned(),

            schema_url: None,
            schema_path: None,
            schema_fetch_timeout_ms: 10_000,

            upstream_timeout_ms: 10_000,
            upstream_retry_count: 1,
            upstream_backoff_base_ms: 250,

            upstream_bearer_token: None,
            upstream_api_key: None,
            api_key_header: "X-API-Key".to_owned(),

            validate_requests: false,
            validate_responses: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.upstream_retry_count, 1);
        assert_eq!(cfg.api_key_header, "X-API-Key");
        assert!(!cfg.validate_requests);
    }

    #[test]
    fn deserializes_partial_config() {
        let cfg: GatewayConfig = serde_json::from_value(serde_json::json!({
            "backend_base_url": "http://inventory.internal",
            "upstream_retry_count": 3,
            "validate_requests": true
        }))
        .unwrap();
        assert_eq!(cfg.backend_base_url, "http://inventory.internal");
        assert_eq!(cfg.upstream_retry_count, 3);
        assert!(cfg.validate_requests);
        // untouched fields keep their defaults
        assert_eq!(cfg.upstream_timeout_ms, 10_000);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<GatewayConfig, _> =
            serde_json::from_value(serde_json::json!({ "bckend_base_url": "typo" }));
        assert!(result.is_err());
    }
}
