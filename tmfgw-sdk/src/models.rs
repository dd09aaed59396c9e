//! TMF gateway domain models.
//!
//! Models that cross the serialization boundary (catalogue, metrics, schema
//! descriptors) derive serde; the rest are plain domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// HTTP method for forwarded requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Convert to uppercase string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Translation direction for validation.
///
/// `TmfToNative` validates an inbound (request) payload, `NativeToTmf` an
/// outbound (response) payload. Direction-specific relaxations are reserved;
/// today both directions validate identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    TmfToNative,
    NativeToTmf,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TmfToNative => "tmf_to_native",
            Self::NativeToTmf => "native_to_tmf",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-request context threaded through every gateway operation.
///
/// Carries the correlation identifier used to tie translate/validate/forward
/// stages of one inbound request together in logs and error responses.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation identifier, generated or propagated by the caller.
    pub correlation_id: Uuid,
}

impl RequestContext {
    /// Create a context with a freshly generated correlation id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Create a context from a correlation id propagated by the caller.
    #[must_use]
    pub fn with_correlation_id(correlation_id: Uuid) -> Self {
        Self { correlation_id }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call options for CRUD operations.
///
/// `headers` are overlaid on top of the gateway's static credentials, so a
/// caller-supplied `Authorization` overrides the configured default. The
/// validation toggles override the configured ones when set.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Headers forwarded from the inbound request.
    pub headers: BTreeMap<String, String>,
    /// Override the configured request-validation toggle.
    pub validate_requests: Option<bool>,
    /// Override the configured response-validation toggle.
    pub validate_responses: Option<bool>,
}

impl CallOptions {
    /// Add a forwarded header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Override the request-validation toggle for this call.
    #[must_use]
    pub fn with_validate_requests(mut self, on: bool) -> Self {
        self.validate_requests = Some(on);
        self
    }

    /// Override the response-validation toggle for this call.
    #[must_use]
    pub fn with_validate_responses(mut self, on: bool) -> Self {
        self.validate_responses = Some(on);
        self
    }
}

/// Where the current schema snapshot was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Fetched from a remote URL.
    Url(String),
    /// Read from a local file.
    File(PathBuf),
    /// The built-in empty document fallback.
    Empty,
}

impl std::fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "url:{url}"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// An immutable snapshot of the backend's schema document.
///
/// Always structurally valid: either a real OpenAPI document or the empty
/// fallback `{openapi, paths: {}, components: {}}`. Replaced atomically on
/// reload; callers only ever see a fully loaded snapshot.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    /// The raw schema document tree.
    pub document: Value,
    /// Source the document was obtained from.
    pub source: SchemaSource,
    /// `ETag` from the last successful URL fetch, if any.
    pub etag: Option<String>,
    /// `Last-Modified` from the last successful URL fetch, if any.
    pub last_modified: Option<String>,
    /// When this snapshot was (re)validated against its source.
    pub loaded_at: DateTime<Utc>,
}

impl SchemaSnapshot {
    /// The declared `openapi` version string, if present.
    #[must_use]
    pub fn openapi_version(&self) -> Option<&str> {
        self.document.get("openapi").and_then(Value::as_str)
    }

    /// The `components.schemas` map, if present.
    #[must_use]
    pub fn component_schemas(&self) -> Option<&serde_json::Map<String, Value>> {
        self.document
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(Value::as_object)
    }

    /// The `paths` map, if present.
    #[must_use]
    pub fn paths(&self) -> Option<&serde_json::Map<String, Value>> {
        self.document.get("paths").and_then(Value::as_object)
    }
}

/// Descriptor of the active schema source and its cache metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    /// Active source descriptor, e.g. `url:http://backend/openapi.json`.
    pub source: String,
    /// Declared `openapi` version of the current document.
    pub openapi: Option<String>,
    /// Names of the component schemas in the current document.
    pub components: Vec<String>,
    /// Conditional-cache `ETag`, when the source is a URL.
    pub etag: Option<String>,
    /// Conditional-cache `Last-Modified`, when the source is a URL.
    pub last_modified: Option<String>,
    /// When the snapshot was last (re)validated.
    pub loaded_at: DateTime<Utc>,
}

/// Result of an administrative schema reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReloadReport {
    /// Source descriptor after the reload.
    pub source: String,
    /// Declared `openapi` version after the reload.
    pub openapi: Option<String>,
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Structural path into the payload, `/`-joined, empty at the root.
    pub path: String,
    /// Human-readable message for this violation.
    pub message: String,
}

impl Violation {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of validating one payload against the live schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the payload conformed.
    pub valid: bool,
    /// Violations ordered by structural path; empty when valid.
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// A passing result.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            violations: Vec::new(),
        }
    }

    /// A failing result with the given violations.
    #[must_use]
    pub fn failed(violations: Vec<Violation>) -> Self {
        Self {
            valid: false,
            violations,
        }
    }
}

/// Decoded response obtained from the backend.
///
/// Any HTTP status, including 4xx/5xx, is a successful forward outcome: the
/// backend was reachable and gave a real answer. Transport failure is the
/// separate [`GatewayError::UpstreamUnavailable`] case.
///
/// [`GatewayError::UpstreamUnavailable`]: crate::error::GatewayError::UpstreamUnavailable
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Decoded body: parsed JSON, or `{"raw": <text>}` for anything else.
    pub body: Value,
    /// HTTP status code returned by the backend.
    pub status_code: u16,
    /// Which attempt produced the response (1-based).
    pub attempt: u32,
    /// Total time spent forwarding, including retries, in milliseconds.
    pub duration_ms: u64,
}

/// TMF-side result of a CRUD operation: the wrapped envelope plus the
/// upstream's original status code.
#[derive(Debug, Clone)]
pub struct TmfResponse {
    /// TMF envelope, always wrapped under `data`.
    pub body: Value,
    /// Status code propagated from the backend.
    pub status_code: u16,
}

/// Result of the best-effort upstream health probe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpstreamHealth {
    /// Whether any HTTP response was obtained, regardless of status.
    pub reachable: bool,
    /// The status code of that response, if one was obtained.
    pub status_code: Option<u16>,
}

/// One attribute of a catalogued resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub required: bool,
}

/// Heuristically inferred CRUD capability flags.
///
/// Derived from substring/prefix matches over path entries; intentionally
/// approximate and may over- or under-match.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrudCapabilities {
    pub can_create: bool,
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

/// One resource entry in the derived catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    pub resource: String,
    pub description: String,
    pub key_attributes: Vec<String>,
    pub attributes: Vec<AttributeSpec>,
    pub capabilities: CrudCapabilities,
}

/// Provenance of the schema the catalogue was generated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProvenance {
    /// Declared `openapi` version of the source document.
    pub openapi: Option<String>,
    /// When the catalogue was generated.
    pub generated_at: DateTime<Utc>,
}

/// The full catalogue report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueReport {
    pub catalogue: Vec<CatalogueEntry>,
    pub generated_from_schema: SchemaProvenance,
}

/// Latency aggregate reported by the metrics-read operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatencySnapshot {
    pub count: u64,
    /// Mean latency in milliseconds, derived at read time.
    pub avg: u64,
    pub max: u64,
    pub min: u64,
}

/// Point-in-time view of the gateway's metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Named counters, e.g. `total_requests`.
    pub counters: BTreeMap<String, u64>,
    /// Request latency aggregate in milliseconds.
    pub latency_ms: LatencySnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trips_through_serde() {
        let d: Direction = serde_json::from_str("\"native_to_tmf\"").unwrap();
        assert_eq!(d, Direction::NativeToTmf);
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"native_to_tmf\"");
    }

    #[test]
    fn schema_source_descriptors() {
        assert_eq!(
            SchemaSource::Url("http://x/openapi.json".into()).to_string(),
            "url:http://x/openapi.json"
        );
        assert_eq!(SchemaSource::Empty.to_string(), "empty");
    }

    #[test]
    fn violation_renders_path_then_message() {
        let v = Violation::new("name", "5 is not of type \"string\"");
        assert_eq!(v.to_string(), "name: 5 is not of type \"string\"");
    }
}
