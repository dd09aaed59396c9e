//! Gateway API trait.
//!
//! This is the contract an external request-router consumes: collection and
//! item CRUD per resource name, standalone validation, schema administration,
//! and the metrics read. Every method threads a [`RequestContext`] so that
//! failures can be correlated across translate/validate/forward stages.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::GatewayError;
use crate::models::{
    CallOptions, CatalogueReport, Direction, MetricsSnapshot, RequestContext, SchemaInfo,
    SchemaReloadReport, TmfResponse, UpstreamHealth, ValidationResult,
};

/// Public API trait for the TMF translation gateway.
///
/// CRUD operations return the TMF envelope plus the upstream's original
/// status code; the hosting router serializes both verbatim. A backend error
/// response (4xx/5xx) is a successful outcome here — only transport failure
/// surfaces as [`GatewayError::UpstreamUnavailable`].
#[async_trait]
pub trait TmfGatewayApi: Send + Sync {
    // === Collection operations ===

    /// List a resource collection, translating TMF query parameters to
    /// native ones.
    async fn list(
        &self,
        ctx: &RequestContext,
        resource: &str,
        query: BTreeMap<String, String>,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError>;

    /// Create a resource from a TMF payload.
    async fn create(
        &self,
        ctx: &RequestContext,
        resource: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError>;

    // === Item operations ===

    /// Read one resource item.
    async fn read(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError>;

    /// Partially update one resource item (PATCH semantics).
    async fn update(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError>;

    /// Replace one resource item (PUT semantics).
    async fn replace(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError>;

    /// Delete one resource item.
    async fn delete(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError>;

    // === Validation ===

    /// Validate a payload against the live schema without forwarding it.
    ///
    /// Never fails on invalid input: the outcome, including the case of a
    /// malformed schema definition, is expressed in the returned
    /// [`ValidationResult`].
    async fn validate(
        &self,
        ctx: &RequestContext,
        resource: &str,
        payload: Value,
        direction: Direction,
    ) -> Result<ValidationResult, GatewayError>;

    // === Administration ===

    /// Reload the backend schema, reusing conditional-cache headers.
    async fn reload_schema(&self, ctx: &RequestContext)
        -> Result<SchemaReloadReport, GatewayError>;

    /// Describe the currently active schema source and cache metadata.
    async fn schema_info(&self, ctx: &RequestContext) -> Result<SchemaInfo, GatewayError>;

    /// Generate the derived resource catalogue.
    async fn catalogue(&self, ctx: &RequestContext) -> Result<CatalogueReport, GatewayError>;

    /// Read the current metrics aggregate.
    async fn metrics(&self, ctx: &RequestContext) -> Result<MetricsSnapshot, GatewayError>;

    /// Probe the backend base URL once, best-effort.
    async fn upstream_health(&self, ctx: &RequestContext)
        -> Result<UpstreamHealth, GatewayError>;
}
