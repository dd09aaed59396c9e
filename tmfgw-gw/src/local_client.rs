//! Local client adapter implementing the SDK API trait.
//!
//! This adapter bridges the domain service to the public `TmfGatewayApi`
//! trait, which is the surface an external request-router consumes.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tmfgw_sdk::{
    CallOptions, CatalogueReport, Direction, GatewayError, MetricsSnapshot, RequestContext,
    SchemaInfo, SchemaReloadReport, TmfGatewayApi, TmfResponse, UpstreamHealth, ValidationResult,
};

use crate::domain::service::Service;

/// Local client adapter implementing the SDK API trait.
pub struct TmfGatewayClient {
    service: Arc<Service>,
}

impl TmfGatewayClient {
    /// Create a new local client adapter.
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TmfGatewayApi for TmfGatewayClient {
    // === Collection operations ===

    async fn list(
        &self,
        ctx: &RequestContext,
        resource: &str,
        query: BTreeMap<String, String>,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError> {
        self.service
            .list(ctx, resource, query, opts)
            .await
            .map_err(Into::into)
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        resource: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError> {
        self.service
            .create(ctx, resource, payload, opts)
            .await
            .map_err(Into::into)
    }

    // === Item operations ===

    async fn read(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError> {
        self.service
            .read(ctx, resource, id, opts)
            .await
            .map_err(Into::into)
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError> {
        self.service
            .update(ctx, resource, id, payload, opts)
            .await
            .map_err(Into::into)
    }

    async fn replace(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError> {
        self.service
            .replace(ctx, resource, id, payload, opts)
            .await
            .map_err(Into::into)
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        opts: CallOptions,
    ) -> Result<TmfResponse, GatewayError> {
        self.service
            .delete(ctx, resource, id, opts)
            .await
            .map_err(Into::into)
    }

    // === Validation ===

    async fn validate(
        &self,
        ctx: &RequestContext,
        resource: &str,
        payload: Value,
        direction: Direction,
    ) -> Result<ValidationResult, GatewayError> {
        Ok(self.service.validate(ctx, resource, &payload, direction).await)
    }

    // === Administration ===

    async fn reload_schema(
        &self,
        ctx: &RequestContext,
    ) -> Result<SchemaReloadReport, GatewayError> {
        Ok(self.service.reload_schema(ctx).await)
    }

    async fn schema_info(&self, _ctx: &RequestContext) -> Result<SchemaInfo, GatewayError> {
        Ok(self.service.schema_info().await)
    }

    async fn catalogue(&self, _ctx: &RequestContext) -> Result<CatalogueReport, GatewayError> {
        Ok(self.service.catalogue().await)
    }

    async fn metrics(&self, _ctx: &RequestContext) -> Result<MetricsSnapshot, GatewayError> {
        Ok(self.service.metrics())
    }

    async fn upstream_health(
        &self,
        _ctx: &RequestContext,
    ) -> Result<UpstreamHealth, GatewayError> {
        Ok(self.service.upstream_health().await)
    }
}
