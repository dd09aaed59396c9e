//! Domain service for the gateway.
//!
//! Orchestrates the translation pipeline for every inbound operation:
//! decode → translate to native (optionally validate) → forward → translate
//! to TMF (optionally validate) → encode, recording one metrics update per
//! request.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use tmfgw_sdk::{
    CallOptions, CatalogueReport, Direction, GatewayError, HttpMethod, MetricsSnapshot,
    RequestContext, SchemaInfo, SchemaReloadReport, TmfResponse, UpstreamHealth, ValidationResult,
};

use super::catalogue::CatalogueBuilder;
use super::error::DomainError;
use super::translate::TranslatorRegistry;
use super::validate::PayloadValidator;
use crate::config::GatewayConfig;
use crate::infra::{SchemaStore, UpstreamGateway};
use crate::metrics::{MetricsSink, RequestOutcome};

/// Domain service wiring all gateway components together.
///
/// Constructed once at startup; the schema store and metrics sink are the
/// only shared mutable state, each guarded by its own lock.
pub struct Service {
    schema_store: Arc<SchemaStore>,
    translator: TranslatorRegistry,
    validator: PayloadValidator,
    upstream: UpstreamGateway,
    catalogue: CatalogueBuilder,
    metrics: Arc<MetricsSink>,
    validate_requests: bool,
    validate_responses: bool,
}

impl Service {
    /// Build the service from configuration and a translator registry.
    #[must_use]
    pub fn new(config: &GatewayConfig, translator: TranslatorRegistry) -> Self {
        let schema_store = Arc::new(SchemaStore::new(config));
        Self {
            validator: PayloadValidator::new(Arc::clone(&schema_store)),
            catalogue: CatalogueBuilder::new(Arc::clone(&schema_store)),
            upstream: UpstreamGateway::new(config),
            metrics: Arc::new(MetricsSink::new()),
            schema_store,
            translator,
            validate_requests: config.validate_requests,
            validate_responses: config.validate_responses,
        }
    }

    /// The metrics sink, shared with any host that records its own signals.
    #[must_use]
    pub fn metrics_sink(&self) -> Arc<MetricsSink> {
        Arc::clone(&self.metrics)
    }

    // === Collection operations ===

    /// List a resource collection.
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id, resource = %resource))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        resource: &str,
        query: BTreeMap<String, String>,
        opts: CallOptions,
    ) -> Result<TmfResponse, DomainError> {
        let path = format!("/{resource}");
        self.run_pipeline(resource, HttpMethod::Get, &path, Some(query), None, &opts, true)
            .await
    }

    /// Create a resource from a TMF payload.
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id, resource = %resource))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        resource: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, DomainError> {
        let path = format!("/{resource}");
        self.run_pipeline(
            resource,
            HttpMethod::Post,
            &path,
            None,
            Some(payload),
            &opts,
            true,
        )
        .await
    }

    // === Item operations ===

    /// Read one resource item.
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id, resource = %resource, id = %id))]
    pub async fn read(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        opts: CallOptions,
    ) -> Result<TmfResponse, DomainError> {
        let path = format!("/{resource}/{id}");
        self.run_pipeline(resource, HttpMethod::Get, &path, None, None, &opts, true)
            .await
    }

    /// Partially update one resource item.
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id, resource = %resource, id = %id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, DomainError> {
        let path = format!("/{resource}/{id}");
        self.run_pipeline(
            resource,
            HttpMethod::Patch,
            &path,
            None,
            Some(payload),
            &opts,
            true,
        )
        .await
    }

    /// Replace one resource item.
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id, resource = %resource, id = %id))]
    pub async fn replace(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        payload: Value,
        opts: CallOptions,
    ) -> Result<TmfResponse, DomainError> {
        let path = format!("/{resource}/{id}");
        self.run_pipeline(
            resource,
            HttpMethod::Put,
            &path,
            None,
            Some(payload),
            &opts,
            true,
        )
        .await
    }

    /// Delete one resource item. Responses are wrapped but not validated.
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id, resource = %resource, id = %id))]
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        resource: &str,
        id: &str,
        opts: CallOptions,
    ) -> Result<TmfResponse, DomainError> {
        let path = format!("/{resource}/{id}");
        self.run_pipeline(resource, HttpMethod::Delete, &path, None, None, &opts, false)
            .await
    }

    // === Validation ===

    /// Validate a payload without forwarding it. Never fails on invalid
    /// input; the outcome is the returned result.
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id, resource = %resource, direction = %direction))]
    pub async fn validate(
        &self,
        ctx: &RequestContext,
        resource: &str,
        payload: &Value,
        direction: Direction,
    ) -> ValidationResult {
        self.validator.validate(resource, payload, direction).await
    }

    // === Administration ===

    /// Reload the schema, reusing conditional-cache headers.
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id))]
    pub async fn reload_schema(&self, ctx: &RequestContext) -> SchemaReloadReport {
        let snapshot = self.schema_store.reload().await;
        tracing::info!(source = %snapshot.source, "schema reloaded");
        SchemaReloadReport {
            source: snapshot.source.to_string(),
            openapi: snapshot.openapi_version().map(ToOwned::to_owned),
        }
    }

    /// Describe the active schema source.
    pub async fn schema_info(&self) -> SchemaInfo {
        self.schema_store.source_info().await
    }

    /// Generate the derived catalogue.
    pub async fn catalogue(&self) -> CatalogueReport {
        self.catalogue.generate().await
    }

    /// Read the metrics aggregate.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Probe the backend once, best-effort.
    pub async fn upstream_health(&self) -> UpstreamHealth {
        self.upstream.health().await
    }

    // === Pipeline ===

    /// Run the translate → validate → forward → translate pipeline.
    #[allow(clippy::too_many_arguments)]
    async fn run_pipeline(
        &self,
        resource: &str,
        method: HttpMethod,
        path: &str,
        query: Option<BTreeMap<String, String>>,
        payload: Option<Value>,
        opts: &CallOptions,
        validate_response_allowed: bool,
    ) -> Result<TmfResponse, DomainError> {
        let start = std::time::Instant::now();

        // Pre-validation on the TMF request payload.
        if let Some(tmf_payload) = &payload {
            if opts.validate_requests.unwrap_or(self.validate_requests) {
                let result = self
                    .validator
                    .validate(resource, tmf_payload, Direction::TmfToNative)
                    .await;
                if !result.valid {
                    self.record(start, RequestOutcome {
                        validation_failure: true,
                        ..RequestOutcome::default()
                    });
                    return Err(DomainError::request_validation(resource, result.violations));
                }
            }
        }

        // Translate the request side.
        let native_payload = payload.map(|p| self.translator.to_native(resource, &p));
        let native_query = query.map(|q| self.translator.map_query_params(resource, &q));

        // Forward to the backend.
        let forwarded = self
            .upstream
            .forward(
                method,
                path,
                native_query.as_ref(),
                native_payload.as_ref(),
                &opts.headers,
            )
            .await;
        let response = match forwarded {
            Ok(response) => response,
            Err(GatewayError::UpstreamUnavailable { message }) => {
                self.record(start, RequestOutcome {
                    upstream_error: true,
                    ..RequestOutcome::default()
                });
                return Err(DomainError::UpstreamUnavailable { message });
            }
            Err(other) => {
                self.record(start, RequestOutcome {
                    upstream_error: true,
                    ..RequestOutcome::default()
                });
                return Err(DomainError::Internal(anyhow::anyhow!("{other}")));
            }
        };

        // Translate the response side and wrap the TMF envelope.
        let tmf_body = self.translator.to_external(resource, response.body);

        // Post-validation on the unwrapped TMF data.
        if validate_response_allowed
            && opts.validate_responses.unwrap_or(self.validate_responses)
        {
            let data = tmf_body.get("data").cloned().unwrap_or(Value::Null);
            let result = self
                .validator
                .validate(resource, &data, Direction::NativeToTmf)
                .await;
            if !result.valid {
                self.record(start, RequestOutcome {
                    validation_failure: true,
                    ..RequestOutcome::default()
                });
                return Err(DomainError::ResponseValidationFailed {
                    resource: resource.to_owned(),
                    upstream_status: response.status_code,
                });
            }
        }

        self.record(start, RequestOutcome::default());
        Ok(TmfResponse {
            body: tmf_body,
            status_code: response.status_code,
        })
    }

    fn record(&self, start: std::time::Instant, outcome: RequestOutcome) {
        // Duration in ms is always small enough for u64 in practice
        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = start.elapsed().as_millis() as u64;
        self.metrics.record_request(outcome, elapsed_ms);
    }
}
