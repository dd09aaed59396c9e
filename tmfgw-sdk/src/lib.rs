//! TMF Gateway SDK
//!
//! This crate provides the public API contract for the TMF translation
//! gateway: the [`TmfGatewayApi`] trait, transport-agnostic domain models,
//! the [`GatewayError`] taxonomy, and retry/backoff types.
//!
//! ## Usage
//!
//! ```ignore
//! use tmfgw_sdk::{RequestContext, TmfGatewayApi};
//!
//! let ctx = RequestContext::new();
//! let response = client.read(&ctx, "product", "42", CallOptions::default()).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
// Failure modes are documented in prose rather than per-method # Errors
// sections.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod error;
pub mod models;
pub mod retry;

// API trait
pub use api::TmfGatewayApi;

// Error types
pub use error::{GatewayError, Problem};

// Models
pub use models::{
    AttributeSpec, CallOptions, CatalogueEntry, CatalogueReport, CrudCapabilities, Direction,
    HttpMethod, LatencySnapshot, MetricsSnapshot, RequestContext, SchemaInfo, SchemaProvenance,
    SchemaReloadReport, SchemaSnapshot, SchemaSource, TmfResponse, UpstreamHealth,
    UpstreamResponse, ValidationResult, Violation,
};

// Retry types
pub use retry::{BackoffStrategy, RetryPolicy};
