//! TMF Translation Gateway Implementation
//!
//! The gateway exposes a stable, TMF-style resource API and forwards to a
//! backend whose contract is described by an independently evolving OpenAPI
//! document. It provides:
//!
//! - Schema acquisition, caching, and conditional reload
//! - Declarative bidirectional field mapping per resource
//! - Structural payload validation derived from the live schema
//! - Upstream forwarding with bounded timeout, retry, and backoff
//! - A derived resource catalogue and request metrics
//!
//! ## Architecture
//!
//! ```text
//!        External request-router
//!                  │
//!                  ▼ TmfGatewayApi (tmfgw-sdk)
//! ┌──────────────────────────────────────┐
//! │          TmfGatewayClient            │
//! │                 │                    │
//! │                 ▼                    │
//! │  ┌────────────────────────────────┐  │
//! │  │        Domain Service          │  │
//! │  │  translate → validate →        │  │
//! │  │  forward → translate           │  │
//! │  └────────────────────────────────┘  │
//! │        │               │             │
//! │        ▼               ▼             │
//! │  ┌───────────┐   ┌───────────────┐   │
//! │  │SchemaStore│   │UpstreamGateway│   │
//! │  └───────────┘   └───────────────┘   │
//! └────────│───────────────│─────────────┘
//!          ▼               ▼
//!   schema URL/file    backend HTTP
//! ```
//!
//! ## Usage
//!
//! The public API is defined in `tmfgw-sdk` and re-exported here.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
// Failure modes are documented in prose on the SDK trait rather than in
// per-method # Errors sections.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

// === PUBLIC API (from SDK) ===
pub use tmfgw_sdk::{
    // Retry types
    BackoffStrategy,
    CallOptions,
    CatalogueEntry,
    CatalogueReport,
    CrudCapabilities,
    Direction,
    // Error types
    GatewayError,
    // Models
    HttpMethod,
    MetricsSnapshot,
    Problem,
    RequestContext,
    RetryPolicy,
    SchemaInfo,
    SchemaReloadReport,
    SchemaSnapshot,
    SchemaSource,
    // API trait
    TmfGatewayApi,
    TmfResponse,
    UpstreamHealth,
    UpstreamResponse,
    ValidationResult,
    Violation,
};

// === LOCAL CLIENT ===
pub mod local_client;
pub use local_client::TmfGatewayClient;

// === CONFIGURATION ===
pub mod config;
pub use config::GatewayConfig;

// === DOMAIN AND INFRASTRUCTURE ===
pub mod domain;
pub mod infra;
pub mod metrics;

pub use domain::{
    PayloadHook, PayloadValidator, ResourceMapping, Service, TranslatorRegistry,
};
pub use infra::{SchemaStore, UpstreamGateway};
pub use metrics::{MetricsSink, RequestOutcome};
