//! Infrastructure adapters: schema acquisition and upstream HTTP forwarding.

pub mod schema_store;
pub mod upstream;

pub use schema_store::SchemaStore;
pub use upstream::UpstreamGateway;
