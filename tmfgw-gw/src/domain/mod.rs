//! Domain layer: translation, validation, catalogue, and orchestration.

pub mod catalogue;
pub mod error;
pub mod service;
pub mod translate;
pub mod validate;

pub use catalogue::CatalogueBuilder;
pub use error::DomainError;
pub use service::Service;
pub use translate::{PayloadHook, ResourceMapping, TranslatorRegistry};
pub use validate::PayloadValidator;
