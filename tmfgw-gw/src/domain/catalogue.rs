//! Derived resource catalogue.
//!
//! A read-only view over the schema snapshot: resource metadata plus
//! best-effort CRUD capability flags. Capability inference is a deliberate
//! approximation built on substring/prefix matching over path strings — it
//! may over- or under-match and must not be tightened to exact REST
//! semantics, since that changes observable catalogue output.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::instrument;

use tmfgw_sdk::{
    AttributeSpec, CatalogueEntry, CatalogueReport, CrudCapabilities, SchemaProvenance,
    SchemaSnapshot,
};

use crate::infra::SchemaStore;

/// Builds the catalogue from the current schema snapshot.
pub struct CatalogueBuilder {
    store: Arc<SchemaStore>,
}

impl CatalogueBuilder {
    #[must_use]
    pub fn new(store: Arc<SchemaStore>) -> Self {
        Self { store }
    }

    /// Generate the catalogue report.
    #[instrument(skip(self))]
    pub async fn generate(&self) -> CatalogueReport {
        let snapshot = self.store.get().await;
        generate_from_snapshot(&snapshot)
    }
}

pub(crate) fn generate_from_snapshot(snapshot: &SchemaSnapshot) -> CatalogueReport {
    let mut catalogue = Vec::new();

    if let Some(components) = snapshot.component_schemas() {
        for (name, spec) in components {
            if spec.get("type").and_then(Value::as_str) != Some("object") {
                continue;
            }
            catalogue.push(entry_for(name, spec, snapshot));
        }
    }

    CatalogueReport {
        catalogue,
        generated_from_schema: SchemaProvenance {
            openapi: snapshot.openapi_version().map(ToOwned::to_owned),
            generated_at: Utc::now(),
        },
    }
}

fn entry_for(name: &str, spec: &Value, snapshot: &SchemaSnapshot) -> CatalogueEntry {
    let required: Vec<&str> = spec
        .get("required")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut attributes = Vec::new();
    let mut key_attributes = Vec::new();
    if let Some(properties) = spec.get("properties").and_then(Value::as_object) {
        for (prop_name, prop_spec) in properties {
            attributes.push(AttributeSpec {
                name: prop_name.clone(),
                type_name: attribute_type(prop_spec),
                required: required.contains(&prop_name.as_str()),
            });
            if is_identifier(prop_name) || required.contains(&prop_name.as_str()) {
                key_attributes.push(prop_name.clone());
            }
        }
    }

    CatalogueEntry {
        resource: name.to_owned(),
        description: spec
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        key_attributes,
        attributes,
        capabilities: infer_capabilities(name, snapshot),
    }
}

/// Attribute type: declared `type`, else the raw `$ref` target, else
/// `object`.
fn attribute_type(prop_spec: &Value) -> String {
    prop_spec
        .get("type")
        .and_then(Value::as_str)
        .or_else(|| prop_spec.get("$ref").and_then(Value::as_str))
        .unwrap_or("object")
        .to_owned()
}

fn is_identifier(name: &str) -> bool {
    let folded = name.to_lowercase();
    folded == "id" || folded == "uuid" || folded.ends_with("_id") || name.ends_with("Id")
}

/// Union HTTP methods observed on heuristically matched path entries into
/// capability flags.
fn infer_capabilities(resource: &str, snapshot: &SchemaSnapshot) -> CrudCapabilities {
    let mut capabilities = CrudCapabilities::default();
    let Some(paths) = snapshot.paths() else {
        return capabilities;
    };

    let folded = resource.to_lowercase();
    let mut candidates = vec![folded.clone(), format!("{folded}s")];
    if let Some(singular) = folded.strip_suffix('s') {
        candidates.push(singular.to_owned());
    }

    for (path, item) in paths {
        let path_folded = path.to_lowercase();
        let matched = path_folded.contains(&folded)
            || candidates
                .iter()
                .any(|candidate| path_folded.starts_with(&format!("/{candidate}")));
        if !matched {
            continue;
        }

        let Some(operations) = item.as_object() else {
            continue;
        };
        for method in operations.keys() {
            match method.to_lowercase().as_str() {
                "get" => capabilities.can_read = true,
                "post" => capabilities.can_create = true,
                "put" | "patch" => capabilities.can_update = true,
                "delete" => capabilities.can_delete = true,
                _ => {}
            }
        }
    }

    capabilities
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use tmfgw_sdk::SchemaSource;

    fn snapshot_with(document: Value) -> SchemaSnapshot {
        SchemaSnapshot {
            document,
            source: SchemaSource::Empty,
            etag: None,
            last_modified: None,
            loaded_at: Utc::now(),
        }
    }

    fn inventory_document() -> Value {
        json!({
            "openapi": "3.0.0",
            "paths": {
                "/products": { "get": {}, "post": {} },
                "/products/{id}": { "get": {}, "patch": {}, "delete": {} },
                "/orders": { "get": {} }
            },
            "components": { "schemas": {
                "Product": {
                    "type": "object",
                    "description": "A sellable product",
                    "required": ["sku"],
                    "properties": {
                        "id": { "type": "string" },
                        "sku": { "type": "string" },
                        "price": { "type": "number" },
                        "category": { "$ref": "#/components/schemas/Category" }
                    }
                },
                "Category": { "type": "string" },
                "Order": {
                    "type": "object",
                    "properties": { "order_id": { "type": "string" } }
                }
            }}
        })
    }

    #[test]
    fn only_object_schemas_are_catalogued() {
        let report = generate_from_snapshot(&snapshot_with(inventory_document()));
        let names: Vec<&str> = report
            .catalogue
            .iter()
            .map(|e| e.resource.as_str())
            .collect();
        assert!(names.contains(&"Product"));
        assert!(names.contains(&"Order"));
        assert!(!names.contains(&"Category"));
    }

    #[test]
    fn key_attributes_are_identifiers_and_required_properties() {
        let report = generate_from_snapshot(&snapshot_with(inventory_document()));
        let product = report
            .catalogue
            .iter()
            .find(|e| e.resource == "Product")
            .unwrap();
        assert_eq!(product.key_attributes, vec!["id", "sku"]);
        assert_eq!(product.description, "A sellable product");

        let order = report
            .catalogue
            .iter()
            .find(|e| e.resource == "Order")
            .unwrap();
        assert_eq!(order.key_attributes, vec!["order_id"]);
    }

    #[test]
    fn attribute_types_fall_back_to_ref_target() {
        let report = generate_from_snapshot(&snapshot_with(inventory_document()));
        let product = report
            .catalogue
            .iter()
            .find(|e| e.resource == "Product")
            .unwrap();
        let category = product
            .attributes
            .iter()
            .find(|a| a.name == "category")
            .unwrap();
        assert_eq!(category.type_name, "#/components/schemas/Category");
        let sku = product.attributes.iter().find(|a| a.name == "sku").unwrap();
        assert!(sku.required);
    }

    #[test]
    fn capabilities_union_methods_from_matching_paths() {
        let report = generate_from_snapshot(&snapshot_with(inventory_document()));
        let product = report
            .catalogue
            .iter()
            .find(|e| e.resource == "Product")
            .unwrap();
        assert!(product.capabilities.can_create);
        assert!(product.capabilities.can_read);
        assert!(product.capabilities.can_update);
        assert!(product.capabilities.can_delete);

        let order = report
            .catalogue
            .iter()
            .find(|e| e.resource == "Order")
            .unwrap();
        assert!(order.capabilities.can_read);
        assert!(!order.capabilities.can_create);
    }

    #[test]
    fn unmatched_resource_gets_no_capabilities() {
        let report = generate_from_snapshot(&snapshot_with(json!({
            "openapi": "3.0.0",
            "paths": { "/widgets": { "get": {} } },
            "components": { "schemas": {
                "Shipment": { "type": "object", "properties": {} }
            }}
        })));
        let shipment = &report.catalogue[0];
        assert!(!shipment.capabilities.can_read);
    }

    #[test]
    fn empty_document_yields_empty_catalogue() {
        let report = generate_from_snapshot(&snapshot_with(
            json!({"openapi": "3.0.0", "paths": {}, "components": {}}),
        ));
        assert!(report.catalogue.is_empty());
        assert_eq!(report.generated_from_schema.openapi.as_deref(), Some("3.0.0"));
    }
}
