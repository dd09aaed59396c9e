//! Bidirectional field mapping between TMF and native payloads.
//!
//! All resource-specific knowledge lives here: declarative rename rules per
//! resource and direction, plus a small closed set of named post-processing
//! hooks. Unregistered resources translate as identity pass-through.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value, json};

/// Named post-processing transforms, bound per resource and per direction.
///
/// A closed set rather than stored callables: each variant is one well-known
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadHook {
    /// Normalize an `id` property to its string representation.
    IdentifierToString,
    /// Drop properties whose value is `null`.
    DropNullFields,
}

impl PayloadHook {
    fn apply(self, object: &mut Map<String, Value>) {
        match self {
            Self::IdentifierToString => {
                if let Some(id) = object.get_mut("id") {
                    if !id.is_string() && !id.is_null() {
                        *id = Value::String(id.to_string());
                    }
                }
            }
            Self::DropNullFields => {
                object.retain(|_, value| !value.is_null());
            }
        }
    }
}

/// Declarative, bidirectional rename rules for one resource.
///
/// Immutable after registration. Keys absent from a map pass through
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct ResourceMapping {
    resource: String,
    request_map: BTreeMap<String, String>,
    response_map: BTreeMap<String, String>,
    query_map: BTreeMap<String, String>,
    request_hook: Option<PayloadHook>,
    response_hook: Option<PayloadHook>,
}

impl ResourceMapping {
    /// Start a mapping for the given resource name.
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Self::default()
        }
    }

    /// Rename a TMF request field to its native name.
    #[must_use]
    pub fn request_field(mut self, tmf: impl Into<String>, native: impl Into<String>) -> Self {
        self.request_map.insert(tmf.into(), native.into());
        self
    }

    /// Rename a native response field to its TMF name.
    #[must_use]
    pub fn response_field(mut self, native: impl Into<String>, tmf: impl Into<String>) -> Self {
        self.response_map.insert(native.into(), tmf.into());
        self
    }

    /// Rename a TMF query parameter to its native name.
    #[must_use]
    pub fn query_field(mut self, tmf: impl Into<String>, native: impl Into<String>) -> Self {
        self.query_map.insert(tmf.into(), native.into());
        self
    }

    /// Attach a hook applied after request renaming.
    #[must_use]
    pub fn with_request_hook(mut self, hook: PayloadHook) -> Self {
        self.request_hook = Some(hook);
        self
    }

    /// Attach a hook applied after response renaming.
    #[must_use]
    pub fn with_response_hook(mut self, hook: PayloadHook) -> Self {
        self.response_hook = Some(hook);
        self
    }

    /// The resource name this mapping was registered under.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

/// Registry of resource mappings, keyed case-insensitively.
#[derive(Debug, Default)]
pub struct TranslatorRegistry {
    mappings: HashMap<String, ResourceMapping>,
}

impl TranslatorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping; later registrations for the same resource win.
    pub fn register(&mut self, mapping: ResourceMapping) {
        self.mappings
            .insert(mapping.resource.to_lowercase(), mapping);
    }

    fn mapping(&self, resource: &str) -> Option<&ResourceMapping> {
        self.mappings.get(&resource.to_lowercase())
    }

    /// Translate a TMF request payload into the native format.
    ///
    /// Objects are renamed per the resource's request map (unknown keys pass
    /// through unchanged) and then run through the request hook; any other
    /// payload shape is preserved as-is.
    #[must_use]
    pub fn to_native(&self, resource: &str, payload: &Value) -> Value {
        let Some(mapping) = self.mapping(resource) else {
            return payload.clone();
        };
        match payload {
            Value::Object(object) => Value::Object(rename_object(
                object,
                &mapping.request_map,
                mapping.request_hook,
            )),
            other => other.clone(),
        }
    }

    /// Translate a native response payload into the TMF envelope.
    ///
    /// Sequences map each object element independently and wrap as
    /// `{"data": [...]}`; objects rename, run the response hook, and wrap as
    /// `{"data": {...}}`; anything else wraps as `{"data": {"value": ...}}`.
    #[must_use]
    pub fn to_external(&self, resource: &str, payload: Value) -> Value {
        let mapping = self.mapping(resource);
        match payload {
            Value::Array(items) => {
                let mapped: Vec<Value> = items
                    .into_iter()
                    .map(|item| match (item, mapping) {
                        (Value::Object(object), Some(m)) => Value::Object(rename_object(
                            &object,
                            &m.response_map,
                            m.response_hook,
                        )),
                        (other, _) => other,
                    })
                    .collect();
                json!({ "data": mapped })
            }
            Value::Object(object) => {
                let mapped = match mapping {
                    Some(m) => rename_object(&object, &m.response_map, m.response_hook),
                    None => object,
                };
                json!({ "data": mapped })
            }
            other => json!({ "data": { "value": other } }),
        }
    }

    /// Translate TMF query parameters into native ones, pass-through by
    /// default.
    #[must_use]
    pub fn map_query_params(
        &self,
        resource: &str,
        params: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let Some(mapping) = self.mapping(resource) else {
            return params.clone();
        };
        params
            .iter()
            .map(|(key, value)| {
                let native = mapping.query_map.get(key).unwrap_or(key);
                (native.clone(), value.clone())
            })
            .collect()
    }
}

fn rename_object(
    object: &Map<String, Value>,
    field_map: &BTreeMap<String, String>,
    hook: Option<PayloadHook>,
) -> Map<String, Value> {
    let mut renamed: Map<String, Value> = object
        .iter()
        .map(|(key, value)| {
            let name = field_map.get(key).unwrap_or(key);
            (name.clone(), value.clone())
        })
        .collect();
    if let Some(hook) = hook {
        hook.apply(&mut renamed);
    }
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_product() -> TranslatorRegistry {
        let mut registry = TranslatorRegistry::new();
        registry.register(
            ResourceMapping::new("Product")
                .request_field("name", "product_name")
                .request_field("category", "category_code")
                .response_field("product_name", "name")
                .response_field("category_code", "category")
                .query_field("offset", "start")
                .with_response_hook(PayloadHook::IdentifierToString),
        );
        registry
    }

    #[test]
    fn renames_request_fields_and_passes_unknown_keys() {
        let registry = registry_with_product();
        let native = registry.to_native(
            "product",
            &json!({"name": "Widget", "category": "tools", "color": "red"}),
        );
        assert_eq!(
            native,
            json!({"product_name": "Widget", "category_code": "tools", "color": "red"})
        );
    }

    #[test]
    fn mapped_fields_round_trip() {
        let registry = registry_with_product();
        let original = json!({"name": "Widget", "category": "tools"});
        let native = registry.to_native("Product", &original);
        let external = registry.to_external("Product", native);
        assert_eq!(external, json!({"data": original}));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = registry_with_product();
        let a = registry.to_native("PRODUCT", &json!({"name": "x"}));
        let b = registry.to_native("product", &json!({"name": "x"}));
        assert_eq!(a, b);
        assert_eq!(a, json!({"product_name": "x"}));
    }

    #[test]
    fn unregistered_resource_is_identity_with_envelope() {
        let registry = TranslatorRegistry::new();
        let payload = json!({"anything": [1, 2, 3]});
        assert_eq!(registry.to_native("unknown", &payload), payload);
        assert_eq!(
            registry.to_external("unknown", payload.clone()),
            json!({"data": payload})
        );
    }

    #[test]
    fn sequences_map_each_object_element() {
        let registry = registry_with_product();
        let external = registry.to_external(
            "product",
            json!([{"product_name": "A"}, {"product_name": "B"}, 7]),
        );
        assert_eq!(
            external,
            json!({"data": [{"name": "A"}, {"name": "B"}, 7]})
        );
    }

    #[test]
    fn scalars_wrap_under_value() {
        let registry = TranslatorRegistry::new();
        assert_eq!(
            registry.to_external("product", json!("gone")),
            json!({"data": {"value": "gone"}})
        );
    }

    #[test]
    fn query_params_rename_with_pass_through() {
        let registry = registry_with_product();
        let mut params = BTreeMap::new();
        params.insert("offset".to_owned(), "10".to_owned());
        params.insert("limit".to_owned(), "5".to_owned());

        let mapped = registry.map_query_params("product", &params);
        assert_eq!(mapped.get("start").map(String::as_str), Some("10"));
        assert_eq!(mapped.get("limit").map(String::as_str), Some("5"));
        assert!(!mapped.contains_key("offset"));
    }

    #[test]
    fn identifier_hook_normalizes_numeric_ids() {
        let registry = registry_with_product();
        let external = registry.to_external("product", json!({"id": 42, "product_name": "A"}));
        assert_eq!(external, json!({"data": {"id": "42", "name": "A"}}));
    }

    #[test]
    fn drop_null_fields_hook() {
        let mut registry = TranslatorRegistry::new();
        registry.register(
            ResourceMapping::new("order").with_request_hook(PayloadHook::DropNullFields),
        );
        let native = registry.to_native("order", &json!({"a": 1, "b": null}));
        assert_eq!(native, json!({"a": 1}));
    }
}
