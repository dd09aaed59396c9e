//! Structural payload validation against the live schema snapshot.
//!
//! Resolution always succeeds: the resource's component schema when one
//! matches by name or title, else the first object-typed component schema,
//! else an unconstrained object. Validation collects every violation, ordered
//! by structural path, and never fails outward — malformed schema definitions
//! and internal errors collapse into a single descriptive violation.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::instrument;

use tmfgw_sdk::{Direction, SchemaSnapshot, ValidationResult, Violation};

use crate::infra::SchemaStore;

/// Validates payloads against schemas derived from the current snapshot.
pub struct PayloadValidator {
    store: Arc<SchemaStore>,
}

impl PayloadValidator {
    #[must_use]
    pub fn new(store: Arc<SchemaStore>) -> Self {
        Self { store }
    }

    /// Validate a payload for the given resource and direction.
    #[instrument(skip_all, fields(resource = %resource, direction = %direction))]
    pub async fn validate(
        &self,
        resource: &str,
        payload: &Value,
        direction: Direction,
    ) -> ValidationResult {
        let snapshot = self.store.get().await;
        validate_with_snapshot(&snapshot, resource, payload, direction)
    }
}

/// Validate against an already-resolved snapshot.
pub(crate) fn validate_with_snapshot(
    snapshot: &SchemaSnapshot,
    resource: &str,
    payload: &Value,
    direction: Direction,
) -> ValidationResult {
    let (schema, component_key) = resolve_component(snapshot, resource);

    // Internal references resolve against the full document, so referenced
    // component schemas are carried alongside the resolved schema.
    let document = match component_key {
        Some(key) => json!({
            "$ref": format!("#/components/schemas/{}", escape_pointer_token(&key)),
            "components": { "schemas": snapshot.component_schemas().cloned().unwrap_or_default() }
        }),
        None => schema,
    };
    let document = directional_adjustments(direction, document);

    let validator = match jsonschema::validator_for(&document) {
        Ok(validator) => validator,
        Err(error) => {
            return ValidationResult::failed(vec![Violation::new(
                String::new(),
                format!("Invalid schema for resource {resource}: {error}"),
            )]);
        }
    };

    let mut violations: Vec<Violation> = validator
        .iter_errors(payload)
        .map(|error| Violation::new(pointer_to_path(&error.instance_path().to_string()), error.to_string()))
        .collect();
    violations.sort_by(|a, b| a.path.cmp(&b.path));

    if violations.is_empty() {
        ValidationResult::ok()
    } else {
        ValidationResult::failed(violations)
    }
}

/// Find the schema to validate `resource` against.
///
/// Returns the component key when the schema came out of
/// `components.schemas`, so references can be resolved in context.
fn resolve_component(snapshot: &SchemaSnapshot, resource: &str) -> (Value, Option<String>) {
    let folded = resource.to_lowercase();

    if let Some(components) = snapshot.component_schemas() {
        for (name, spec) in components {
            let title = spec
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(name.as_str());
            if name.to_lowercase() == folded || title.to_lowercase() == folded {
                return (spec.clone(), Some(name.clone()));
            }
        }
        for (name, spec) in components {
            if spec.get("type").and_then(Value::as_str) == Some("object") {
                return (spec.clone(), Some(name.clone()));
            }
        }
    }

    (json!({ "type": "object" }), None)
}

/// Direction-specific relaxations (e.g. exempting write-only fields on read
/// responses). No rules exist yet; behaves as a no-op.
fn directional_adjustments(_direction: Direction, schema: Value) -> Value {
    schema
}

/// Render a JSON pointer as a `/`-joined structural path, empty at the root.
fn pointer_to_path(pointer: &str) -> String {
    pointer.trim_start_matches('/').to_owned()
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
