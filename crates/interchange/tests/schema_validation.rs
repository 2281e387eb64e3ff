//! Validates emitted wire documents against the formal JSON Schema at
//! schema/wire-schema.json.

use std::path::Path;

use arbor_core::{CanonicalPath, ParsingContext, StructuredData};
use arbor_interchange::{Entity, EntityPayload, Properties, Relationship};
use serde_json::json;

fn cp(s: &str) -> CanonicalPath {
    s.parse().unwrap()
}

fn wire_validator() -> jsonschema::Validator {
    let schema_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/wire-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

fn sample_entities() -> Vec<Entity> {
    let mut props = Properties::new();
    props.insert("owner".to_string(), json!("ops"));

    vec![
        Entity::new(cp("/t;acme"), EntityPayload::Tenant, props.clone()).unwrap(),
        Entity::new(cp("/t;acme/e;prod"), EntityPayload::Environment, props.clone()).unwrap(),
        Entity::new(cp("/t;acme/e;prod/f;agent-1"), EntityPayload::Feed, Properties::new())
            .unwrap(),
        Entity::from_json(
            &json!({"path": "/t;acme/mt;load", "unit": "PERCENTAGE", "dataKind": "GAUGE"}),
            &ParsingContext::new(),
        )
        .unwrap(),
        Entity::new(
            cp("/t;acme/e;prod/r;web"),
            EntityPayload::Resource {
                resource_type: cp("/t;acme/rt;server"),
            },
            Properties::new(),
        )
        .unwrap(),
        Entity::new(
            cp("/t;acme/e;prod/m;cpu"),
            EntityPayload::Metric {
                metric_type: cp("/t;acme/mt;load"),
            },
            Properties::new(),
        )
        .unwrap(),
        Entity::new(
            cp("/t;acme/e;prod/r;web/d;connectionConfiguration"),
            EntityPayload::DataEntity {
                value: StructuredData::map()
                    .put_string("host", "db.internal")
                    .unwrap()
                    .put_integral("port", 5432)
                    .unwrap()
                    .put_undefined("password")
                    .unwrap()
                    .build()
                    .unwrap(),
            },
            Properties::new(),
        )
        .unwrap(),
    ]
}

#[test]
fn emitted_entities_validate_against_the_schema() {
    let validator = wire_validator();
    let mut failures = Vec::new();

    for entity in sample_entities() {
        let wire = entity.to_json();
        if let Err(error) = validator.validate(&wire) {
            failures.push(format!("{}: {}", wire, error));
        }
    }

    assert!(failures.is_empty(), "schema violations:\n{}", failures.join("\n"));
}

#[test]
fn emitted_relationships_validate_against_the_schema() {
    let validator = wire_validator();

    let entities = sample_entities();
    let rel = Relationship::new(
        "rel-1",
        "contains",
        entities[0].clone(),
        entities[1].clone(),
        Properties::new(),
    );

    let wire = rel.to_json();
    validator
        .validate(&wire)
        .unwrap_or_else(|e| panic!("schema violation for {}: {}", wire, e));
}

#[test]
fn schema_rejects_malformed_records() {
    let validator = wire_validator();

    // Path not absolute.
    assert!(validator.validate(&json!({"path": "t;x", "properties": {}})).is_err());
    // Unknown unit.
    assert!(validator
        .validate(&json!({"path": "/t;t/mt;c", "properties": {}, "unit": "FURLONGS"}))
        .is_err());
    // Relationship missing its target.
    assert!(validator
        .validate(&json!({
            "id": "r", "name": "contains",
            "source": {"path": "/t;t", "properties": {}},
            "properties": {}
        }))
        .is_err());
}
