//! Entity and relationship wire records.
//!
//! One [`Entity`] value covers every inventory kind: the kind lives in
//! the path's leaf segment and a closed [`EntityPayload`] carries the
//! few kind-specific fields, so consumers handle kinds exhaustively
//! instead of dispatching over an open class hierarchy.
//!
//! Reading a record needs the [`ParsingContext`] matching its position
//! in the object graph, because embedded path fields may arrive in
//! reduced form. Writing offers both the fully-typed canonical form
//! and a context-reduced form.

use std::collections::{BTreeMap, BTreeSet};

use arbor_core::{CanonicalPath, EntityType, ParsingContext, StructuredData};

use crate::codec::{data_from_json, data_to_json};
use crate::error::WireError;

/// Open property mapping carried by entities and relationships.
pub type Properties = BTreeMap<String, serde_json::Value>;

// ──────────────────────────────────────────────
// Metric type vocabulary
// ──────────────────────────────────────────────

/// Measurement unit of a metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    None,
    Percentage,
    Bytes,
    Milliseconds,
    Seconds,
}

impl MetricUnit {
    pub fn as_wire(self) -> &'static str {
        match self {
            MetricUnit::None => "NONE",
            MetricUnit::Percentage => "PERCENTAGE",
            MetricUnit::Bytes => "BYTES",
            MetricUnit::Milliseconds => "MILLISECONDS",
            MetricUnit::Seconds => "SECONDS",
        }
    }

    pub fn from_wire(s: &str) -> Result<MetricUnit, WireError> {
        match s {
            "NONE" => Ok(MetricUnit::None),
            "PERCENTAGE" => Ok(MetricUnit::Percentage),
            "BYTES" => Ok(MetricUnit::Bytes),
            "MILLISECONDS" => Ok(MetricUnit::Milliseconds),
            "SECONDS" => Ok(MetricUnit::Seconds),
            other => Err(WireError::UnknownName {
                what: "metric unit",
                value: other.to_string(),
            }),
        }
    }
}

/// Kind of data a metric type produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDataKind {
    Gauge,
    Availability,
    Counter,
}

impl MetricDataKind {
    pub fn as_wire(self) -> &'static str {
        match self {
            MetricDataKind::Gauge => "GAUGE",
            MetricDataKind::Availability => "AVAILABILITY",
            MetricDataKind::Counter => "COUNTER",
        }
    }

    pub fn from_wire(s: &str) -> Result<MetricDataKind, WireError> {
        match s {
            "GAUGE" => Ok(MetricDataKind::Gauge),
            "AVAILABILITY" => Ok(MetricDataKind::Availability),
            "COUNTER" => Ok(MetricDataKind::Counter),
            other => Err(WireError::UnknownName {
                what: "metric data kind",
                value: other.to_string(),
            }),
        }
    }
}

// ──────────────────────────────────────────────
// Entity
// ──────────────────────────────────────────────

/// Kind-specific part of an entity record. The variant always agrees
/// with the kind addressed by the entity's path.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityPayload {
    Tenant,
    Environment,
    Feed,
    ResourceType,
    OperationType,
    MetricType {
        unit: MetricUnit,
        data_kind: MetricDataKind,
    },
    /// References the resource's type by path.
    Resource { resource_type: CanonicalPath },
    /// References the metric's type by path.
    Metric { metric_type: CanonicalPath },
    /// The configuration blob itself; the role is the path's leaf id.
    DataEntity { value: StructuredData },
}

impl EntityPayload {
    pub fn kind(&self) -> EntityType {
        match self {
            EntityPayload::Tenant => EntityType::Tenant,
            EntityPayload::Environment => EntityType::Environment,
            EntityPayload::Feed => EntityType::Feed,
            EntityPayload::ResourceType => EntityType::ResourceType,
            EntityPayload::OperationType => EntityType::OperationType,
            EntityPayload::MetricType { .. } => EntityType::MetricType,
            EntityPayload::Resource { .. } => EntityType::Resource,
            EntityPayload::Metric { .. } => EntityType::Metric,
            EntityPayload::DataEntity { .. } => EntityType::DataEntity,
        }
    }
}

/// One inventory entity as it travels on the wire: its canonical
/// address, an open property map, and the kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    path: CanonicalPath,
    payload: EntityPayload,
    properties: Properties,
}

impl Entity {
    /// Assemble an entity, checking that the payload variant agrees
    /// with the kind the path addresses.
    pub fn new(
        path: CanonicalPath,
        payload: EntityPayload,
        properties: Properties,
    ) -> Result<Entity, WireError> {
        if payload.kind() != path.kind() {
            return Err(WireError::KindMismatch {
                path_kind: path.kind().name(),
                payload_kind: payload.kind().name(),
            });
        }
        Ok(Entity {
            path,
            payload,
            properties,
        })
    }

    pub fn path(&self) -> &CanonicalPath {
        &self.path
    }

    pub fn kind(&self) -> EntityType {
        self.path.kind()
    }

    pub fn id(&self) -> &str {
        self.path.leaf_id()
    }

    pub fn payload(&self) -> &EntityPayload {
        &self.payload
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Wire form with the fully-typed canonical path.
    pub fn to_json(&self) -> serde_json::Value {
        self.render(self.path.to_canonical_string())
    }

    /// Wire form with the path reduced under `ctx`, for embedding in a
    /// document whose position already implies the prefix and kind.
    pub fn to_json_reduced(&self, ctx: &ParsingContext) -> serde_json::Value {
        self.render(self.path.to_partially_typed_string(ctx))
    }

    fn render(&self, path: String) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert("path".to_string(), serde_json::Value::String(path));
        obj.insert(
            "properties".to_string(),
            serde_json::Value::Object(self.properties.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        );
        match &self.payload {
            EntityPayload::MetricType { unit, data_kind } => {
                obj.insert("unit".to_string(), serde_json::json!(unit.as_wire()));
                obj.insert(
                    "dataKind".to_string(),
                    serde_json::json!(data_kind.as_wire()),
                );
            }
            EntityPayload::Resource { resource_type } => {
                obj.insert(
                    "resourceType".to_string(),
                    serde_json::json!(resource_type.to_canonical_string()),
                );
            }
            EntityPayload::Metric { metric_type } => {
                obj.insert(
                    "metricType".to_string(),
                    serde_json::json!(metric_type.to_canonical_string()),
                );
            }
            EntityPayload::DataEntity { value } => {
                obj.insert("value".to_string(), data_to_json(value));
            }
            EntityPayload::Tenant
            | EntityPayload::Environment
            | EntityPayload::Feed
            | EntityPayload::ResourceType
            | EntityPayload::OperationType => {}
        }
        serde_json::Value::Object(obj)
    }

    /// Read an entity record. The path field may be partially typed;
    /// `ctx` supplies the prefix and expected kind implied by the
    /// record's position in the enclosing document.
    pub fn from_json(value: &serde_json::Value, ctx: &ParsingContext) -> Result<Entity, WireError> {
        let obj = value
            .as_object()
            .ok_or_else(|| WireError::field_type("entity", "an object"))?;

        let path_str = get_str(obj, "path")?;
        let path = CanonicalPath::from_partially_untyped(path_str, ctx)
            .map_err(|e| WireError::bad_path("path", e))?;

        let properties = match obj.get("properties") {
            None => Properties::new(),
            Some(serde_json::Value::Object(props)) => {
                props.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            Some(_) => return Err(WireError::field_type("properties", "an object")),
        };

        // Reference fields resolve against the entity's own tenant.
        let tenant = CanonicalPath::of_tenant(
            path.segments()[0].id.clone(),
        );

        let payload = match path.kind() {
            EntityType::Tenant => EntityPayload::Tenant,
            EntityType::Environment => EntityPayload::Environment,
            EntityType::Feed => EntityPayload::Feed,
            EntityType::ResourceType => EntityPayload::ResourceType,
            EntityType::OperationType => EntityPayload::OperationType,
            EntityType::MetricType => {
                let unit = MetricUnit::from_wire(get_str(obj, "unit")?)?;
                // Older documents omit the data kind.
                let data_kind = match obj.get("dataKind") {
                    None => MetricDataKind::Gauge,
                    Some(v) => MetricDataKind::from_wire(v.as_str().ok_or_else(|| {
                        WireError::field_type("dataKind", "a string")
                    })?)?,
                };
                EntityPayload::MetricType { unit, data_kind }
            }
            EntityType::Resource => {
                let type_ctx = ParsingContext::new()
                    .canonical_origin(tenant)
                    .expected_leaf(EntityType::ResourceType);
                let resource_type =
                    CanonicalPath::from_partially_untyped(get_str(obj, "resourceType")?, &type_ctx)
                        .map_err(|e| WireError::bad_path("resourceType", e))?;
                EntityPayload::Resource { resource_type }
            }
            EntityType::Metric => {
                let type_ctx = ParsingContext::new()
                    .canonical_origin(tenant)
                    .expected_leaf(EntityType::MetricType);
                let metric_type =
                    CanonicalPath::from_partially_untyped(get_str(obj, "metricType")?, &type_ctx)
                        .map_err(|e| WireError::bad_path("metricType", e))?;
                EntityPayload::Metric { metric_type }
            }
            EntityType::DataEntity => {
                let raw = obj.get("value").ok_or_else(|| WireError::missing("value"))?;
                EntityPayload::DataEntity {
                    value: data_from_json(raw)?,
                }
            }
        };

        Entity::new(path, payload, properties)
    }
}

// ──────────────────────────────────────────────
// Relationship
// ──────────────────────────────────────────────

/// A named edge between two entities. Multiple relationships of the
/// same name may exist between the same pair, hence the id.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    id: String,
    name: String,
    source: Entity,
    target: Entity,
    properties: Properties,
}

/// A sparse property patch: keys to set, keys to drop. Applying one
/// never mutates the patched relationship.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Properties,
    remove: BTreeSet<String>,
}

impl Update {
    pub fn new() -> Update {
        Update::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: serde_json::Value) -> Update {
        self.set.insert(key.into(), value);
        self
    }

    pub fn remove(mut self, key: impl Into<String>) -> Update {
        self.remove.insert(key.into());
        self
    }
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source: Entity,
        target: Entity,
        properties: Properties,
    ) -> Relationship {
        Relationship {
            id: id.into(),
            name: name.into(),
            source,
            target,
            properties,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Entity {
        &self.source
    }

    pub fn target(&self) -> &Entity {
        &self.target
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Apply a sparse patch, producing a new relationship. Removals
    /// run before insertions, so a key in both sets ends up set.
    pub fn update(&self, patch: &Update) -> Relationship {
        let mut properties = self.properties.clone();
        for key in &patch.remove {
            properties.remove(key);
        }
        for (key, value) in &patch.set {
            properties.insert(key.clone(), value.clone());
        }
        Relationship {
            id: self.id.clone(),
            name: self.name.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            properties,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "source": self.source.to_json(),
            "target": self.target.to_json(),
            "properties": self.properties,
        })
    }

    pub fn from_json(
        value: &serde_json::Value,
        ctx: &ParsingContext,
    ) -> Result<Relationship, WireError> {
        let obj = value
            .as_object()
            .ok_or_else(|| WireError::field_type("relationship", "an object"))?;

        let id = get_str(obj, "id")?.to_string();
        let name = get_str(obj, "name")?.to_string();
        let source = Entity::from_json(
            obj.get("source").ok_or_else(|| WireError::missing("source"))?,
            ctx,
        )?;
        let target = Entity::from_json(
            obj.get("target").ok_or_else(|| WireError::missing("target"))?,
            ctx,
        )?;
        let properties = match obj.get("properties") {
            None => Properties::new(),
            Some(serde_json::Value::Object(props)) => {
                props.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            Some(_) => return Err(WireError::field_type("properties", "an object")),
        };

        Ok(Relationship {
            id,
            name,
            source,
            target,
            properties,
        })
    }
}

fn get_str<'a>(
    obj: &'a serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<&'a str, WireError> {
    obj.get(field)
        .ok_or_else(|| WireError::missing(field))?
        .as_str()
        .ok_or_else(|| WireError::field_type(field, "a string"))
}
