//! The fixed table of entity kinds and their permitted parent→child
//! edges.
//!
//! The containment relation is a DAG, not a strict tree: Resource and
//! Metric may live directly under an Environment or under a Feed in
//! that Environment. Tenant is the only root kind.

use serde::{Deserialize, Serialize};

/// A kind of addressable inventory entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Tenant,
    Environment,
    Feed,
    ResourceType,
    MetricType,
    OperationType,
    Resource,
    Metric,
    DataEntity,
}

/// All entity kinds, in declaration order. Used by the resolver to
/// seed candidate sets for untyped segments.
pub const ALL_TYPES: [EntityType; 9] = [
    EntityType::Tenant,
    EntityType::Environment,
    EntityType::Feed,
    EntityType::ResourceType,
    EntityType::MetricType,
    EntityType::OperationType,
    EntityType::Resource,
    EntityType::Metric,
    EntityType::DataEntity,
];

impl EntityType {
    /// The short code used in path strings, e.g. `e` in `/t;t/e;prod`.
    pub fn code(self) -> &'static str {
        match self {
            EntityType::Tenant => "t",
            EntityType::Environment => "e",
            EntityType::Feed => "f",
            EntityType::ResourceType => "rt",
            EntityType::MetricType => "mt",
            EntityType::OperationType => "ot",
            EntityType::Resource => "r",
            EntityType::Metric => "m",
            EntityType::DataEntity => "d",
        }
    }

    /// Inverse of [`code`](Self::code). Unknown codes return `None`;
    /// the tokenizer turns that into a grammar error with position
    /// information.
    pub fn from_code(code: &str) -> Option<EntityType> {
        match code {
            "t" => Some(EntityType::Tenant),
            "e" => Some(EntityType::Environment),
            "f" => Some(EntityType::Feed),
            "rt" => Some(EntityType::ResourceType),
            "mt" => Some(EntityType::MetricType),
            "ot" => Some(EntityType::OperationType),
            "r" => Some(EntityType::Resource),
            "m" => Some(EntityType::Metric),
            "d" => Some(EntityType::DataEntity),
            _ => None,
        }
    }

    /// Human-readable kind name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            EntityType::Tenant => "Tenant",
            EntityType::Environment => "Environment",
            EntityType::Feed => "Feed",
            EntityType::ResourceType => "ResourceType",
            EntityType::MetricType => "MetricType",
            EntityType::OperationType => "OperationType",
            EntityType::Resource => "Resource",
            EntityType::Metric => "Metric",
            EntityType::DataEntity => "DataEntity",
        }
    }

    /// Parse a kind name as written by [`name`](Self::name).
    /// Accepted case-sensitively; used by the CLI's `--expect` flag.
    pub fn from_name(name: &str) -> Option<EntityType> {
        ALL_TYPES.iter().copied().find(|t| t.name() == name)
    }

    /// Permitted child kinds of this kind.
    pub fn children(self) -> &'static [EntityType] {
        match self {
            EntityType::Tenant => &[
                EntityType::Environment,
                EntityType::ResourceType,
                EntityType::MetricType,
            ],
            EntityType::Environment => &[
                EntityType::Feed,
                EntityType::Resource,
                EntityType::Metric,
            ],
            EntityType::Feed => &[EntityType::Resource, EntityType::Metric],
            EntityType::ResourceType => &[EntityType::OperationType, EntityType::DataEntity],
            EntityType::OperationType => &[EntityType::DataEntity],
            EntityType::Resource => &[EntityType::DataEntity],
            EntityType::MetricType | EntityType::Metric | EntityType::DataEntity => &[],
        }
    }

    /// Whether `child` may appear directly under `self`.
    pub fn allows_child(self, child: EntityType) -> bool {
        self.children().contains(&child)
    }

    /// Kinds permitted at the root of a canonical path. Only Tenant
    /// has no parent.
    pub fn is_root(self) -> bool {
        matches!(self, EntityType::Tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for t in ALL_TYPES {
            assert_eq!(EntityType::from_code(t.code()), Some(t));
        }
        assert_eq!(EntityType::from_code("x"), None);
        assert_eq!(EntityType::from_code(""), None);
    }

    #[test]
    fn names_round_trip() {
        for t in ALL_TYPES {
            assert_eq!(EntityType::from_name(t.name()), Some(t));
        }
        assert_eq!(EntityType::from_name("Widget"), None);
    }

    #[test]
    fn operation_type_only_under_resource_type() {
        for t in ALL_TYPES {
            let allowed = t.allows_child(EntityType::OperationType);
            assert_eq!(allowed, t == EntityType::ResourceType, "{:?}", t);
        }
    }

    #[test]
    fn resource_and_metric_have_two_parents() {
        let parents_of = |child: EntityType| {
            ALL_TYPES
                .iter()
                .copied()
                .filter(|t| t.allows_child(child))
                .collect::<Vec<_>>()
        };
        assert_eq!(
            parents_of(EntityType::Resource),
            vec![EntityType::Environment, EntityType::Feed]
        );
        assert_eq!(
            parents_of(EntityType::Metric),
            vec![EntityType::Environment, EntityType::Feed]
        );
    }

    #[test]
    fn tenant_is_the_only_root() {
        for t in ALL_TYPES {
            let has_parent = ALL_TYPES.iter().any(|p| p.allows_child(t));
            assert_eq!(!has_parent, t.is_root(), "{:?}", t);
        }
    }
}
