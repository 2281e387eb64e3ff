//! Property-based law tests for the path value types.
//!
//! These pin the algebra the wire format depends on: canonical
//! strings parse back to the same path, context-reduced strings
//! resolve back to the path they were produced from, and
//! relativize/resolve are inverses.

use proptest::prelude::*;

use arbor_core::hierarchy::ALL_TYPES;
use arbor_core::{CanonicalPath, ParsingContext, PathError, RelativePath};

/// Ids: mostly plain, sometimes needing the escape convention.
fn path_id() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => "[a-z][a-z0-9-]{0,7}",
        1 => Just("needs;escape".to_string()),
        1 => Just("slash/id".to_string()),
        1 => Just("back\\slash".to_string()),
        1 => Just("..".to_string()),
    ]
}

/// A legal canonical path: random walk down the permitted-child table,
/// up to four segments below the tenant.
fn canonical_path() -> impl Strategy<Value = CanonicalPath> {
    (
        path_id(),
        prop::collection::vec((any::<prop::sample::Index>(), path_id()), 0..4),
    )
        .prop_map(|(tenant, steps)| {
            let mut path = CanonicalPath::of_tenant(tenant);
            for (pick, id) in steps {
                let children = path.kind().children();
                if children.is_empty() {
                    break;
                }
                let child = children[pick.index(children.len())];
                path = path.extend(child, id).expect("picked a permitted child");
            }
            path
        })
}

proptest! {
    /// parse(to_canonical_string(p)) == p, including escaped ids.
    #[test]
    fn canonical_string_round_trips(p in canonical_path()) {
        let s = p.to_canonical_string();
        let parsed: CanonicalPath = s.parse().unwrap();
        prop_assert_eq!(parsed, p);
    }

    /// parse(to_partially_typed_string(p, ctx), ctx) == p for contexts
    /// made of any prefix origin and an optional leaf hint.
    #[test]
    fn context_reduction_inverts(
        p in canonical_path(),
        cut in any::<prop::sample::Index>(),
        hint in any::<bool>(),
    ) {
        let cut = cut.index(p.depth());
        let mut ctx = ParsingContext::new();
        if cut > 0 {
            let origin = CanonicalPath::from_segments(p.segments()[..cut].to_vec()).unwrap();
            ctx = ctx.canonical_origin(origin);
        }
        if hint {
            ctx = ctx.expected_leaf(p.kind());
        }
        let s = p.to_partially_typed_string(&ctx);
        let back = CanonicalPath::from_partially_untyped(&s, &ctx).unwrap();
        prop_assert_eq!(back, p);
    }

    /// resolve(origin, relativize(origin, target)) == target.
    #[test]
    fn relativize_resolve_inverts(
        origin in canonical_path(),
        target in canonical_path(),
    ) {
        let rel = origin.relativize(&target);
        prop_assert_eq!(rel.resolve(&origin).unwrap(), target);
    }

    /// Same law when the pair shares a real common ancestor.
    #[test]
    fn relativize_resolve_inverts_on_prefix_pairs(
        p in canonical_path(),
        cut in any::<prop::sample::Index>(),
    ) {
        let cut = 1 + cut.index(p.depth());
        let origin = CanonicalPath::from_segments(p.segments()[..cut].to_vec()).unwrap();
        let rel = origin.relativize(&p);
        prop_assert_eq!(rel.ups(), 0);
        prop_assert_eq!(rel.resolve(&origin).unwrap(), p);
    }

    /// Fully-typed relative strings parse back to the same value.
    #[test]
    fn relative_string_round_trips(
        origin in canonical_path(),
        target in canonical_path(),
    ) {
        let rel = origin.relativize(&target);
        if !rel.is_empty() {
            let parsed: RelativePath = rel.to_relative_string().parse().unwrap();
            prop_assert_eq!(parsed, rel);
        }
    }

    /// Reduced relative strings resolve back to the same value.
    #[test]
    fn relative_reduction_inverts(
        origin in canonical_path(),
        target in canonical_path(),
        hint in any::<bool>(),
    ) {
        let rel = origin.relativize(&target);
        if !rel.is_empty() {
            let mut ctx = ParsingContext::new().relative_origin(origin.clone());
            if hint {
                ctx = ctx.expected_leaf(target.kind());
            }
            let s = rel.to_partially_typed_string(&ctx);
            let back = RelativePath::from_partially_untyped(
                &s,
                &origin,
                ctx.expected_leaf,
            ).unwrap();
            prop_assert_eq!(back, rel);
        }
    }

    /// extend() fails with a hierarchy violation for every kind that is
    /// not a permitted child of the leaf.
    #[test]
    fn extend_rejects_every_illegal_child(p in canonical_path()) {
        for t in ALL_TYPES {
            let result = p.extend(t, "x");
            if p.kind().allows_child(t) {
                prop_assert!(result.is_ok());
            } else {
                let is_hierarchy_violation =
                    matches!(result, Err(PathError::HierarchyViolation { .. }));
                prop_assert!(is_hierarchy_violation);
            }
        }
    }
}

#[test]
fn metric_directly_under_tenant_is_rejected() {
    let err = CanonicalPath::of_tenant("t")
        .extend(arbor_core::EntityType::Metric, "m")
        .unwrap_err();
    assert!(matches!(err, PathError::HierarchyViolation { .. }), "{:?}", err);
}
