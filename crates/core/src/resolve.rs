//! Context-sensitive type resolution ("detyping").
//!
//! A path string on the wire may omit type codes that are already
//! implied by where the string sits in a JSON document. This module
//! recovers the omitted types from an explicit [`ParsingContext`]:
//! origin paths supply the implied prefix, and the permitted-child
//! table plus the expected leaf kind pin down the types of untyped
//! segments.
//!
//! The context is always an explicit argument. It is never stored in
//! shared or thread-scoped mutable state, so concurrent parses with
//! different contexts are independent.

use crate::error::PathError;
use crate::grammar::{RawSegment, TokenStream};
use crate::hierarchy::{EntityType, ALL_TYPES};
use crate::path::{CanonicalPath, RelativePath, Segment};

/// The explicit bundle of origin paths and expected leaf kind used to
/// resolve a partially-typed path string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsingContext {
    /// Prefix to stitch onto absolute-but-partial strings.
    pub canonical_origin: Option<CanonicalPath>,
    /// Origin that relative strings pop their up-hops against.
    pub relative_origin: Option<CanonicalPath>,
    /// Declared kind of the addressed entity; anchors the final
    /// untyped segment when more than one child edge is consistent.
    pub expected_leaf: Option<EntityType>,
}

impl ParsingContext {
    pub fn new() -> Self {
        ParsingContext::default()
    }

    pub fn canonical_origin(mut self, origin: CanonicalPath) -> Self {
        self.canonical_origin = Some(origin);
        self
    }

    pub fn relative_origin(mut self, origin: CanonicalPath) -> Self {
        self.relative_origin = Some(origin);
        self
    }

    pub fn expected_leaf(mut self, leaf: EntityType) -> Self {
        self.expected_leaf = Some(leaf);
        self
    }
}

/// Where an inferred segment chain starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartAt {
    /// The virtual root: the first segment must be a root kind.
    Root,
    /// Directly under an existing leaf of this kind.
    Leaf(EntityType),
    /// Unconstrained (fully-typed relative path with no origin).
    Any,
}

/// Resolve an absolute token stream into a canonical path.
///
/// The string is taken as already full (root-to-leaf) when its first
/// token is explicitly typed Tenant; otherwise a configured
/// `canonical_origin` is prepended.
pub(crate) fn resolve_canonical(
    tokens: &TokenStream,
    ctx: &ParsingContext,
) -> Result<CanonicalPath, PathError> {
    let already_full = tokens
        .segments
        .first()
        .is_some_and(|s| s.explicit_type == Some(EntityType::Tenant));

    let base: &[Segment] = match (&ctx.canonical_origin, already_full) {
        (Some(origin), false) => origin.segments(),
        _ => &[],
    };

    let start = match base.last() {
        Some(leaf) => StartAt::Leaf(leaf.entity_type),
        None => StartAt::Root,
    };

    let resolved = solve_chain(start, &tokens.segments, ctx.expected_leaf)?;

    let mut segments = base.to_vec();
    segments.extend(resolved);
    CanonicalPath::from_segments(segments)
}

/// Resolve a relative token stream against an origin.
///
/// Pops `ups` segments from the origin, then types the remaining
/// tokens continuing from the popped-down leaf.
pub(crate) fn resolve_relative(
    tokens: &TokenStream,
    origin: &CanonicalPath,
    expected_leaf: Option<EntityType>,
) -> Result<RelativePath, PathError> {
    if tokens.ups > origin.depth() {
        return Err(PathError::hierarchy(format!(
            "{} up-hop(s) exceed the depth {} of origin {}",
            tokens.ups,
            origin.depth(),
            origin
        )));
    }

    let base = &origin.segments()[..origin.depth() - tokens.ups];
    let start = match base.last() {
        Some(leaf) => StartAt::Leaf(leaf.entity_type),
        None => StartAt::Root,
    };

    let segments = solve_chain(start, &tokens.segments, expected_leaf)?;
    Ok(RelativePath::from_parts(tokens.ups, segments))
}

/// Type a run of raw segments so that every consecutive pair is a
/// permitted child edge.
///
/// Candidate kinds per position are pruned forward and backward over
/// the edge table until a fixpoint; `expected_leaf` then anchors the
/// final position when it is untyped and still consistent. Exactly one
/// survivor per position is required: none is a hierarchy violation,
/// several an ambiguity.
pub(crate) fn solve_chain(
    start: StartAt,
    raw: &[RawSegment],
    expected_leaf: Option<EntityType>,
) -> Result<Vec<Segment>, PathError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let mut allowed: Vec<Vec<EntityType>> = raw
        .iter()
        .map(|seg| match seg.explicit_type {
            Some(t) => vec![t],
            None => ALL_TYPES.to_vec(),
        })
        .collect();

    prune_to_fixpoint(start, &mut allowed);

    // Anchor the last token on the expected leaf kind, when the token
    // is untyped and the hint survived pruning. An explicit final code
    // always wins over the hint.
    if let Some(expected) = expected_leaf {
        let last = allowed.len() - 1;
        if raw[last].explicit_type.is_none()
            && allowed[last].len() > 1
            && allowed[last].contains(&expected)
        {
            allowed[last] = vec![expected];
            prune_to_fixpoint(start, &mut allowed);
        }
    }

    let mut segments = Vec::with_capacity(raw.len());
    for (i, candidates) in allowed.iter().enumerate() {
        match candidates.as_slice() {
            [unique] => segments.push(Segment::new(*unique, raw[i].id.clone())),
            [] => {
                return Err(PathError::hierarchy(match raw[i].explicit_type {
                    Some(t) => format!(
                        "segment '{}' of type {} has no legal position here",
                        raw[i].id,
                        t.name()
                    ),
                    None => format!("no legal type for segment '{}'", raw[i].id),
                }))
            }
            _ => {
                return Err(PathError::AmbiguousType {
                    segment: raw[i].id.clone(),
                    candidates: candidates.clone(),
                })
            }
        }
    }
    Ok(segments)
}

/// Alternate forward and backward pruning until neither removes a
/// candidate. Afterwards every remaining kind lies on at least one
/// legal full chain.
fn prune_to_fixpoint(start: StartAt, allowed: &mut [Vec<EntityType>]) {
    loop {
        let mut changed = false;

        // Forward: each position must follow some candidate before it.
        for i in 0..allowed.len() {
            let before = allowed[i].len();
            if i == 0 {
                match start {
                    StartAt::Root => allowed[0].retain(|t| t.is_root()),
                    StartAt::Leaf(leaf) => allowed[0].retain(|t| leaf.allows_child(*t)),
                    StartAt::Any => {}
                }
            } else {
                let (head, tail) = allowed.split_at_mut(i);
                let prev = &head[i - 1];
                tail[0].retain(|t| prev.iter().any(|p| p.allows_child(*t)));
            }
            changed |= allowed[i].len() != before;
        }

        // Backward: each position must lead into some candidate after it.
        for i in (0..allowed.len().saturating_sub(1)).rev() {
            let before = allowed[i].len();
            let (head, tail) = allowed.split_at_mut(i + 1);
            let next = &tail[0];
            head[i].retain(|t| next.iter().any(|c| t.allows_child(*c)));
            changed |= allowed[i].len() != before;
        }

        if !changed {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tokenize;

    fn cp(s: &str) -> CanonicalPath {
        s.parse().unwrap()
    }

    fn resolve(s: &str, ctx: &ParsingContext) -> Result<CanonicalPath, PathError> {
        resolve_canonical(&tokenize(s).unwrap(), ctx)
    }

    #[test]
    fn full_string_needs_no_context() {
        let ctx = ParsingContext::new();
        assert_eq!(resolve("/t;t/e;e/r;r", &ctx).unwrap(), cp("/t;t/e;e/r;r"));
    }

    #[test]
    fn full_string_ignores_canonical_origin() {
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::Resource);
        assert_eq!(resolve("/t;t/e;e/r;r", &ctx).unwrap(), cp("/t;t/e;e/r;r"));
    }

    #[test]
    fn typed_tail_is_prepended() {
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::Resource);
        assert_eq!(resolve("/e;e/r;r", &ctx).unwrap(), cp("/t;t/e;e/r;r"));
    }

    #[test]
    fn untyped_tail_resolves_through_expected_leaf() {
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::Resource);
        assert_eq!(resolve("/e/c", &ctx).unwrap(), cp("/t;t/e;e/r;c"));
    }

    #[test]
    fn serialization_suite_vectors() {
        // Environment under /t;t, three reductions of the same path.
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::Environment);
        for s in ["/e;c", "/t;t/c", "/c"] {
            assert_eq!(resolve(s, &ctx).unwrap(), cp("/t;t/e;c"), "{}", s);
        }

        // ResourceType reductions.
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::ResourceType);
        for s in ["/t;t/rt;c", "/t;t/c", "/c"] {
            assert_eq!(resolve(s, &ctx).unwrap(), cp("/t;t/rt;c"), "{}", s);
        }

        // Feed reductions.
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::Feed);
        for s in ["/t;t/e;e/f;c", "/t;t/e/c", "/e/c"] {
            assert_eq!(resolve(s, &ctx).unwrap(), cp("/t;t/e;e/f;c"), "{}", s);
        }

        // Resource and Metric under a feed.
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::Resource);
        assert_eq!(resolve("/e/f/c", &ctx).unwrap(), cp("/t;t/e;e/f;f/r;c"));
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::Metric);
        assert_eq!(resolve("/e/f/c", &ctx).unwrap(), cp("/t;t/e;e/f;f/m;c"));
    }

    #[test]
    fn tenant_resolves_with_no_origin_at_all() {
        let ctx = ParsingContext::new().expected_leaf(EntityType::Tenant);
        assert_eq!(resolve("/c", &ctx).unwrap(), cp("/t;c"));
    }

    #[test]
    fn explicit_final_code_wins_over_hint() {
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t"))
            .expected_leaf(EntityType::Resource);
        assert_eq!(resolve("/e;e/m;g", &ctx).unwrap(), cp("/t;t/e;e/m;g"));
    }

    #[test]
    fn untyped_without_hint_is_ambiguous() {
        let ctx = ParsingContext::new().canonical_origin(cp("/t;t/e;e"));
        let err = resolve("/c", &ctx).unwrap_err();
        match err {
            PathError::AmbiguousType { candidates, .. } => {
                assert_eq!(
                    candidates,
                    vec![EntityType::Feed, EntityType::Resource, EntityType::Metric]
                );
            }
            other => panic!("expected AmbiguousType, got {:?}", other),
        }
    }

    #[test]
    fn interior_types_resolve_backward_from_anchor() {
        // Only the last segment typed: everything before it must
        // still pin down uniquely.
        let ctx = ParsingContext::new().canonical_origin(cp("/t;t"));
        assert_eq!(resolve("/e/f;x", &ctx).unwrap(), cp("/t;t/e;e/f;x"));
        assert_eq!(resolve("/rt/ot;op", &ctx).unwrap(), cp("/t;t/rt;rt/ot;op"));
    }

    #[test]
    fn illegal_explicit_chain_is_a_hierarchy_violation() {
        let ctx = ParsingContext::new();
        let err = resolve("/t;t/m;g", &ctx).unwrap_err();
        assert!(matches!(err, PathError::HierarchyViolation { .. }), "{:?}", err);

        // Explicit code inconsistent with the only legal chain.
        let ctx = ParsingContext::new().canonical_origin(cp("/t;t/rt;rt"));
        let err = resolve("/e;e", &ctx).unwrap_err();
        assert!(matches!(err, PathError::HierarchyViolation { .. }), "{:?}", err);
    }

    #[test]
    fn inconsistent_hint_leaves_explicit_resolution_intact() {
        // expected_leaf not reachable under a ResourceType: the hint
        // is ignored and the explicit chain still resolves.
        let ctx = ParsingContext::new()
            .canonical_origin(cp("/t;t/rt;rt"))
            .expected_leaf(EntityType::Resource);
        assert_eq!(resolve("/ot;op", &ctx).unwrap(), cp("/t;t/rt;rt/ot;op"));
    }

    #[test]
    fn relative_resolution_pops_and_descends() {
        let origin = cp("/t;t/e;e/r;r");
        let tokens = tokenize("../g").unwrap();
        let rel = resolve_relative(&tokens, &origin, Some(EntityType::Metric)).unwrap();
        assert_eq!(rel.ups(), 1);
        assert_eq!(rel.resolve(&origin).unwrap(), cp("/t;t/e;e/m;g"));
    }

    #[test]
    fn relative_up_count_bounded_by_origin_depth() {
        let origin = cp("/t;t");
        let tokens = tokenize("../../x").unwrap();
        let err = resolve_relative(&tokens, &origin, None).unwrap_err();
        assert!(matches!(err, PathError::HierarchyViolation { .. }), "{:?}", err);
    }

    #[test]
    fn relative_up_to_root_starts_over() {
        let origin = cp("/t;t/e;e");
        let tokens = tokenize("../../other").unwrap();
        let rel = resolve_relative(&tokens, &origin, Some(EntityType::Tenant)).unwrap();
        assert_eq!(rel.resolve(&origin).unwrap(), cp("/t;other"));
    }
}
