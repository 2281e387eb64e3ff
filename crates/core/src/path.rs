//! Canonical and relative path value types.
//!
//! A [`CanonicalPath`] is the fully-typed absolute address of an
//! entity, from the Tenant root down. A [`RelativePath`] is an
//! up-count plus a segment run, meaningful only against an origin.
//! Both are immutable: derived paths (`parent`, `extend`,
//! `relativize`) always produce new values.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PathError;
use crate::grammar::{escape_id, tokenize};
use crate::hierarchy::EntityType;
use crate::resolve::{resolve_canonical, resolve_relative, solve_chain, ParsingContext, StartAt};

// ──────────────────────────────────────────────
// Segment
// ──────────────────────────────────────────────

/// One typed step of a path: an entity kind and an opaque id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    pub entity_type: EntityType,
    pub id: String,
}

impl Segment {
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        Segment {
            entity_type,
            id: id.into(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.entity_type.code(), escape_id(&self.id))
    }
}

// ──────────────────────────────────────────────
// CanonicalPath
// ──────────────────────────────────────────────

/// Fully-typed absolute address from the Tenant root to one entity.
///
/// Non-empty, starts with a Tenant segment, every consecutive pair a
/// permitted child edge. Equality, ordering, and hashing are
/// structural over the segment sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalPath {
    segments: Vec<Segment>,
}

impl CanonicalPath {
    /// The root path of a tenant.
    pub fn of_tenant(id: impl Into<String>) -> CanonicalPath {
        CanonicalPath {
            segments: vec![Segment::new(EntityType::Tenant, id)],
        }
    }

    /// Build from an explicit segment sequence, validating the
    /// hierarchy invariants.
    pub fn from_segments(segments: Vec<Segment>) -> Result<CanonicalPath, PathError> {
        let first = segments
            .first()
            .ok_or_else(|| PathError::hierarchy("canonical path cannot be empty"))?;
        if !first.entity_type.is_root() {
            return Err(PathError::hierarchy(format!(
                "canonical path must start at a Tenant, not {}",
                first.entity_type.name()
            )));
        }
        for pair in segments.windows(2) {
            if !pair[0].entity_type.allows_child(pair[1].entity_type) {
                return Err(PathError::hierarchy(format!(
                    "{} is not a permitted child of {}",
                    pair[1].entity_type.name(),
                    pair[0].entity_type.name()
                )));
            }
        }
        Ok(CanonicalPath { segments })
    }

    /// Parse a possibly partially-typed absolute string under an
    /// explicit context.
    pub fn from_partially_untyped(
        s: &str,
        ctx: &ParsingContext,
    ) -> Result<CanonicalPath, PathError> {
        let tokens = tokenize(s)?;
        if !tokens.absolute {
            return Err(PathError::grammar(0, "canonical path must start with '/'"));
        }
        resolve_canonical(&tokens, ctx)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The addressed entity's segment.
    pub fn leaf(&self) -> &Segment {
        self.segments.last().expect("canonical path is non-empty")
    }

    /// The kind of the addressed entity.
    pub fn kind(&self) -> EntityType {
        self.leaf().entity_type
    }

    /// The id of the addressed entity.
    pub fn leaf_id(&self) -> &str {
        &self.leaf().id
    }

    /// Segment ids from root to leaf.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.id.as_str())
    }

    /// The containing path, or `None` at the Tenant root.
    pub fn parent(&self) -> Option<CanonicalPath> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(CanonicalPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append one child segment.
    pub fn extend(
        &self,
        entity_type: EntityType,
        id: impl Into<String>,
    ) -> Result<CanonicalPath, PathError> {
        if !self.kind().allows_child(entity_type) {
            return Err(PathError::hierarchy(format!(
                "{} is not a permitted child of {}",
                entity_type.name(),
                self.kind().name()
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(Segment::new(entity_type, id));
        Ok(CanonicalPath { segments })
    }

    /// Whether `self` is a proper prefix of `other`.
    pub fn is_parent_of(&self, other: &CanonicalPath) -> bool {
        self.depth() < other.depth() && self.segments == other.segments[..self.depth()]
    }

    /// The relative path from `self` to `target`: hops up to the
    /// longest common prefix, then down `target`'s remaining segments.
    pub fn relativize(&self, target: &CanonicalPath) -> RelativePath {
        let common = self
            .segments
            .iter()
            .zip(target.segments.iter())
            .take_while(|(a, b)| a == b)
            .count();
        RelativePath {
            ups: self.depth() - common,
            segments: target.segments[common..].to_vec(),
        }
    }

    /// The fully-typed absolute string; no context needed to parse it
    /// back.
    pub fn to_canonical_string(&self) -> String {
        render(&self.segments, None, true, 0)
    }

    /// The minimal string that resolves back to `self` under `ctx`.
    ///
    /// Candidates are tried from most- to least-reduced (origin prefix
    /// stripped, type codes omitted) and each is verified by
    /// re-resolving it under the same context, so the returned string
    /// can never denote a different path.
    pub fn to_partially_typed_string(&self, ctx: &ParsingContext) -> String {
        let tail_start = match &ctx.canonical_origin {
            Some(origin) if origin.is_parent_of(self) => origin.depth(),
            _ => 0,
        };
        let tail = &self.segments[tail_start..];

        for flags in reduction_ladder(tail.len()) {
            let candidate = render(tail, Some(&flags), true, 0);
            if let Ok(resolved) = CanonicalPath::from_partially_untyped(&candidate, ctx) {
                if resolved == *self {
                    return candidate;
                }
            }
        }
        self.to_canonical_string()
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for CanonicalPath {
    type Err = PathError;

    /// Parses the fully-typed form; untyped segments need
    /// [`CanonicalPath::from_partially_untyped`] and a context.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalPath::from_partially_untyped(s, &ParsingContext::new())
    }
}

// ──────────────────────────────────────────────
// RelativePath
// ──────────────────────────────────────────────

/// An address expressed as hops up from an implicit origin followed by
/// hops down. Only [`resolve`](Self::resolve) against an origin gives
/// it an absolute meaning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath {
    ups: usize,
    segments: Vec<Segment>,
}

impl RelativePath {
    pub(crate) fn from_parts(ups: usize, segments: Vec<Segment>) -> RelativePath {
        RelativePath { ups, segments }
    }

    /// Parse a possibly partially-typed relative string against the
    /// origin it will be resolved from.
    pub fn from_partially_untyped(
        s: &str,
        origin: &CanonicalPath,
        expected_leaf: Option<EntityType>,
    ) -> Result<RelativePath, PathError> {
        let tokens = tokenize(s)?;
        if tokens.absolute {
            return Err(PathError::grammar(0, "relative path cannot start with '/'"));
        }
        resolve_relative(&tokens, origin, expected_leaf)
    }

    pub fn ups(&self) -> usize {
        self.ups
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for the zero-hop path produced by relativizing a path to
    /// itself. It renders as the empty string and resolves to the
    /// origin unchanged.
    pub fn is_empty(&self) -> bool {
        self.ups == 0 && self.segments.is_empty()
    }

    /// Apply the up-hops and descend, re-validating every edge against
    /// the origin.
    pub fn resolve(&self, origin: &CanonicalPath) -> Result<CanonicalPath, PathError> {
        if self.ups > origin.depth() {
            return Err(PathError::hierarchy(format!(
                "{} up-hop(s) exceed the depth {} of origin {}",
                self.ups,
                origin.depth(),
                origin
            )));
        }
        let mut segments = origin.segments[..origin.depth() - self.ups].to_vec();
        for seg in &self.segments {
            let legal = match segments.last() {
                Some(leaf) => leaf.entity_type.allows_child(seg.entity_type),
                None => seg.entity_type.is_root(),
            };
            if !legal {
                return Err(PathError::hierarchy(format!(
                    "{} does not fit under {} when resolving against {}",
                    seg.entity_type.name(),
                    segments
                        .last()
                        .map(|s| s.entity_type.name())
                        .unwrap_or("the root"),
                    origin
                )));
            }
            segments.push(seg.clone());
        }
        CanonicalPath::from_segments(segments)
    }

    /// The fully-typed relative string; no context needed to parse it
    /// back.
    pub fn to_relative_string(&self) -> String {
        render(&self.segments, None, false, self.ups)
    }

    /// The minimal relative string that parses back to `self` against
    /// `ctx`'s relative origin; falls back to the fully-typed form
    /// when no origin is configured.
    pub fn to_partially_typed_string(&self, ctx: &ParsingContext) -> String {
        let Some(origin) = &ctx.relative_origin else {
            return self.to_relative_string();
        };
        if self.segments.is_empty() {
            return self.to_relative_string();
        }

        for flags in reduction_ladder(self.segments.len()) {
            let candidate = render(&self.segments, Some(&flags), false, self.ups);
            if let Ok(resolved) =
                RelativePath::from_partially_untyped(&candidate, origin, ctx.expected_leaf)
            {
                if resolved == *self {
                    return candidate;
                }
            }
        }
        self.to_relative_string()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_relative_string())
    }
}

impl FromStr for RelativePath {
    type Err = PathError;

    /// Parses the fully-typed form (types may be omitted only where
    /// the segment run itself forces them); untyped strings need
    /// [`RelativePath::from_partially_untyped`] and an origin.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        if tokens.absolute {
            return Err(PathError::grammar(0, "relative path cannot start with '/'"));
        }
        let segments = solve_chain(StartAt::Any, &tokens.segments, None)?;
        Ok(RelativePath {
            ups: tokens.ups,
            segments,
        })
    }
}

// ──────────────────────────────────────────────
// Path (either flavor)
// ──────────────────────────────────────────────

/// A path of either flavor, as found in wire documents: a leading `/`
/// selects the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Path {
    Canonical(CanonicalPath),
    Relative(RelativePath),
}

impl Path {
    /// Parse a possibly partially-typed string of either flavor under
    /// an explicit context. Relative strings require
    /// `ctx.relative_origin`; without one, only the fully-typed
    /// relative form is accepted.
    pub fn from_partially_untyped(s: &str, ctx: &ParsingContext) -> Result<Path, PathError> {
        if s.starts_with('/') {
            return Ok(Path::Canonical(CanonicalPath::from_partially_untyped(
                s, ctx,
            )?));
        }
        match &ctx.relative_origin {
            Some(origin) => Ok(Path::Relative(RelativePath::from_partially_untyped(
                s,
                origin,
                ctx.expected_leaf,
            )?)),
            None => Ok(Path::Relative(s.parse()?)),
        }
    }

    pub fn as_canonical(&self) -> Option<&CanonicalPath> {
        match self {
            Path::Canonical(p) => Some(p),
            Path::Relative(_) => None,
        }
    }

    pub fn as_relative(&self) -> Option<&RelativePath> {
        match self {
            Path::Relative(p) => Some(p),
            Path::Canonical(_) => None,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Canonical(p) => p.fmt(f),
            Path::Relative(p) => p.fmt(f),
        }
    }
}

// ──────────────────────────────────────────────
// Rendering helpers
// ──────────────────────────────────────────────

/// Render segments as a path string. `typed` selects per-segment
/// whether the type code is written; `None` writes every code.
fn render(segments: &[Segment], typed: Option<&[bool]>, absolute: bool, ups: usize) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(ups + segments.len());
    for _ in 0..ups {
        parts.push("..".to_string());
    }
    for (i, seg) in segments.iter().enumerate() {
        let with_code = typed.map_or(true, |flags| flags[i]);
        if with_code {
            parts.push(seg.to_string());
        } else {
            parts.push(escape_id(&seg.id));
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Reduction candidates from most- to least-typed: no codes at all,
/// then exactly one code (rightmost position first), then every code.
fn reduction_ladder(len: usize) -> Vec<Vec<bool>> {
    let mut ladder = vec![vec![false; len]];
    for i in (0..len).rev() {
        let mut flags = vec![false; len];
        flags[i] = true;
        ladder.push(flags);
    }
    ladder.push(vec![true; len]);
    ladder
}

// ──────────────────────────────────────────────
// Serde: paths are single strings on the wire
// ──────────────────────────────────────────────

impl Serialize for CanonicalPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for CanonicalPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct V;
        impl Visitor<'_> for V {
            type Value = CanonicalPath;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a fully-typed canonical path string")
            }
            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }
        deserializer.deserialize_str(V)
    }
}

impl Serialize for RelativePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_relative_string())
    }
}

impl<'de> Deserialize<'de> for RelativePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct V;
        impl Visitor<'_> for V {
            type Value = RelativePath;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a fully-typed relative path string")
            }
            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }
        deserializer.deserialize_str(V)
    }
}
