//! JSON wire codec for structured data and paths.
//!
//! Structured data maps onto plain JSON with seven distinct tags:
//! undefined ↔ null, bool ↔ boolean, integral ↔ integer number token,
//! floating-point ↔ decimal number token, string ↔ string, list ↔
//! array, map ↔ object. An integral-valued float keeps its fractional
//! part on the wire (`42.0`), so the two numeric kinds never collapse.
//!
//! Paths travel as single strings. Decoding a partially-typed string
//! needs a [`ParsingContext`]; the [`PathDecoder`] binds one context
//! for the duration of a decode pass and is never shared mutable
//! state.

use arbor_core::{CanonicalPath, ParsingContext, Path, PathError, RelativePath, StructuredData};

use crate::WireError;

// ──────────────────────────────────────────────
// Structured data ↔ serde_json::Value
// ──────────────────────────────────────────────

/// Convert a structured data value to its wire JSON form.
pub fn data_to_json(data: &StructuredData) -> serde_json::Value {
    match data {
        StructuredData::Undefined => serde_json::Value::Null,
        StructuredData::Bool(b) => serde_json::Value::Bool(*b),
        StructuredData::Integral(i) => serde_json::json!(i),
        StructuredData::FloatingPoint(x) => serde_json::json!(x),
        StructuredData::String(s) => serde_json::Value::String(s.clone()),
        StructuredData::List(items) => {
            serde_json::Value::Array(items.iter().map(data_to_json).collect())
        }
        StructuredData::Map(entries) => {
            let mut map = serde_json::Map::new();
            for (k, v) in entries.iter() {
                map.insert(k.clone(), data_to_json(v));
            }
            serde_json::Value::Object(map)
        }
    }
}

/// Decode wire JSON into a structured data value.
///
/// Containers are assembled through the builder protocol, so the
/// result satisfies the same invariants as programmatically built
/// values. Numbers that fit an i64 become Integral; everything else
/// becomes FloatingPoint.
pub fn data_from_json(value: &serde_json::Value) -> Result<StructuredData, WireError> {
    match value {
        serde_json::Value::Null => Ok(StructuredData::Undefined),
        serde_json::Value::Bool(b) => Ok(StructuredData::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(StructuredData::Integral(i))
            } else if let Some(x) = n.as_f64() {
                Ok(StructuredData::FloatingPoint(x))
            } else {
                Err(WireError::Data {
                    message: format!("number {} fits neither kind", n),
                })
            }
        }
        serde_json::Value::String(s) => Ok(StructuredData::String(s.clone())),
        serde_json::Value::Array(items) => {
            let mut builder = StructuredData::list();
            for item in items {
                builder = builder
                    .add(data_from_json(item)?)
                    .map_err(WireError::builder)?;
            }
            builder.build().map_err(WireError::builder)
        }
        serde_json::Value::Object(entries) => {
            let mut builder = StructuredData::map();
            for (k, v) in entries {
                builder = builder
                    .put(k.clone(), data_from_json(v)?)
                    .map_err(WireError::builder)?;
            }
            builder.build().map_err(WireError::builder)
        }
    }
}

// ──────────────────────────────────────────────
// Path decoding
// ──────────────────────────────────────────────

/// A per-call path decoder bound to one explicit [`ParsingContext`].
///
/// Build one wherever a wire document is being read, from the
/// enclosing entity's position in the object graph. Decoders hold no
/// mutable state, so concurrent decoding with different contexts needs
/// no coordination.
#[derive(Debug, Clone, Default)]
pub struct PathDecoder {
    ctx: ParsingContext,
}

impl PathDecoder {
    pub fn new(ctx: ParsingContext) -> PathDecoder {
        PathDecoder { ctx }
    }

    pub fn context(&self) -> &ParsingContext {
        &self.ctx
    }

    /// Decode an absolute, possibly partially-typed path string.
    pub fn decode_canonical(&self, s: &str) -> Result<CanonicalPath, PathError> {
        CanonicalPath::from_partially_untyped(s, &self.ctx)
    }

    /// Decode a relative path string against the bound relative
    /// origin; without one, only the fully-typed form is accepted.
    pub fn decode_relative(&self, s: &str) -> Result<RelativePath, PathError> {
        match &self.ctx.relative_origin {
            Some(origin) => RelativePath::from_partially_untyped(s, origin, self.ctx.expected_leaf),
            None => s.parse(),
        }
    }

    /// Decode a string of either flavor: a leading `/` selects the
    /// canonical form.
    pub fn decode_any(&self, s: &str) -> Result<Path, PathError> {
        Path::from_partially_untyped(s, &self.ctx)
    }
}
