//! The structured data model: a recursive, self-describing tagged
//! value for arbitrary typed configuration payloads.
//!
//! Composite values cannot be assembled directly -- `ListValue` and
//! `MapValue` have no public constructor. Everything goes through the
//! [`DataBuilder`] protocol: open a root container with
//! [`StructuredData::list`] or [`StructuredData::map`], append leaves,
//! open and close nested frames, and finalize with `build()`. The
//! frame stack is private to the one owned builder; every operation
//! consumes the builder, so a failed protocol cannot be silently
//! continued and a finished builder cannot be reused.
//!
//! Integral and floating-point values are distinct kinds and stay
//! distinct through serialization: `Integral(42)` and
//! `FloatingPoint(42.0)` never collapse into one generic number.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BuilderError;

// ──────────────────────────────────────────────
// Value model
// ──────────────────────────────────────────────

/// A recursive tagged configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredData {
    Undefined,
    Bool(bool),
    Integral(i64),
    FloatingPoint(f64),
    String(String),
    List(ListValue),
    Map(MapValue),
}

/// An immutable ordered sequence of [`StructuredData`]. Built only by
/// the builder protocol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListValue(Vec<StructuredData>);

impl Deref for ListValue {
    type Target = [StructuredData];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// An immutable string-keyed mapping of [`StructuredData`]. Keys are
/// held sorted; equality and the wire form are order-insensitive.
/// Built only by the builder protocol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue(BTreeMap<String, StructuredData>);

impl Deref for MapValue {
    type Target = BTreeMap<String, StructuredData>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl StructuredData {
    pub fn undefined() -> StructuredData {
        StructuredData::Undefined
    }

    pub fn bool(value: bool) -> StructuredData {
        StructuredData::Bool(value)
    }

    pub fn integral(value: i64) -> StructuredData {
        StructuredData::Integral(value)
    }

    pub fn floating_point(value: f64) -> StructuredData {
        StructuredData::FloatingPoint(value)
    }

    pub fn string(value: impl Into<String>) -> StructuredData {
        StructuredData::String(value.into())
    }

    /// Open a builder whose root container is a list.
    pub fn list() -> DataBuilder {
        DataBuilder::new(Frame::list(None))
    }

    /// Open a builder whose root container is a map.
    pub fn map() -> DataBuilder {
        DataBuilder::new(Frame::map(None))
    }

    /// The tag name of this value, for error messages.
    pub fn tag_name(&self) -> &'static str {
        match self {
            StructuredData::Undefined => "undefined",
            StructuredData::Bool(_) => "bool",
            StructuredData::Integral(_) => "integral",
            StructuredData::FloatingPoint(_) => "floating-point",
            StructuredData::String(_) => "string",
            StructuredData::List(_) => "list",
            StructuredData::Map(_) => "map",
        }
    }
}

// ──────────────────────────────────────────────
// Builder protocol
// ──────────────────────────────────────────────

/// One in-progress container. `slot` remembers the key this container
/// attaches under when its parent frame is a map.
#[derive(Debug)]
enum Frame {
    List {
        items: Vec<StructuredData>,
        slot: Option<String>,
    },
    Map {
        entries: BTreeMap<String, StructuredData>,
        slot: Option<String>,
    },
}

impl Frame {
    fn list(slot: Option<String>) -> Frame {
        Frame::List {
            items: Vec::new(),
            slot,
        }
    }

    fn map(slot: Option<String>) -> Frame {
        Frame::Map {
            entries: BTreeMap::new(),
            slot,
        }
    }
}

/// Single-owner builder for composite [`StructuredData`] values.
///
/// The current frame is the innermost open container; enclosing
/// frames wait on the private stack. Unkeyed `add_*` calls are legal
/// only while the current frame is a list, keyed `put_*` calls only
/// while it is a map. `close_list`/`close_map` finish the current
/// nested frame and return control to its parent; the root frame is
/// finished by `build()` alone.
#[derive(Debug)]
pub struct DataBuilder {
    stack: Vec<Frame>,
    current: Frame,
}

impl DataBuilder {
    fn new(root: Frame) -> DataBuilder {
        DataBuilder {
            stack: Vec::new(),
            current: root,
        }
    }

    // ── unkeyed appends (list frames) ────────────────────────────────

    pub fn add_bool(self, value: bool) -> Result<DataBuilder, BuilderError> {
        self.add(StructuredData::Bool(value))
    }

    pub fn add_integral(self, value: i64) -> Result<DataBuilder, BuilderError> {
        self.add(StructuredData::Integral(value))
    }

    pub fn add_floating_point(self, value: f64) -> Result<DataBuilder, BuilderError> {
        self.add(StructuredData::FloatingPoint(value))
    }

    pub fn add_string(self, value: impl Into<String>) -> Result<DataBuilder, BuilderError> {
        self.add(StructuredData::String(value.into()))
    }

    pub fn add_undefined(self) -> Result<DataBuilder, BuilderError> {
        self.add(StructuredData::Undefined)
    }

    /// Append an already-finished value to the current list frame.
    pub fn add(mut self, value: StructuredData) -> Result<DataBuilder, BuilderError> {
        match &mut self.current {
            Frame::List { items, .. } => {
                items.push(value);
                Ok(self)
            }
            Frame::Map { .. } => Err(BuilderError::UnkeyedInMap),
        }
    }

    /// Open a nested list under the current list frame.
    pub fn add_list(mut self) -> Result<DataBuilder, BuilderError> {
        match &self.current {
            Frame::List { .. } => {
                self.stack.push(self.current);
                self.current = Frame::list(None);
                Ok(self)
            }
            Frame::Map { .. } => Err(BuilderError::UnkeyedInMap),
        }
    }

    /// Open a nested map under the current list frame.
    pub fn add_map(mut self) -> Result<DataBuilder, BuilderError> {
        match &self.current {
            Frame::List { .. } => {
                self.stack.push(self.current);
                self.current = Frame::map(None);
                Ok(self)
            }
            Frame::Map { .. } => Err(BuilderError::UnkeyedInMap),
        }
    }

    // ── keyed puts (map frames) ──────────────────────────────────────

    pub fn put_bool(self, key: impl Into<String>, value: bool) -> Result<DataBuilder, BuilderError> {
        self.put(key, StructuredData::Bool(value))
    }

    pub fn put_integral(
        self,
        key: impl Into<String>,
        value: i64,
    ) -> Result<DataBuilder, BuilderError> {
        self.put(key, StructuredData::Integral(value))
    }

    pub fn put_floating_point(
        self,
        key: impl Into<String>,
        value: f64,
    ) -> Result<DataBuilder, BuilderError> {
        self.put(key, StructuredData::FloatingPoint(value))
    }

    pub fn put_string(
        self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<DataBuilder, BuilderError> {
        self.put(key, StructuredData::String(value.into()))
    }

    pub fn put_undefined(self, key: impl Into<String>) -> Result<DataBuilder, BuilderError> {
        self.put(key, StructuredData::Undefined)
    }

    /// Insert an already-finished value under `key` in the current map
    /// frame. A repeated key replaces the earlier value.
    pub fn put(
        mut self,
        key: impl Into<String>,
        value: StructuredData,
    ) -> Result<DataBuilder, BuilderError> {
        let key = key.into();
        match &mut self.current {
            Frame::Map { entries, .. } => {
                entries.insert(key, value);
                Ok(self)
            }
            Frame::List { .. } => Err(BuilderError::KeyedInList { key }),
        }
    }

    /// Open a nested list under `key` in the current map frame.
    pub fn put_list(mut self, key: impl Into<String>) -> Result<DataBuilder, BuilderError> {
        let key = key.into();
        match &self.current {
            Frame::Map { .. } => {
                self.stack.push(self.current);
                self.current = Frame::list(Some(key));
                Ok(self)
            }
            Frame::List { .. } => Err(BuilderError::KeyedInList { key }),
        }
    }

    /// Open a nested map under `key` in the current map frame.
    pub fn put_map(mut self, key: impl Into<String>) -> Result<DataBuilder, BuilderError> {
        let key = key.into();
        match &self.current {
            Frame::Map { .. } => {
                self.stack.push(self.current);
                self.current = Frame::map(Some(key));
                Ok(self)
            }
            Frame::List { .. } => Err(BuilderError::KeyedInList { key }),
        }
    }

    // ── closing frames ───────────────────────────────────────────────

    /// Close the current nested list and return to its parent frame.
    pub fn close_list(self) -> Result<DataBuilder, BuilderError> {
        match &self.current {
            Frame::List { .. } => self.close(),
            Frame::Map { .. } => Err(BuilderError::MismatchedClose {
                expected: "close_map",
            }),
        }
    }

    /// Close the current nested map and return to its parent frame.
    pub fn close_map(self) -> Result<DataBuilder, BuilderError> {
        match &self.current {
            Frame::Map { .. } => self.close(),
            Frame::List { .. } => Err(BuilderError::MismatchedClose {
                expected: "close_list",
            }),
        }
    }

    fn close(mut self) -> Result<DataBuilder, BuilderError> {
        let parent = self.stack.pop().ok_or(BuilderError::CloseWithoutOpen)?;
        let (value, slot) = finish(self.current);
        self.current = parent;
        match slot {
            Some(key) => self.put(key, value),
            None => self.add(value),
        }
    }

    /// Finalize the root container. Fails while nested frames are
    /// still open.
    pub fn build(self) -> Result<StructuredData, BuilderError> {
        if !self.stack.is_empty() {
            return Err(BuilderError::UnclosedContainer {
                open_frames: self.stack.len(),
            });
        }
        let (value, _) = finish(self.current);
        Ok(value)
    }
}

fn finish(frame: Frame) -> (StructuredData, Option<String>) {
    match frame {
        Frame::List { items, slot } => (StructuredData::List(ListValue(items)), slot),
        Frame::Map { entries, slot } => (StructuredData::Map(MapValue(entries)), slot),
    }
}

// ──────────────────────────────────────────────
// Serde: seven distinct wire tags
// ──────────────────────────────────────────────

impl Serialize for StructuredData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StructuredData::Undefined => serializer.serialize_unit(),
            StructuredData::Bool(b) => serializer.serialize_bool(*b),
            StructuredData::Integral(i) => serializer.serialize_i64(*i),
            StructuredData::FloatingPoint(x) => serializer.serialize_f64(*x),
            StructuredData::String(s) => serializer.serialize_str(s),
            StructuredData::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            StructuredData::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for StructuredData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct V;

        impl<'de> Visitor<'de> for V {
            type Value = StructuredData;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a structured data value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(StructuredData::Undefined)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(StructuredData::Undefined)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(StructuredData::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(StructuredData::Integral(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(StructuredData::Integral)
                    .map_err(|_| E::custom(format!("integral value {} out of range", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(StructuredData::FloatingPoint(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(StructuredData::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(StructuredData::String(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(StructuredData::List(ListValue(items)))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = BTreeMap::new();
                while let Some((k, v)) = map.next_entry::<String, StructuredData>()? {
                    entries.insert(k, v);
                }
                Ok(StructuredData::Map(MapValue(entries)))
            }
        }

        deserializer.deserialize_any(V)
    }
}
