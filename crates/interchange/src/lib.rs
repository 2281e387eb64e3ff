//! arbor-interchange: JSON wire mapping for the arbor inventory model.
//!
//! Provides the wire codec for structured data (seven distinct tags,
//! numeric kinds never collapsed), context-bound path decoding, and
//! the entity/relationship records that embed both.
//!
//! Every decode that may meet a partially-typed path takes an explicit
//! [`arbor_core::ParsingContext`] (or a [`PathDecoder`] bound to one);
//! nothing in this crate holds ambient parsing state.

pub mod codec;
pub mod entity;
mod error;

pub use codec::{data_from_json, data_to_json, PathDecoder};
pub use entity::{
    Entity, EntityPayload, MetricDataKind, MetricUnit, Properties, Relationship, Update,
};
pub use error::WireError;
