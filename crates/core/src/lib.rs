//! arbor-core: inventory path addressing and structured data model.
//!
//! Provides the hierarchical addressing subsystem of the arbor
//! inventory API -- canonical and relative paths with context-sensitive
//! ("detyped") textual encodings -- and the recursive structured data
//! value used for typed configuration payloads.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`CanonicalPath`] / [`RelativePath`] / [`Path`] -- immutable
//!   address value types
//! - [`ParsingContext`] -- explicit per-call context for resolving
//!   partially-typed path strings
//! - [`EntityType`] -- the closed table of entity kinds and permitted
//!   child edges
//! - [`StructuredData`] / [`DataBuilder`] -- tagged configuration
//!   values and their construction protocol
//! - [`PathError`] / [`BuilderError`] -- the error taxonomy
//!
//! All finished values are immutable and freely shared across threads;
//! nothing in this crate performs I/O or blocks.

pub mod data;
pub mod error;
pub mod grammar;
pub mod hierarchy;
pub mod path;
pub mod resolve;

// ── Convenience re-exports: key types ────────────────────────────────

pub use data::{DataBuilder, ListValue, MapValue, StructuredData};
pub use error::{BuilderError, PathError};
pub use hierarchy::EntityType;
pub use path::{CanonicalPath, Path, RelativePath, Segment};
pub use resolve::ParsingContext;
