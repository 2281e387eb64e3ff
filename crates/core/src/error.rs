//! Error types for path parsing, resolution, and structured-data
//! construction.
//!
//! All errors are surfaced synchronously at the point of
//! parse/construct/build. None of them describe transient conditions,
//! so callers must propagate them rather than retry or substitute a
//! default value.

use std::fmt;

use crate::hierarchy::EntityType;

// ──────────────────────────────────────────────
// Path errors
// ──────────────────────────────────────────────

/// Errors from tokenizing, resolving, or extending a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The token stream is malformed: bad type code, misplaced `..`,
    /// bad escape, empty segment or id.
    Grammar { offset: usize, message: String },
    /// A segment sequence breaks the permitted-child table, or an
    /// up-count exceeds the depth of the origin it is resolved
    /// against.
    HierarchyViolation { message: String },
    /// Detyping cannot uniquely resolve a missing type code from the
    /// given context: more than one legal typing survives.
    AmbiguousType {
        segment: String,
        candidates: Vec<EntityType>,
    },
}

impl PathError {
    pub(crate) fn grammar(offset: usize, message: impl Into<String>) -> Self {
        PathError::Grammar {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn hierarchy(message: impl Into<String>) -> Self {
        PathError::HierarchyViolation {
            message: message.into(),
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Grammar { offset, message } => {
                write!(f, "malformed path at offset {}: {}", offset, message)
            }
            PathError::HierarchyViolation { message } => {
                write!(f, "hierarchy violation: {}", message)
            }
            PathError::AmbiguousType {
                segment,
                candidates,
            } => {
                write!(
                    f,
                    "ambiguous type for segment '{}': candidates are {}",
                    segment,
                    candidates
                        .iter()
                        .map(|t| t.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PathError {}

// ──────────────────────────────────────────────
// Builder protocol errors
// ──────────────────────────────────────────────

/// Violations of the structured-data builder protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// `build()` was called while a nested container frame is open.
    UnclosedContainer { open_frames: usize },
    /// `close_list()`/`close_map()` was called with no open nested
    /// frame (the root container is closed by `build()`, not by a
    /// close call).
    CloseWithoutOpen,
    /// `close_list()` on a map frame, or `close_map()` on a list
    /// frame.
    MismatchedClose { expected: &'static str },
    /// A keyed `put_*` call while the current frame is a list.
    KeyedInList { key: String },
    /// An unkeyed `add_*` call while the current frame is a map.
    UnkeyedInMap,
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::UnclosedContainer { open_frames } => {
                write!(
                    f,
                    "build() with {} unclosed container frame(s)",
                    open_frames
                )
            }
            BuilderError::CloseWithoutOpen => {
                write!(f, "close called with no open nested container")
            }
            BuilderError::MismatchedClose { expected } => {
                write!(f, "mismatched close: current frame needs {}", expected)
            }
            BuilderError::KeyedInList { key } => {
                write!(f, "keyed put of '{}' while building a list", key)
            }
            BuilderError::UnkeyedInMap => {
                write!(f, "unkeyed add while building a map")
            }
        }
    }
}

impl std::error::Error for BuilderError {}
