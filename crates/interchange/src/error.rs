use arbor_core::{BuilderError, PathError};

/// All errors that can occur while reading or assembling wire
/// documents.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WireError {
    /// A required field is absent from the document.
    #[error("missing required field: '{field}'")]
    MissingField { field: String },

    /// A field is present but has the wrong JSON type.
    #[error("field '{field}' must be {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    /// A path string in the document failed to decode under the
    /// supplied context.
    #[error("path in field '{field}': {source}")]
    BadPath {
        field: String,
        #[source]
        source: PathError,
    },

    /// An entity payload does not agree with the kind its path
    /// addresses.
    #[error("entity kind mismatch: path addresses {path_kind} but payload is {payload_kind}")]
    KindMismatch {
        path_kind: &'static str,
        payload_kind: &'static str,
    },

    /// An enumerated name (unit, data kind) is not in the closed set.
    #[error("unknown {what}: '{value}'")]
    UnknownName { what: &'static str, value: String },

    /// A structured data document could not be assembled.
    #[error("structured data: {message}")]
    Data { message: String },
}

impl WireError {
    pub(crate) fn missing(field: &str) -> WireError {
        WireError::MissingField {
            field: field.to_string(),
        }
    }

    pub(crate) fn field_type(field: &str, expected: &'static str) -> WireError {
        WireError::FieldType {
            field: field.to_string(),
            expected,
        }
    }

    pub(crate) fn bad_path(field: &str, source: PathError) -> WireError {
        WireError::BadPath {
            field: field.to_string(),
            source,
        }
    }

    pub(crate) fn builder(source: BuilderError) -> WireError {
        WireError::Data {
            message: source.to_string(),
        }
    }
}
