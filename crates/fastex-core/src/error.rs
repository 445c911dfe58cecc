use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed query: condition `{condition}` has more than one unquoted ':'")]
    MalformedQuery { condition: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: invalid JSON record: {source}", .path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal findings raised while resolving a schema or building a query.
///
/// These are logged as they are produced and kept around so callers can
/// surface them next to results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A qualified condition names a field the schema does not declare.
    UnknownField(String),
    /// A field's type is neither primitive nor a declared composite type.
    UnresolvedType { field: String, type_name: String },
    /// A composite type refers back to itself through its fields.
    CyclicType { field: String, type_name: String },
    /// Two fields with the same name at one nesting level.
    DuplicateField(String),
    /// A `regex-validation` pattern that does not compile; the field is left unchecked.
    InvalidPattern { field: String, message: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownField(name) => write!(f, "Unknown search field {}", name),
            Diagnostic::UnresolvedType { field, type_name } => {
                write!(f, "Field {} has unresolved type {}", field, type_name)
            }
            Diagnostic::CyclicType { field, type_name } => {
                write!(f, "Field {} has cyclic type {}", field, type_name)
            }
            Diagnostic::DuplicateField(name) => write!(f, "Duplicate field {}", name),
            Diagnostic::InvalidPattern { field, message } => {
                write!(f, "Field {} has an invalid regex-validation pattern: {}", field, message)
            }
        }
    }
}
