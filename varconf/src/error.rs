//! Error types for schema definition and persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a schema out of a container's variables.
///
/// These are programmer errors: they surface from constructors
/// ([`Group::new`](crate::variable::Group::new), [`codec::group`](crate::codec::group),
/// [`Config::new`](crate::Config::new)) and never from a load or save pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two variables of the same container share a key.
    #[error("key `{key}` is declared more than once")]
    DuplicateKey { key: String },
    /// A variable declared directly in a schema has an empty key.
    ///
    /// Only anonymous groups used as collection elements may have one.
    #[error("variable at position {position} has an empty key")]
    EmptyKey { position: usize },
}

/// Errors surfaced by [`Config`](crate::Config) load and save passes.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading, writing or copying the backing file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backing file is not valid JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The top-level document is valid JSON but not an object.
    #[error("expected a JSON object at the top level, found {found}")]
    NotAnObject { found: &'static str },
    /// Rendering the document failed.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The container's schema is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Human readable name of a JSON node kind, for diagnostics.
pub(crate) fn kind_name(node: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
