//! Error types for document import and bulk transforms

use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure for one input document
///
/// Item-level problems inside an otherwise valid document are not errors;
/// they are collected as [`crate::import::ItemFailure`] values instead.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The text could not be decoded as JSON (or YAML for `.yaml` files)
    #[error("Invalid document syntax: {0}")]
    Syntax(String),

    /// The document decoded fine but is neither a Postman collection nor a Swagger/OpenAPI spec
    #[error("Unsupported document format: {0}")]
    Format(String),

    /// The document could not be read from disk
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Syntax(err.to_string())
    }
}

impl From<serde_yaml::Error> for ImportError {
    fn from(err: serde_yaml::Error) -> Self {
        ImportError::Syntax(err.to_string())
    }
}

/// Why a single Postman item or Swagger operation was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("{0} is not a JSON object")]
    NotAnObject(&'static str),

    #[error("item has neither an `item` array nor a `request`")]
    InvalidShape,

    #[error("field `{field}` should be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("request has no usable URL")]
    MissingUrl,
}

/// Reasons a bulk transform refuses to run
///
/// Both variants guarantee that no entity was touched.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("No operations defined: configure find/replace or a header operation")]
    NoOperation,
}
