//! Error types for collection and configuration loading.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! deserialization, a collection that cannot be found, and a collection that
//! fails validation.

use std::path::PathBuf;

use rinvoke_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while locating or loading files.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// No collection file with the given name exists under the search root.
    #[error("Can't find any collection named '{0}'!")]
    NotFound(String),

    /// The file extension is not one of the supported formats.
    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The collection parsed but violates a structural invariant.
    #[error("invalid collection {}: {}", .path.display(), join_errors(.errors))]
    InvalidCollection {
        path: PathBuf,
        errors: Vec<ValidationError>,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
