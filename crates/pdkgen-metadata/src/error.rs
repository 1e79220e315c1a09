//! Metadata error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading module metadata.
///
/// Every variant is fatal for a generation run: glue generated from a partial
/// view of the bindings would link silently-wrong code.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A referenced module could not be located.
    #[error("module `{name}` not found (looked for {path})")]
    MissingModule { name: String, path: PathBuf },

    /// The metadata file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata file is not a valid module description.
    #[error("malformed module metadata in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file describes a different module than the one requested.
    #[error("{path} describes module `{found}`, expected `{expected}`")]
    NameMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

/// Metadata result type alias.
pub type MetadataResult<T> = Result<T, MetadataError>;
