//! Build error types.

use std::path::PathBuf;

use pdkgen_metadata::MetadataError;
use thiserror::Error;

/// Fatal errors of a build or verification run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A generated file name that is not a plain file name (`a/b`, `..`).
    #[error("generated file name `{name}` is not a plain file name")]
    InvalidFileName { name: String },

    #[error("invalid wasm module: {0}")]
    InvalidWasm(#[from] wasmparser::BinaryReaderError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Build result type alias.
pub type BuildResult<T> = Result<T, BuildError>;
