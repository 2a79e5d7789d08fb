//! Local list error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading the host-owned local list files.
#[derive(Debug, Error)]
pub enum LocalError {
    /// The file could not be read at all.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file contents were not a valid list.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
