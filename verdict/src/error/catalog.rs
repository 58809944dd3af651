//! Message catalog error types

use std::path::PathBuf;

/// Errors that can occur while loading a message catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not a flat JSON object of strings.
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CatalogError {
    /// Creates a new I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
