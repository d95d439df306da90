//! Store-reading error types.
//!
//! Every error carries the path or array name it concerns.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading store metadata.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The path holds neither Zarr v2 nor Zarr v3 group metadata.
    #[error("{path} is not a Zarr store (no .zgroup, .zmetadata, or zarr.json)")]
    NotAStore { path: PathBuf },

    /// A metadata file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A metadata file is not the expected JSON.
    #[error("invalid Zarr metadata at {path}: {source}")]
    InvalidMetadata {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// An array does not record its dimension names.
    #[error("array {array:?} has no dimension names (neither dimension_names nor _ARRAY_DIMENSIONS)")]
    MissingDimensionNames { array: String },

    /// An array records dimension names in an unusable form.
    #[error("array {array:?} has invalid dimension names: {reason}")]
    InvalidDimensionNames { array: String, reason: String },
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_store_display() {
        let err = StoreError::NotAStore {
            path: PathBuf::from("/data/example.zarr"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/example.zarr"));
        assert!(msg.contains("not a Zarr store"));
    }

    #[test]
    fn missing_dimension_names_display() {
        let err = StoreError::MissingDimensionNames {
            array: "state".to_string(),
        };
        assert!(err.to_string().contains("\"state\""));
    }

    #[test]
    fn invalid_metadata_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::InvalidMetadata {
            path: PathBuf::from(".zattrs"),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains(".zattrs"));
    }
}
