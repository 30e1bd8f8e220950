//! Error types for the collaborators around the analysis core.
//!
//! `analysis` and `history` never fail; everything here comes from loading
//! data, running transforms, or writing exports.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file type '{0}' (expected csv, tsv, json, jsonl or ndjson)")]
    UnsupportedFormat(String),

    #[error("File has no header row")]
    NoHeaders,

    #[error("Expected a JSON array of objects")]
    NotAnArray,
}

/// Failure reported by a transform collaborator
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Transform failed: {message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from workspace-level operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkspaceError {
    #[error("No dataset loaded")]
    NoDataset,

    #[error("No column selected")]
    NoColumnSelected,

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Errors raised while serializing a frequency table
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unknown export format '{0}' (expected table, csv or json)")]
    UnknownFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            WorkspaceError::from(TransformError::new("bad column")).to_string(),
            "Transform failed: bad column"
        );
        assert_eq!(WorkspaceError::NoColumnSelected.to_string(), "No column selected");
        assert!(DatasetError::UnsupportedFormat("xls".into())
            .to_string()
            .contains("'xls'"));
    }
}
