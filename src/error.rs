use std::path::PathBuf;
use thiserror::Error;

use crate::augment::PipelineState;
use crate::validation::ValidationReport;

/// The main error type for dictaug operations.
#[derive(Debug, Error)]
pub enum DictaugError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dict JSON from {path}: {source}")]
    DictParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write dict JSON to {path}: {source}")]
    DictWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot encode manifest: required field '{field}' is not set")]
    MissingField { field: &'static str },

    #[error("Cannot {operation} while the pipeline is {state}")]
    InvalidState {
        operation: &'static str,
        state: PipelineState,
    },

    #[error("Manifest validation failed with {error_count} error(s):\n{}", report.messages().join("\n"))]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Save was cancelled")]
    Cancelled,

    #[error("Augmented sample {index} has no {field}")]
    IncompleteSample { index: usize, field: &'static str },

    #[error("Augmented sample {index} has file name '{name}', expected a bare file name")]
    InvalidFileName { index: usize, name: String },

    #[error("Image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
