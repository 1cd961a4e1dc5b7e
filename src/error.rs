//! Error types for the CNV heatmap pipeline

use thiserror::Error;

/// Main error type for CNV pipeline operations
#[derive(Error, Debug)]
pub enum CnvError {
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Required column '{column}' not found in input table")]
    MissingColumn { column: String },

    #[error("Invalid input table: {reason}")]
    InvalidTable { reason: String },

    #[error("No rows matched gene '{gene}'")]
    GeneNotFound { gene: String },

    #[error("Sample column '{sample}' not found in table for gene '{gene}'")]
    MissingSampleColumn { sample: String, gene: String },

    #[error("Malformed ratio value '{value}' in column '{column}', row {row}")]
    MalformedValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Render error: {reason}")]
    Render { reason: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for CNV pipeline operations
pub type Result<T> = std::result::Result<T, CnvError>;
