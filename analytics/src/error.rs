//! Error types for the healthcare analytics stages.
//!
//! - [`CsvError`] - reading and decoding the CSV file
//! - [`RecordError`] - turning CSV rows into patient records
//! - [`RenderError`] - drawing and saving the dashboard
//! - [`PipelineError`] - top-level errors returned by each stage
//!
//! Conversion is automatic via `From` implementations, so `?` works
//! across layers.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading a CSV file into a raw table.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Malformed CSV (bad quoting, ragged rows).
    #[error("Invalid CSV format: {0}")]
    Parse(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// A row has more cells than the header.
    #[error("Line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors while interpreting raw rows as patient records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A column the stage depends on is absent from the header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A date cell could not be parsed.
    #[error("Line {line}, column '{column}': cannot parse date '{value}'")]
    InvalidDate {
        line: usize,
        column: String,
        value: String,
    },

    /// A numeric cell could not be parsed.
    #[error("Line {line}, column '{column}': cannot parse number '{value}'")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors while drawing or saving the dashboard image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The plotting backend reported a failure.
    #[error("Chart drawing failed: {0}")]
    Drawing(String),

    /// Output directory could not be created.
    #[error("Cannot create output directory '{path}': {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for RenderError
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level error returned by the `check`, `analyze` and `dashboard` stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Record interpretation error.
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Dashboard rendering error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Writing an output file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a JSON summary failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for record conversion.
pub type RecordResult<T> = Result<T, RecordError>;

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for stage operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
