//! Custom error types for the loyalty EDA pipeline.
//!
//! This module provides the error hierarchy used throughout the crate,
//! built with `thiserror`. Column-level problems (a missing column, a column
//! of the wrong kind) are *not* errors: they are reported as
//! [`ColumnIssue`](crate::types::ColumnIssue)s and the operation continues.
//! The variants here are the failures that stop an operation.
//!
//! Errors serialize as `{ code, message }` so they can be embedded in the
//! JSON output of the CLI.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the EDA pipeline.
#[derive(Error, Debug)]
pub enum EdaError {
    /// File extension or save format is not one of the supported ones.
    #[error("Unsupported format '{0}' (use .csv, .xlsx, .xls or .json to load; csv or excel to save)")]
    UnsupportedFormat(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// A value in the column could not be converted to the requested kind.
    #[error("Failed to convert column '{column}' to {target}: {reason}")]
    TypeCoercion {
        column: String,
        target: String,
        reason: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Not enough data for a statistical test.
    #[error("Insufficient data for {test}: {reason}")]
    InsufficientData { test: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Statistical test rejected its input.
    #[error("Statistics error: {0}")]
    Statistics(#[from] anofox_statistics::StatError),

    /// Spreadsheet reading error.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Spreadsheet writing error.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::TypeCoercion { .. } => "TYPE_COERCION_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Statistics(_) => "STATISTICS_ERROR",
            Self::ExcelRead(_) => "EXCEL_READ_ERROR",
            Self::ExcelWrite(_) => "EXCEL_WRITE_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is an unsupported file or save format.
    pub fn is_unsupported_format(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_) => true,
            Self::WithContext { source, .. } => source.is_unsupported_format(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for EDA operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}
