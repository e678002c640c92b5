//! Custom error types for the report pipeline.
//!
//! This module provides the run-level error hierarchy using `thiserror`.
//! Failures confined to a single field are not errors at this level; they
//! are carried as [`FieldOutcome::Error`](crate::types::FieldOutcome) values
//! inside the analysis so the run can continue.
//!
//! Errors are serializable so they can be emitted alongside JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the report pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The input table does not exist.
    #[error("File not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The input could not be read as a table (e.g. missing header row).
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// The table has a header but no data rows.
    #[error("No data found in the file.")]
    EmptyTable,

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Chart rendering failed.
    #[error("Failed to render chart: {0}")]
    ChartRenderFailed(String),

    /// Document layout or serialization failed.
    #[error("Failed to compose document: {0}")]
    DocumentFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// PDF writer error wrapper.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Image decoding error wrapper.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReportError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            Self::MalformedTable(_) => "MALFORMED_TABLE",
            Self::EmptyTable => "EMPTY_TABLE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ChartRenderFailed(_) => "CHART_RENDER_FAILED",
            Self::DocumentFailed(_) => "DOCUMENT_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Pdf(_) => "PDF_ERROR",
            Self::Image(_) => "IMAGE_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error happened while loading the source, before any
    /// analysis was attempted.
    pub fn is_load_failure(&self) -> bool {
        match self {
            Self::SourceNotFound(_) | Self::MalformedTable(_) | Self::EmptyTable => true,
            Self::WithContext { source, .. } => source.is_load_failure(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ReportError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ReportError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

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
        self.map_err(|e| ReportError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ReportError::Io(e).with_context(context))
    }
}
