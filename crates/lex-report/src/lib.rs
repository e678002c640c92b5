//! CSV Analysis Report Library
//!
//! Turns a delimited-text table into a paginated PDF report with descriptive
//! statistics and a bar chart of numeric means.
//!
//! # Overview
//!
//! - **Loading**: Header-first delimited text read into an all-string [`Table`]
//! - **Classification**: Each field tagged numeric or categorical
//! - **Summaries**: Mean, median, sample stdev, min and max for numeric fields;
//!   distinct count and most common value for categorical fields
//! - **Chart**: One bar per numeric field's mean
//! - **Report**: Paginated PDF with a header, page footer and optional chart page
//! - **Progress Reporting**: Per-stage progress updates
//!
//! A field whose summary cannot be computed is recorded as an error inside
//! the [`Analysis`]; it never aborts the run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_report::{ReportConfig, ReportPipeline};
//!
//! let summary = ReportPipeline::builder()
//!     .config(ReportConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("customers.csv", "report.pdf", "Data Analysis Report")?;
//!
//! for (field, message) in summary.analysis.field_errors() {
//!     println!("{field}: {message}");
//! }
//! ```
//!
//! # Lower-level use
//!
//! ```rust,ignore
//! use lex_report::{DatasetAnalyzer, TableLoader};
//!
//! let table = TableLoader::new().load("customers.csv".as_ref())?;
//! let analysis = DatasetAnalyzer::default().analyze(&table);
//! println!("{}", serde_json::to_string_pretty(&analysis)?);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ChartStyle, ClassificationStrategy, ConfigValidationError, DocumentLayout, ReportConfig,
    ReportConfigBuilder, Rgb,
};
pub use error::{ReportError, Result as ReportResult, ResultExt};
pub use pipeline::{
    ClosureProgressReporter, ProgressReporter, ProgressUpdate, ReportPipeline,
    ReportPipelineBuilder, ReportStage,
};
pub use profiler::{DatasetAnalyzer, FieldClassifier, Summarizer};
pub use reporting::{ChartRenderer, ReportComposer, ReportDocument};
pub use table::{Row, Table, TableLoader};
pub use types::{
    Analysis, CategoricalEntry, CategoricalSummary, FieldClassification, FieldEntry, FieldKind,
    FieldOutcome, NumericEntry, NumericSummary, RunSummary,
};
pub use utils::{format_number, parse_float, round_to};
