//! Pipeline module.
//!
//! This module provides the end-to-end report pipeline and its progress
//! reporting.

mod builder;
pub mod progress;

pub use builder::{ReportPipeline, ReportPipelineBuilder};
pub use progress::{ClosureProgressReporter, ProgressReporter, ProgressUpdate, ReportStage};
