//! Progress reporting for the report pipeline.
//!
//! The pipeline runs synchronously on the caller's thread; updates are
//! delivered inline, in stage order.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_report::ReportPipeline;
//!
//! let outcome = ReportPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("data.csv", "report.pdf", "Data Analysis Report")?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the report pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStage {
    /// Reading the source table
    Loading,
    /// Tagging fields numeric or categorical
    Classifying,
    /// Computing per-field statistics
    Summarizing,
    /// Rendering the mean-value chart
    Charting,
    /// Laying out and writing the document
    Composing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl ReportStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Table",
            Self::Classifying => "Classifying Fields",
            Self::Summarizing => "Summarizing Fields",
            Self::Charting => "Rendering Chart",
            Self::Composing => "Composing Report",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run attributed to this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.30,
            Self::Classifying => 0.05,
            Self::Summarizing => 0.25,
            Self::Charting => 0.15,
            Self::Composing => 0.25,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Classifying => 0.30,
            Self::Summarizing => 0.35,
            Self::Charting => 0.60,
            Self::Composing => 0.75,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: ReportStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates an update part-way through `stage`.
    pub fn new(stage: ReportStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + stage.weight() * stage_progress.clamp(0.0, 1.0);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: ReportStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: ReportStage::Failed,
            progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates from the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_stage_weights_cover_run() {
        let stages = [
            ReportStage::Loading,
            ReportStage::Classifying,
            ReportStage::Summarizing,
            ReportStage::Charting,
            ReportStage::Composing,
        ];
        let total: f32 = stages.iter().map(ReportStage::weight).sum();
        assert!((total - 1.0).abs() < 1e-6);

        for pair in stages.windows(2) {
            let expected = pair[0].base_progress() + pair[0].weight();
            assert!((pair[1].base_progress() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        let update = ProgressUpdate::new(ReportStage::Composing, 4.0, "done");
        assert!((update.progress - 1.0).abs() < 1e-6);

        let update = ProgressUpdate::new(ReportStage::Summarizing, 0.5, "half");
        assert!((update.progress - 0.475).abs() < 1e-6);
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Mutex::new(Vec::new());
        let reporter = ClosureProgressReporter::new(|update: ProgressUpdate| {
            seen.lock().unwrap().push(update.stage);
        });

        reporter.report(ProgressUpdate::new(ReportStage::Loading, 0.0, "start"));
        reporter.report(ProgressUpdate::complete("end"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ReportStage::Loading, ReportStage::Complete]
        );
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&ReportStage::Charting).unwrap();
        assert_eq!(json, "\"charting\"");
    }
}
