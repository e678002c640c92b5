//! Report pipeline builder and orchestration.

use crate::config::{ConfigValidationError, ReportConfig};
use crate::error::{ReportError, Result};
use crate::pipeline::progress::{
    ClosureProgressReporter, ProgressReporter, ProgressUpdate, ReportStage,
};
use crate::profiler::DatasetAnalyzer;
use crate::reporting::{ChartRenderer, ReportComposer, build_run_summary, default_chart_path};
use crate::table::TableLoader;
use crate::types::RunSummary;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Loads a table, analyses it and writes the PDF report.
///
/// Use [`ReportPipeline::builder()`] to create a pipeline with custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_report::{ReportConfig, ReportPipeline};
///
/// let summary = ReportPipeline::builder()
///     .config(ReportConfig::builder().render_chart(false).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run("customers.csv", "report.pdf", "Data Analysis Report")?;
///
/// println!("{} pages", summary.page_count);
/// ```
pub struct ReportPipeline {
    config: ReportConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    loader: TableLoader,
    analyzer: DatasetAnalyzer,
    charts: ChartRenderer,
    composer: ReportComposer,
}

impl ReportPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> ReportPipelineBuilder {
        ReportPipelineBuilder::default()
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Run the whole pipeline for one source table.
    ///
    /// Only load-time failures and errors while writing artifacts abort the
    /// run; a field that cannot be summarized is reported inside the
    /// returned analysis instead.
    ///
    /// # Errors
    ///
    /// - [`ReportError::SourceNotFound`] if `input` does not exist.
    /// - [`ReportError::MalformedTable`] if `input` has no header row.
    /// - [`ReportError::EmptyTable`] if `input` has a header but no rows.
    pub fn run(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        title: &str,
    ) -> Result<RunSummary> {
        match self.run_internal(input.as_ref(), output.as_ref(), title) {
            Ok(summary) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Report generated: {}",
                    summary.output_file
                )));
                Ok(summary)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Report pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, input: &Path, output: &Path, title: &str) -> Result<RunSummary> {
        let start_time = Instant::now();
        info!("Starting report pipeline for {}", input.display());

        // Step 1: Load
        self.report_progress(ProgressUpdate::new(
            ReportStage::Loading,
            0.0,
            format!("Loading {}", input.display()),
        ));
        let table = self.loader.load(input)?;
        if table.is_empty() {
            return Err(ReportError::EmptyTable);
        }

        // Step 2: Classify and summarize
        self.report_progress(ProgressUpdate::new(
            ReportStage::Classifying,
            0.0,
            format!("Classifying {} fields", table.width()),
        ));
        let analysis = self.analyzer.analyze(&table);
        drop(table);
        self.report_progress(ProgressUpdate::new(
            ReportStage::Summarizing,
            1.0,
            format!(
                "Summarized {} numeric and {} categorical fields",
                analysis.numeric_stats.len(),
                analysis.categorical_stats.len()
            ),
        ));

        // Step 3: Chart
        let chart = if self.config.render_chart {
            self.report_progress(ProgressUpdate::new(
                ReportStage::Charting,
                0.0,
                "Rendering mean-value chart",
            ));
            let chart_path = self
                .config
                .chart_path
                .clone()
                .unwrap_or_else(|| default_chart_path(output));
            self.charts.render(&analysis.numeric_stats, &chart_path)?
        } else {
            info!("Chart rendering disabled");
            None
        };

        // Step 4: Compose
        self.report_progress(ProgressUpdate::new(
            ReportStage::Composing,
            0.0,
            format!("Writing {}", output.display()),
        ));
        let document = self
            .composer
            .compose(&analysis, title, chart.as_deref(), output)?;

        info!(
            "Report pipeline finished in {:.2?} ({} pages, {} field errors)",
            start_time.elapsed(),
            document.page_count(),
            analysis.field_errors().len()
        );

        Ok(build_run_summary(
            input,
            output,
            chart.as_deref(),
            document.page_count(),
            analysis,
        ))
    }
}

/// Builder for creating a [`ReportPipeline`] instance.
///
/// Use [`ReportPipeline::builder()`] to get started.
#[derive(Default)]
pub struct ReportPipelineBuilder {
    config: Option<ReportConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl ReportPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: ReportConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<ReportPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(ReportPipeline {
            loader: TableLoader::new().with_delimiter(config.delimiter),
            analyzer: DatasetAnalyzer::from_config(&config),
            charts: ChartRenderer::new(config.chart_style.clone()),
            composer: ReportComposer::new(config.layout.clone()),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}
