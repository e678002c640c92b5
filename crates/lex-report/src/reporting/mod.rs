//! Report output module.
//!
//! This module turns an [`Analysis`] into the run's artifacts:
//! - a bar chart of numeric means ([`ChartRenderer`])
//! - the paginated PDF report ([`ReportComposer`])
//! - an optional JSON summary of the run ([`write_run_summary`])
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_report::reporting::{ChartRenderer, ReportComposer};
//!
//! let chart = ChartRenderer::default().render(&analysis.numeric_stats, "means.png".as_ref())?;
//! let document = ReportComposer::default().compose(
//!     &analysis,
//!     "Data Analysis Report",
//!     chart.as_deref(),
//!     "report.pdf".as_ref(),
//! )?;
//! println!("{} pages", document.page_count());
//! ```

mod chart;
mod document;

pub use chart::{ChartRenderer, mean_bars, value_range};
pub use document::{
    FontStyle, ImageItem, Page, PageItem, ReportComposer, ReportDocument, TextItem,
    categorical_block, numeric_block,
};

use crate::error::Result;
use crate::types::{Analysis, RunSummary};
use chrono::Local;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Assemble the machine-readable record of one run.
pub fn build_run_summary(
    input: &Path,
    output: &Path,
    chart: Option<&Path>,
    page_count: usize,
    analysis: Analysis,
) -> RunSummary {
    RunSummary {
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        input_file: input.display().to_string(),
        output_file: output.display().to_string(),
        chart_file: chart.map(|path| path.display().to_string()),
        page_count,
        analysis,
    }
}

/// `<stem>_analysis.json` next to the output document.
pub fn summary_path(output: &Path) -> PathBuf {
    sibling_path(output, "analysis.json")
}

/// `<stem>_chart.png` next to the output document.
pub fn default_chart_path(output: &Path) -> PathBuf {
    sibling_path(output, "chart.png")
}

fn sibling_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output.with_file_name(format!("{stem}_{suffix}"))
}

/// Write the run summary as pretty-printed JSON.
pub fn write_run_summary(summary: &RunSummary, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(summary)?.as_bytes())?;

    info!("Analysis saved: {}", path.display());
    Ok(path.to_path_buf())
}
