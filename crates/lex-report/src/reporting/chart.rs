//! Bar chart of numeric-field means.

use crate::config::{ChartStyle, Rgb};
use crate::error::{ReportError, Result};
use crate::types::NumericEntry;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Renders the mean-value chart as a PNG image.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    style: ChartStyle,
}

impl ChartRenderer {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }

    /// Render one bar per summarized numeric field and write it to `path`.
    ///
    /// Returns `Ok(None)` without touching the filesystem when no field has
    /// a mean to plot.
    pub fn render(&self, stats: &[NumericEntry], path: &Path) -> Result<Option<PathBuf>> {
        let bars = mean_bars(stats);
        if bars.is_empty() {
            info!("No numeric means available; chart skipped");
            return Ok(None);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        self.draw(&bars, path)
            .map_err(|e| ReportError::ChartRenderFailed(e.to_string()))?;

        info!("Chart saved: {} ({} bars)", path.display(), bars.len());
        Ok(Some(path.to_path_buf()))
    }

    fn draw(
        &self,
        bars: &[(String, f64)],
        path: &Path,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let style = &self.style;
        let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (y_min, y_max) = value_range(bars);
        let labels: Vec<&str> = bars.iter().map(|(field, _)| field.as_str()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(&style.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(100)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..bars.len() as u32).into_segmented(), y_min..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            // Upright labels keep long field names from overlapping.
            .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
            .x_desc(&style.x_label)
            .y_desc(&style.y_label)
            .x_label_formatter(&|segment| match segment {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels
                    .get(*i as usize)
                    .map(|label| label.to_string())
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            })
            .draw()?;

        let Rgb(r, g, b) = style.bar_color;
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(RGBColor(r, g, b).filled())
                .margin(10)
                .data(
                    bars.iter()
                        .enumerate()
                        .map(|(position, (_, mean))| (position as u32, *mean)),
                ),
        )?;

        root.present()?;
        Ok(())
    }
}

/// Field labels and means for every summarized numeric field, in order.
///
/// Error entries carry no mean and are skipped, as are non-finite means.
pub fn mean_bars(stats: &[NumericEntry]) -> Vec<(String, f64)> {
    stats
        .iter()
        .filter_map(|entry| {
            let summary = entry.outcome.summary()?;
            if !summary.mean.is_finite() {
                warn!("Field '{}' has a non-finite mean; not charted", entry.field);
                return None;
            }
            Some((entry.field.clone(), summary.mean))
        })
        .collect()
}

/// Y-axis range that always includes zero, padded by 10%.
pub fn value_range(bars: &[(String, f64)]) -> (f64, f64) {
    let low = bars.iter().map(|(_, v)| *v).fold(0.0, f64::min);
    let high = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    if low == high {
        return (0.0, 1.0);
    }
    (low * 1.1, high * 1.1)
}
