//! Configuration types for the report pipeline.
//!
//! Chart styling and document layout are plain values carried by
//! [`ReportConfig`]; nothing in the pipeline reads ambient global state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Strategy used to tag each field as numeric or categorical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClassificationStrategy {
    /// Tag from the first row's cell only (later rows are never consulted).
    #[default]
    FirstRow,
    /// Numeric when strictly more than half of the non-empty cells parse.
    MajorityVote,
}

/// RGB colour used by the chart renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Styling for the mean-value bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Fill colour of the bars.
    pub bar_color: Rgb,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            bar_color: Rgb(135, 206, 235),
            title: "Mean Values of Numeric Fields".to_string(),
            x_label: "Field".to_string(),
            y_label: "Mean".to_string(),
        }
    }
}

/// Page geometry and typography for the PDF document, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub page_width: f32,
    pub page_height: f32,
    /// Left and right margin.
    pub margin_x: f32,
    pub margin_top: f32,
    /// Space kept free at the bottom of each page for the footer.
    pub margin_bottom: f32,
    pub header_font_size: f32,
    pub section_font_size: f32,
    pub body_font_size: f32,
    pub footer_font_size: f32,
    /// Vertical advance for one body line.
    pub body_line_height: f32,
    /// Vertical advance for a section title.
    pub section_line_height: f32,
    /// Horizontal offset of the chart image from the page's left edge.
    pub image_x: f32,
    /// Rendered width of the chart image; height follows the aspect ratio.
    pub image_width: f32,
}

impl Default for DocumentLayout {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin_x: 28.35,
            margin_top: 28.35,
            margin_bottom: 56.7,
            header_font_size: 16.0,
            section_font_size: 13.0,
            body_font_size: 11.0,
            footer_font_size: 8.0,
            body_line_height: 22.7,
            section_line_height: 28.35,
            image_x: 42.5,
            image_width: 510.2,
        }
    }
}

impl DocumentLayout {
    /// Width available for text between the side margins.
    pub fn printable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin_x
    }

    /// Lowest baseline a body line may use before the page breaks.
    pub fn bottom_limit(&self) -> f32 {
        self.margin_bottom
    }
}

/// Configuration for the report pipeline.
///
/// Use [`ReportConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_report::config::{ClassificationStrategy, ReportConfig};
///
/// let config = ReportConfig::builder()
///     .classification(ClassificationStrategy::MajorityVote)
///     .chart_path("out/means.png")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// How fields are tagged numeric or categorical.
    /// Default: FirstRow
    pub classification: ClassificationStrategy,

    /// Field delimiter of the source table.
    /// Default: b','
    pub delimiter: u8,

    /// Decimal places kept in numeric summaries.
    /// Default: 2
    pub decimal_places: u32,

    /// Whether to render the mean-value chart at all.
    /// Default: true
    pub render_chart: bool,

    /// Where the chart image is written. When None, the pipeline derives
    /// `<output stem>_chart.png` next to the output document.
    /// Default: None
    pub chart_path: Option<PathBuf>,

    /// Chart styling.
    pub chart_style: ChartStyle,

    /// Document geometry and typography.
    pub layout: DocumentLayout,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            classification: ClassificationStrategy::default(),
            delimiter: b',',
            decimal_places: 2,
            render_chart: true,
            chart_path: None,
            chart_style: ChartStyle::default(),
            layout: DocumentLayout::default(),
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.decimal_places > 10 {
            return Err(ConfigValidationError::InvalidDecimalPlaces(
                self.decimal_places,
            ));
        }

        if matches!(self.delimiter, b'\n' | b'\r' | b'"') {
            return Err(ConfigValidationError::InvalidDelimiter(
                self.delimiter as char,
            ));
        }

        if self.chart_style.width == 0 || self.chart_style.height == 0 {
            return Err(ConfigValidationError::InvalidChartSize {
                width: self.chart_style.width,
                height: self.chart_style.height,
            });
        }

        let layout = &self.layout;
        let dimensions = [
            ("page_width", layout.page_width),
            ("page_height", layout.page_height),
            ("header_font_size", layout.header_font_size),
            ("section_font_size", layout.section_font_size),
            ("body_font_size", layout.body_font_size),
            ("footer_font_size", layout.footer_font_size),
            ("body_line_height", layout.body_line_height),
            ("section_line_height", layout.section_line_height),
            ("image_width", layout.image_width),
        ];
        for (field, value) in dimensions {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigValidationError::InvalidDimension {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if layout.printable_width() <= 0.0
            || layout.page_height - layout.margin_top - layout.margin_bottom <= 0.0
        {
            return Err(ConfigValidationError::NoPrintableArea);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid decimal places: {0} (must be at most 10)")]
    InvalidDecimalPlaces(u32),

    #[error("Invalid delimiter: {0:?}")]
    InvalidDelimiter(char),

    #[error("Invalid chart size: {width}x{height} (both must be positive)")]
    InvalidChartSize { width: u32, height: u32 },

    #[error("Invalid layout dimension '{field}': {value} (must be positive)")]
    InvalidDimension { field: String, value: f32 },

    #[error("Page margins leave no printable area")]
    NoPrintableArea,
}

impl From<ConfigValidationError> for crate::error::ReportError {
    fn from(error: ConfigValidationError) -> Self {
        crate::error::ReportError::InvalidConfig(error.to_string())
    }
}

/// Builder for [`ReportConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    classification: Option<ClassificationStrategy>,
    delimiter: Option<u8>,
    decimal_places: Option<u32>,
    render_chart: Option<bool>,
    chart_path: Option<PathBuf>,
    chart_style: Option<ChartStyle>,
    layout: Option<DocumentLayout>,
}

impl ReportConfigBuilder {
    /// Set the field classification strategy.
    pub fn classification(mut self, strategy: ClassificationStrategy) -> Self {
        self.classification = Some(strategy);
        self
    }

    /// Set the source table's field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set how many decimal places numeric summaries keep.
    pub fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = Some(places);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_chart(mut self, render: bool) -> Self {
        self.render_chart = Some(render);
        self
    }

    /// Set an explicit path for the chart image.
    pub fn chart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_path = Some(path.into());
        self
    }

    pub fn chart_style(mut self, style: ChartStyle) -> Self {
        self.chart_style = Some(style);
        self
    }

    pub fn layout(mut self, layout: DocumentLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ReportConfig` or an error if validation fails.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let config = ReportConfig {
            classification: self.classification.unwrap_or_default(),
            delimiter: self.delimiter.unwrap_or(b','),
            decimal_places: self.decimal_places.unwrap_or(2),
            render_chart: self.render_chart.unwrap_or(true),
            chart_path: self.chart_path,
            chart_style: self.chart_style.unwrap_or_default(),
            layout: self.layout.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
