//! PDF report composition.
//!
//! Composition happens in two steps. [`ReportComposer::layout`] places every
//! line of text and the optional chart image onto pages, producing a
//! [`ReportDocument`]. [`ReportDocument::write_pdf`] then serializes those
//! pages with `lopdf` using the standard Type1 Helvetica faces.

use crate::config::DocumentLayout;
use crate::error::{ReportError, Result};
use crate::types::{Analysis, CategoricalEntry, FieldOutcome, NumericEntry};
use crate::utils::format_number;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Average glyph advance of Helvetica as a fraction of the font size.
const AVERAGE_CHAR_WIDTH: f32 = 0.5;
const BOLD_CHAR_WIDTH: f32 = 0.55;

/// Space left under a section title before its body.
const TITLE_GAP: f32 = 5.67;

/// Grey level of section and body text.
const BODY_GRAY: u8 = 40;

/// Font face of a text item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

impl FontStyle {
    fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Italic => "Helvetica-Oblique",
        }
    }

    fn char_width(self) -> f32 {
        match self {
            Self::Bold => BOLD_CHAR_WIDTH,
            Self::Regular | Self::Italic => AVERAGE_CHAR_WIDTH,
        }
    }
}

/// One line of text at an absolute position (PDF user space, origin at the
/// bottom-left corner, `y` is the baseline).
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    /// 0 is black, 255 is white.
    pub gray: u8,
    pub text: String,
}

/// An RGB image scaled into the rectangle whose lower-left corner is
/// (`x`, `y`).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageItem {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub pixels: RgbImage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Text(TextItem),
    Image(ImageItem),
}

/// A laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    number: usize,
    items: Vec<PageItem>,
}

impl Page {
    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn items(&self) -> &[PageItem] {
        &self.items
    }

    /// Text of every line on the page, in placement order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text(text) => Some(text.text.as_str()),
            PageItem::Image(_) => None,
        })
    }

    pub fn has_image(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, PageItem::Image(_)))
    }
}

/// A fully laid-out report, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    title: String,
    page_width: f32,
    page_height: f32,
    pages: Vec<Page>,
}

impl ReportDocument {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every text line of the document, page by page.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::lines)
    }

    /// Serialize the document as a PDF file at `path`.
    pub fn write_pdf(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut pdf = self.to_pdf()?;
        pdf.save(path).map_err(|e| {
            ReportError::DocumentFailed(format!("could not write {}: {e}", path.display()))
        })?;

        info!(
            "Report saved: {} ({} pages)",
            path.display(),
            self.page_count()
        );
        Ok(())
    }

    fn to_pdf(&self) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for style in [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => style.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(style.resource_name(), font_id);
        }

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let mut operations = Vec::new();
            let mut images = Dictionary::new();

            for item in &page.items {
                match item {
                    PageItem::Text(text) => operations.extend(text_operations(text)),
                    PageItem::Image(image) => {
                        let name = format!("Im{}", images.len() + 1);
                        let image_id = doc.add_object(image_stream(&image.pixels));
                        images.set(name.as_str(), image_id);
                        operations.extend(image_operations(image, &name));
                    }
                }
            }

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => fonts.clone(),
                    "XObject" => images,
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(self.page_width),
                Object::from(self.page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        Ok(doc)
    }
}

fn text_operations(text: &TextItem) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(text.style.resource_name().as_bytes().to_vec()),
                Object::from(text.size),
            ],
        ),
        Operation::new("g", vec![Object::from(f32::from(text.gray) / 255.0)]),
        Operation::new("Td", vec![Object::from(text.x), Object::from(text.y)]),
        Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(&text.text))]),
        Operation::new("ET", vec![]),
    ]
}

fn image_operations(image: &ImageItem, name: &str) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::from(image.width),
                Object::Integer(0),
                Object::Integer(0),
                Object::from(image.height),
                Object::from(image.x),
                Object::from(image.y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

fn image_stream(pixels: &RgbImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(pixels.width()),
            "Height" => i64::from(pixels.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        },
        pixels.as_raw().clone(),
    )
}

/// Encode text for the standard fonts' WinAnsi encoding. Characters outside
/// Latin-1, and control characters, become `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x09 => b' ',
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap on spaces; words longer than a line are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for raw in text.lines() {
        let chars: Vec<char> = raw.chars().collect();
        let mut start = 0;
        while chars.len() - start > max_chars {
            let window = &chars[start..=start + max_chars];
            match window.iter().rposition(|c| *c == ' ').filter(|&p| p > 0) {
                Some(space) => {
                    lines.push(chars[start..start + space].iter().collect());
                    start += space + 1;
                }
                None => {
                    lines.push(chars[start..start + max_chars].iter().collect());
                    start += max_chars;
                }
            }
        }
        lines.push(chars[start..].iter().collect());
    }

    lines
}

/// Text block for one numeric field.
pub fn numeric_block(entry: &NumericEntry) -> String {
    match &entry.outcome {
        FieldOutcome::Summary(stat) => format!(
            "{}:\n  - Mean: {}\n  - Median: {}\n  - Std Dev: {}\n  - Min: {}, Max: {}",
            entry.field,
            format_number(stat.mean),
            format_number(stat.median),
            format_number(stat.stdev),
            format_number(stat.min),
            format_number(stat.max),
        ),
        FieldOutcome::Error(message) => format!("{}: Error - {message}", entry.field),
    }
}

/// Text block for one categorical field.
pub fn categorical_block(entry: &CategoricalEntry) -> String {
    match &entry.outcome {
        FieldOutcome::Summary(stat) => format!(
            "{}:\n  - Unique values: {}\n  - Most common: {}",
            entry.field,
            stat.unique_count,
            stat.most_common_label(),
        ),
        FieldOutcome::Error(message) => format!("{}: Error - {message}", entry.field),
    }
}

/// Lays out analysis results as a paginated document.
#[derive(Debug, Clone, Default)]
pub struct ReportComposer {
    layout: DocumentLayout,
}

impl ReportComposer {
    pub fn new(layout: DocumentLayout) -> Self {
        Self { layout }
    }

    /// Place the report's sections onto pages.
    ///
    /// Numeric and categorical sections are left out when they have no
    /// entries. The chart page is appended only when `chart` names an
    /// existing image file.
    pub fn layout(
        &self,
        analysis: &Analysis,
        title: &str,
        chart: Option<&Path>,
    ) -> Result<ReportDocument> {
        let mut writer = PageWriter::new(&self.layout, title);

        writer.section_title("Summary");
        writer.body(&format!(
            "Number of records: {}\nNumber of fields: {}",
            analysis.record_count, analysis.field_count
        ));

        if !analysis.numeric_stats.is_empty() {
            writer.section_title("Numeric Field Statistics");
            for entry in &analysis.numeric_stats {
                writer.body(&numeric_block(entry));
            }
        }

        if !analysis.categorical_stats.is_empty() {
            writer.section_title("Categorical Field Summaries");
            for entry in &analysis.categorical_stats {
                writer.body(&categorical_block(entry));
            }
        }

        match chart {
            Some(path) if path.exists() => {
                let pixels = image::open(path)?.to_rgb8();
                if pixels.width() == 0 || pixels.height() == 0 {
                    return Err(ReportError::DocumentFailed(format!(
                        "chart image {} has no pixels",
                        path.display()
                    )));
                }
                writer.add_page();
                writer.section_title("Chart: Mean Values");
                writer.image(pixels);
            }
            Some(path) => warn!("Chart image {} not found; chart page skipped", path.display()),
            None => {}
        }

        let document = writer.finish();
        debug!("Laid out {} pages", document.page_count());
        Ok(document)
    }

    /// Lay out and write the report to `output`.
    pub fn compose(
        &self,
        analysis: &Analysis,
        title: &str,
        chart: Option<&Path>,
        output: &Path,
    ) -> Result<ReportDocument> {
        let document = self.layout(analysis, title, chart)?;
        document.write_pdf(output)?;
        Ok(document)
    }
}

/// Flowing cursor over a growing list of pages.
struct PageWriter<'a> {
    layout: &'a DocumentLayout,
    title: &'a str,
    finished: Vec<Page>,
    current: Page,
    /// Top edge of the next line.
    cursor: f32,
}

impl<'a> PageWriter<'a> {
    fn new(layout: &'a DocumentLayout, title: &'a str) -> Self {
        let mut writer = Self {
            layout,
            title,
            finished: Vec::new(),
            current: Page {
                number: 0,
                items: Vec::new(),
            },
            cursor: 0.0,
        };
        writer.add_page();
        writer
    }

    /// Start a new page with its header and footer.
    fn add_page(&mut self) {
        let number = self.finished.len() + usize::from(self.current.number > 0) + 1;
        let previous = std::mem::replace(
            &mut self.current,
            Page {
                number,
                items: Vec::new(),
            },
        );
        if previous.number > 0 {
            self.finished.push(previous);
        }

        let layout = self.layout;
        let header_baseline = layout.page_height - layout.margin_top - layout.header_font_size;
        self.centered(self.title, layout.header_font_size, FontStyle::Bold, header_baseline);
        self.centered(
            &format!("Page {number}"),
            layout.footer_font_size,
            FontStyle::Italic,
            layout.margin_bottom / 2.0,
        );

        self.cursor = layout.page_height - layout.margin_top - 2.0 * layout.section_line_height;
    }

    fn centered(&mut self, text: &str, size: f32, style: FontStyle, baseline: f32) {
        let width = text.chars().count() as f32 * size * style.char_width();
        let x = ((self.layout.page_width - width) / 2.0).max(self.layout.margin_x);
        self.current.items.push(PageItem::Text(TextItem {
            x,
            y: baseline,
            size,
            style,
            gray: 0,
            text: text.to_string(),
        }));
    }

    fn ensure_room(&mut self, height: f32) {
        if self.cursor - height < self.layout.bottom_limit() {
            self.add_page();
        }
    }

    fn line(&mut self, text: String, size: f32, style: FontStyle, height: f32) {
        self.ensure_room(height);
        let baseline = self.cursor - height / 2.0 - size * 0.35;
        self.current.items.push(PageItem::Text(TextItem {
            x: self.layout.margin_x,
            y: baseline,
            size,
            style,
            gray: BODY_GRAY,
            text,
        }));
        self.cursor -= height;
    }

    fn section_title(&mut self, title: &str) {
        let layout = self.layout;
        // Keep a title on the same page as the first line of its body.
        self.ensure_room(layout.section_line_height + TITLE_GAP + layout.body_line_height);
        self.line(
            title.to_string(),
            layout.section_font_size,
            FontStyle::Bold,
            layout.section_line_height,
        );
        self.cursor -= TITLE_GAP;
    }

    fn body(&mut self, text: &str) {
        let layout = self.layout;
        let max_chars =
            (layout.printable_width() / (layout.body_font_size * AVERAGE_CHAR_WIDTH)) as usize;
        for line in wrap_text(text, max_chars) {
            self.line(
                line,
                layout.body_font_size,
                FontStyle::Regular,
                layout.body_line_height,
            );
        }
        self.cursor -= layout.body_line_height;
    }

    /// Place an image at the configured width, shrinking it to fit the
    /// remaining space on the page.
    fn image(&mut self, pixels: RgbImage) {
        let layout = self.layout;
        let mut width = layout.image_width;
        let mut height = width * pixels.height() as f32 / pixels.width() as f32;

        let available = self.cursor - layout.bottom_limit();
        if height > available && available > 0.0 {
            let scale = available / height;
            width *= scale;
            height = available;
        }

        self.current.items.push(PageItem::Image(ImageItem {
            x: layout.image_x,
            y: self.cursor - height,
            width,
            height,
            pixels,
        }));
        self.cursor -= height;
    }

    fn finish(mut self) -> ReportDocument {
        self.finished.push(self.current);
        ReportDocument {
            title: self.title.to_string(),
            page_width: self.layout.page_width,
            page_height: self.layout.page_height,
            pages: self.finished,
        }
    }
}
