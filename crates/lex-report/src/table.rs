//! In-memory string table and the delimited-file loader that fills it.
//!
//! Every field is held as a polars `String` series of the raw cells read from
//! the source. Missing cells are empty strings, so every row answers for
//! every column.

use crate::error::{ReportError, Result, ResultExt};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Ordered string columns under an ordered list of column names.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    fields: Vec<Series>,
    height: usize,
}

impl Table {
    /// Create a table with the given header and no rows.
    ///
    /// When a name repeats, lookups by that name resolve to its first column.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }
        let fields = columns
            .iter()
            .map(|name| Series::new_empty(name.as_str().into(), &DataType::String))
            .collect();
        Self {
            columns,
            index,
            fields,
            height: 0,
        }
    }

    /// Build a table from a header and row values. Short rows are padded
    /// with empty strings and extra cells are dropped.
    pub fn from_rows<R, S>(columns: &[&str], rows: &[R]) -> Self
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut table = Self::new(columns.iter().copied());
        table.fields = columns
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let cells: StringChunked = rows
                    .iter()
                    .map(|row| Some(row.as_ref().get(position).map_or("", |cell| cell.as_ref())))
                    .collect();
                cells.with_name((*name).into()).into_series()
            })
            .collect();
        table.height = rows.len();
        table
    }

    /// Convert a DataFrame into a string table. Nulls become empty strings.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut table = Self::new(df.get_column_names().into_iter().map(|n| n.to_string()));

        table.fields = df
            .get_columns()
            .iter()
            .map(|column| {
                let as_text = column
                    .cast(&DataType::String)
                    .context(format!("Reading column '{}'", column.name()))?;
                let cells: StringChunked = as_text
                    .str()?
                    .into_iter()
                    .map(|value| Some(value.unwrap_or_default()))
                    .collect();
                Ok(cells.with_name(column.name().clone()).into_series())
            })
            .collect::<Result<_>>()?;
        table.height = df.height();
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        (position < self.height).then_some(Row {
            table: self,
            position,
        })
    }

    /// The series backing `field`, or None for an unknown column.
    pub fn field(&self, field: &str) -> Option<&Series> {
        self.index.get(field).map(|&position| &self.fields[position])
    }

    /// All cells of one column in row order, or None for an unknown column.
    pub fn column_values<'a>(
        &'a self,
        field: &str,
    ) -> Option<impl Iterator<Item = &'a str> + use<'a>> {
        let cells = self.field(field)?.str().ok()?;
        Some(cells.into_iter().map(Option::unwrap_or_default))
    }

    fn cell(&self, position: usize, field: &str) -> Option<&str> {
        let cells = self.field(field)?.str().ok()?;
        Some(cells.get(position).unwrap_or_default())
    }
}

/// Borrowed view of one row as a field-name → value mapping.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    position: usize,
}

impl<'a> Row<'a> {
    /// Cell for `field`; `Some("")` for a missing cell, None for an unknown
    /// field.
    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.table.cell(self.position, field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        let table = self.table;
        let position = self.position;
        table.columns.iter().filter_map(move |name| {
            table
                .cell(position, name)
                .map(|value| (name.as_str(), value))
        })
    }
}

/// Keep only rows with at least one non-null cell. Blank source lines load
/// as all-null rows.
fn drop_blank_rows(df: DataFrame) -> Result<DataFrame> {
    let keep = df.get_columns().iter().fold(
        BooleanChunked::full("keep".into(), false, df.height()),
        |keep, column| &keep | &column.is_not_null(),
    );
    let kept = df.filter(&keep)?;
    if kept.height() < df.height() {
        debug!("Dropped {} blank row(s)", df.height() - kept.height());
    }
    Ok(kept)
}

/// Reads delimited text files into a [`Table`].
#[derive(Debug, Clone)]
pub struct TableLoader {
    delimiter: u8,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl TableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a table whose first line is the header. All cells are read as
    /// strings; no type inference happens here.
    ///
    /// Blank lines are skipped. Cells past the last header column are
    /// dropped.
    ///
    /// # Errors
    ///
    /// - [`ReportError::SourceNotFound`] if `path` does not exist.
    /// - [`ReportError::MalformedTable`] if the source has no header row.
    pub fn load(&self, path: &Path) -> Result<Table> {
        if !path.exists() {
            return Err(ReportError::SourceNotFound(path.to_path_buf()));
        }

        info!("Loading table from: {}", path.display());
        let parse_options = CsvParseOptions::default()
            .with_separator(self.delimiter)
            .with_quote_char(Some(b'"'))
            .with_truncate_ragged_lines(true);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_parse_options(parse_options)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
            .map_err(|e| match e {
                PolarsError::NoData(reason) => {
                    ReportError::MalformedTable(format!("missing header row ({reason})"))
                }
                other => ReportError::Polars(other),
            })?;
        debug!("Parsed source into frame of shape {:?}", df.shape());

        if df.width() == 0 {
            return Err(ReportError::MalformedTable("missing header row".to_string()));
        }

        let table = Table::from_dataframe(&drop_blank_rows(df)?)?;
        info!(
            "Table loaded: {} rows x {} columns",
            table.height(),
            table.width()
        );
        Ok(table)
    }
}
