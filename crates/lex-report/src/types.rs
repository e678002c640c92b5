use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification tag governing which statistics a field receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Categorical,
}

/// Field tags in table column order.
///
/// A field appears at most once. Fields of a zero-row table are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldClassification {
    entries: Vec<(String, FieldKind)>,
}

impl FieldClassification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a field. Re-tagging an already classified field is ignored so
    /// that each field keeps exactly one tag.
    pub fn insert(&mut self, field: impl Into<String>, kind: FieldKind) {
        let field = field.into();
        if self.kind_of(&field).is_none() {
            self.entries.push((field, kind));
        }
    }

    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, kind)| *kind)
    }

    /// Fields tagged numeric, in column order.
    pub fn numeric_fields(&self) -> Vec<&str> {
        self.fields_of(FieldKind::Numeric)
    }

    /// Fields tagged categorical, in column order.
    pub fn categorical_fields(&self) -> Vec<&str> {
        self.fields_of(FieldKind::Categorical)
    }

    fn fields_of(&self, kind: FieldKind) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Descriptive statistics of a numeric field, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; 0.0 for a single value.
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
}

/// Frequency summary of a categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub unique_count: usize,
    /// Most frequent value and its count; ties go to the value seen first.
    pub most_common: (String, usize),
}

impl CategoricalSummary {
    /// `"<value> (<count> times)"`
    pub fn most_common_label(&self) -> String {
        let (value, count) = &self.most_common;
        format!("{value} ({count} times)")
    }
}

/// Per-field result: either a summary or the message of the failure that
/// replaced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOutcome<T> {
    Summary(T),
    Error(String),
}

impl<T> FieldOutcome<T> {
    pub fn summary(&self) -> Option<&T> {
        match self {
            Self::Summary(summary) => Some(summary),
            Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Summary(_) => None,
            Self::Error(message) => Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// One field's outcome, keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry<T> {
    pub field: String,
    pub outcome: FieldOutcome<T>,
}

pub type NumericEntry = FieldEntry<NumericSummary>;
pub type CategoricalEntry = FieldEntry<CategoricalSummary>;

/// Full result of analysing one table.
///
/// Built once per run and only read afterwards by the chart and document
/// stages. Entry order follows the table's column order; fields with no
/// non-empty values are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub record_count: usize,
    pub field_count: usize,
    pub classification: FieldClassification,
    pub numeric_stats: Vec<NumericEntry>,
    pub categorical_stats: Vec<CategoricalEntry>,
}

impl Analysis {
    pub fn numeric(&self, field: &str) -> Option<&FieldOutcome<NumericSummary>> {
        self.numeric_stats
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| &entry.outcome)
    }

    pub fn categorical(&self, field: &str) -> Option<&FieldOutcome<CategoricalSummary>> {
        self.categorical_stats
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| &entry.outcome)
    }

    /// Fields whose summary was replaced by an error, with the message.
    pub fn field_errors(&self) -> HashMap<String, String> {
        let numeric = self
            .numeric_stats
            .iter()
            .filter_map(|e| e.outcome.error().map(|m| (e.field.clone(), m.to_string())));
        let categorical = self
            .categorical_stats
            .iter()
            .filter_map(|e| e.outcome.error().map(|m| (e.field.clone(), m.to_string())));
        numeric.chain(categorical).collect()
    }
}

/// Outcome of a whole pipeline run, suitable for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_file: String,
    pub output_file: String,
    /// Chart image, when one was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_file: Option<String>,
    pub page_count: usize,
    pub analysis: Analysis,
}
