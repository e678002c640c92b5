//! Dataset analysis: field classification and per-field summaries.
//!
//! This module provides:
//! - Field classification (numeric vs categorical)
//! - Numeric summaries (mean, median, sample stdev, min, max)
//! - Categorical summaries (distinct count, most common value)
//!
//! A failure while summarizing one field is recorded as that field's
//! [`FieldOutcome::Error`] and never aborts the analysis.

mod statistics;
mod type_inference;

use crate::config::{ClassificationStrategy, ReportConfig};
use crate::table::Table;
use crate::types::{Analysis, FieldEntry, FieldOutcome};
use tracing::{debug, info, warn};

pub use statistics::{Summarizer, describe, frequency_counts};
pub use type_inference::FieldClassifier;

/// Runs classification and summarization over a loaded table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetAnalyzer {
    classifier: FieldClassifier,
    summarizer: Summarizer,
}

impl DatasetAnalyzer {
    pub fn new(strategy: ClassificationStrategy, decimal_places: u32) -> Self {
        Self {
            classifier: FieldClassifier::new(strategy),
            summarizer: Summarizer::new(decimal_places),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.classification, config.decimal_places)
    }

    /// Analyze an entire table.
    ///
    /// Fields without any non-empty value are left out of the summaries.
    pub fn analyze(&self, table: &Table) -> Analysis {
        let classification = self.classifier.classify(table);
        info!(
            "Classified {} fields ({} numeric, {} categorical) using {:?}",
            classification.len(),
            classification.numeric_fields().len(),
            classification.categorical_fields().len(),
            self.classifier.strategy()
        );

        let mut numeric_stats = Vec::new();
        for field in classification.numeric_fields() {
            let Some(cells) = table.field(field) else {
                continue;
            };
            match self.summarizer.summarize_numeric(cells) {
                Some(outcome) => {
                    log_outcome(field, &outcome);
                    numeric_stats.push(FieldEntry {
                        field: field.to_string(),
                        outcome,
                    });
                }
                None => debug!("Numeric field '{}' has no values; omitted", field),
            }
        }

        let mut categorical_stats = Vec::new();
        for field in classification.categorical_fields() {
            let Some(cells) = table.column_values(field) else {
                continue;
            };
            match self.summarizer.summarize_categorical(cells) {
                Some(outcome) => {
                    log_outcome(field, &outcome);
                    categorical_stats.push(FieldEntry {
                        field: field.to_string(),
                        outcome,
                    });
                }
                None => debug!("Categorical field '{}' has no values; omitted", field),
            }
        }

        Analysis {
            record_count: table.height(),
            field_count: table.width(),
            classification,
            numeric_stats,
            categorical_stats,
        }
    }
}

fn log_outcome<T>(field: &str, outcome: &FieldOutcome<T>) {
    if let FieldOutcome::Error(message) = outcome {
        warn!("Field '{}' could not be summarized: {}", field, message);
    }
}
