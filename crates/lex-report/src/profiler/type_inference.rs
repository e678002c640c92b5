//! Field classification: numeric vs categorical.

use crate::config::ClassificationStrategy;
use crate::table::Table;
use crate::types::{FieldClassification, FieldKind};
use crate::utils::is_float;
use tracing::debug;

/// Tags every field of a table as numeric or categorical.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldClassifier {
    strategy: ClassificationStrategy,
}

impl FieldClassifier {
    pub fn new(strategy: ClassificationStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ClassificationStrategy {
        self.strategy
    }

    /// Classify each column in order. A table without rows yields an empty
    /// classification.
    pub fn classify(&self, table: &Table) -> FieldClassification {
        let mut classification = FieldClassification::new();

        for field in table.columns() {
            let Some(cells) = table.column_values(field) else {
                continue;
            };
            let kind = match self.strategy {
                ClassificationStrategy::FirstRow => classify_first_row(cells),
                ClassificationStrategy::MajorityVote => classify_majority(cells),
            };
            if let Some(kind) = kind {
                debug!("Field '{}' classified as {:?}", field, kind);
                classification.insert(field.as_str(), kind);
            }
        }

        classification
    }
}

/// Tag from the first cell alone; later cells are never read.
pub(crate) fn classify_first_row<'a>(
    mut cells: impl Iterator<Item = &'a str>,
) -> Option<FieldKind> {
    cells.next().map(|cell| {
        if is_float(cell) {
            FieldKind::Numeric
        } else {
            FieldKind::Categorical
        }
    })
}

/// Numeric when parseable cells are a strict majority of non-empty cells.
pub(crate) fn classify_majority<'a>(cells: impl Iterator<Item = &'a str>) -> Option<FieldKind> {
    let mut any_row = false;
    let mut numeric = 0usize;
    let mut filled = 0usize;

    for cell in cells {
        any_row = true;
        if cell.is_empty() {
            continue;
        }
        filled += 1;
        if is_float(cell) {
            numeric += 1;
        }
    }

    if !any_row {
        return None;
    }
    if numeric * 2 > filled {
        Some(FieldKind::Numeric)
    } else {
        Some(FieldKind::Categorical)
    }
}
