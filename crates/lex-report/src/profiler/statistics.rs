//! Per-field descriptive statistics.

use crate::types::{CategoricalSummary, FieldOutcome, NumericSummary};
use crate::utils::{float_parse_error, parse_float, round_to};
use polars::prelude::*;
use std::collections::HashMap;

/// Computes numeric and categorical summaries from raw cells.
///
/// Aggregation runs at full precision; only the finished summary is
/// rounded.
#[derive(Debug, Clone, Copy)]
pub struct Summarizer {
    decimal_places: u32,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self { decimal_places: 2 }
    }
}

impl Summarizer {
    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    /// Summarize a numeric field from its string series.
    ///
    /// Empty cells are skipped. Returns None when no cell is filled, and an
    /// error outcome naming the first filled cell that does not parse.
    pub fn summarize_numeric(&self, cells: &Series) -> Option<FieldOutcome<NumericSummary>> {
        let values = match to_float_series(cells) {
            Ok(values) => values,
            Err(message) => return Some(FieldOutcome::Error(message)),
        };

        let raw = describe(&values)?;
        let places = self.decimal_places;
        Some(FieldOutcome::Summary(NumericSummary {
            mean: round_to(raw.mean, places),
            median: round_to(raw.median, places),
            stdev: round_to(raw.stdev, places),
            min: round_to(raw.min, places),
            max: round_to(raw.max, places),
        }))
    }

    /// Summarize a categorical field. Returns None when no cell is filled.
    pub fn summarize_categorical<'a>(
        &self,
        cells: impl Iterator<Item = &'a str>,
    ) -> Option<FieldOutcome<CategoricalSummary>> {
        let counts = frequency_counts(cells.filter(|cell| !cell.is_empty()));

        let mut most_common: Option<(&str, usize)> = None;
        for &(value, count) in &counts {
            if most_common.is_none_or(|(_, best)| count > best) {
                most_common = Some((value, count));
            }
        }

        let (value, count) = most_common?;
        Some(FieldOutcome::Summary(CategoricalSummary {
            unique_count: counts.len(),
            most_common: (value.to_string(), count),
        }))
    }
}

/// Parse the filled cells of a string series into a `Float64` series.
///
/// Uses the same number syntax as classification, so a field tagged numeric
/// by its first cell always parses that cell.
fn to_float_series(cells: &Series) -> std::result::Result<Series, String> {
    let text = cells.str().map_err(|e| e.to_string())?;
    let mut values = Vec::with_capacity(text.len());
    for cell in text.into_iter().flatten().filter(|cell| !cell.is_empty()) {
        values.push(parse_float(cell).ok_or_else(|| float_parse_error(cell))?);
    }
    Ok(Float64Chunked::from_vec(cells.name().clone(), values).into_series())
}

/// Unrounded statistics of a `Float64` series; None when it has no values.
///
/// Mean, median and stdev are taken on the values divided by a power of two
/// near the largest magnitude, then scaled back. Large finite inputs
/// therefore never overflow the intermediate sums.
pub fn describe(values: &Series) -> Option<NumericSummary> {
    let min = values.min::<f64>().ok()??;
    let max = values.max::<f64>().ok()??;

    let scale = magnitude_scale(min.abs().max(max.abs()));
    let scaled = values.f64().ok()?.apply_values(|v| v / scale);
    let scaled_series = scaled.clone().into_series();

    let stdev = if values.len() < 2 {
        0.0
    } else {
        scaled.std(1).unwrap_or(0.0) * scale
    };

    // Summation rounding can land the mean of near-identical values one ulp
    // outside the range.
    let mean = scaled_series.mean()? * scale;
    let mean = if mean < min {
        min
    } else if mean > max {
        max
    } else {
        mean
    };

    Some(NumericSummary {
        mean,
        median: scaled_series.median()? * scale,
        stdev,
        min,
        max,
    })
}

/// Power of two at or just below `magnitude`, or 1.0 when `magnitude` is
/// zero, subnormal or not finite. Dividing by it is exact.
fn magnitude_scale(magnitude: f64) -> f64 {
    if !magnitude.is_normal() {
        return 1.0;
    }
    2f64.powi(magnitude.log2().floor() as i32)
}

/// Distinct values with their counts, in first-seen order.
pub fn frequency_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();

    for value in values {
        match positions.get(value) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn numeric(cells: &[&str]) -> Option<FieldOutcome<NumericSummary>> {
        Summarizer::default().summarize_numeric(&Series::new("value".into(), cells))
    }

    fn categorical(cells: &[&str]) -> Option<FieldOutcome<CategoricalSummary>> {
        Summarizer::default().summarize_categorical(cells.iter().copied())
    }

    #[test]
    fn test_two_value_summary() {
        let summary = numeric(&["30", "40"]).unwrap();
        assert_eq!(
            summary,
            FieldOutcome::Summary(NumericSummary {
                mean: 35.0,
                median: 35.0,
                stdev: 7.07,
                min: 30.0,
                max: 40.0,
            })
        );
    }

    #[test]
    fn test_odd_count_median() {
        let summary = numeric(&["5", "1", "3"]).unwrap();
        assert_eq!(summary.summary().unwrap().median, 3.0);
    }

    #[test]
    fn test_single_value_stdev_is_zero() {
        let summary = numeric(&["12.3456"]).unwrap();
        let summary = summary.summary().unwrap();
        assert_eq!(summary.stdev, 0.0);
        assert_eq!(summary.mean, 12.35);
        assert_eq!(summary.min, 12.35);
    }

    #[test]
    fn test_empty_cells_skipped_not_zeroed() {
        let summary = numeric(&["10", "", "20", ""]).unwrap();
        let summary = summary.summary().unwrap();
        assert_eq!(summary.mean, 15.0);
        assert_eq!(summary.min, 10.0);
    }

    #[test]
    fn test_all_empty_numeric_is_omitted() {
        assert_eq!(numeric(&["", "", ""]), None);
        assert_eq!(numeric(&[]), None);
    }

    #[test]
    fn test_unparseable_value_becomes_error() {
        let outcome = numeric(&["1", "2", "oops", "4"]).unwrap();
        assert_eq!(
            outcome,
            FieldOutcome::Error("could not convert string to float: 'oops'".to_string())
        );
    }

    #[test]
    fn test_whitespace_cell_is_not_skipped() {
        let outcome = numeric(&["1", " "]).unwrap();
        assert!(outcome.is_error());
    }

    #[test]
    fn test_null_cells_are_skipped() {
        let cells = Series::new("value".into(), [Some("2"), None, Some("4")]);
        let outcome = Summarizer::default().summarize_numeric(&cells).unwrap();
        assert_eq!(outcome.summary().unwrap().mean, 3.0);
    }

    #[test]
    fn test_non_text_series_is_an_error() {
        let cells = Series::new("value".into(), [1.0f64, 2.0]);
        assert!(Summarizer::default().summarize_numeric(&cells).unwrap().is_error());
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let raw = describe(&Series::new("value".into(), [1e308, 1e308, -1e308])).unwrap();
        let expected_mean = 1e308 / 3.0;
        assert!((raw.mean - expected_mean).abs() / expected_mean < 1e-9, "{}", raw.mean);
        assert!(raw.stdev.is_finite());
        let expected_stdev = (4.0f64 / 3.0).sqrt() * 1e308;
        assert!((raw.stdev - expected_stdev).abs() / expected_stdev < 1e-9, "{}", raw.stdev);
        assert_eq!(raw.median, 1e308);
    }

    #[test]
    fn test_large_opposite_values() {
        let outcome = numeric(&["1e200", "-1e200"]).unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.median, 0.0);
        let expected = 2f64.sqrt() * 1e200;
        assert!((summary.stdev - expected).abs() / expected < 1e-9, "{}", summary.stdev);
    }

    #[test]
    fn test_tiny_values_keep_precision() {
        let raw = describe(&Series::new("value".into(), [3e-300, 5e-300])).unwrap();
        assert!((raw.mean - 4e-300).abs() / 4e-300 < 1e-9);
        assert!((raw.stdev - 2f64.sqrt() * 1e-300).abs() / 1e-300 < 1e-9);
    }

    #[test]
    fn test_describe_empty_series() {
        assert_eq!(describe(&Series::new_empty("value".into(), &DataType::Float64)), None);
    }

    #[test]
    fn test_categorical_first_seen_tie_break() {
        let outcome = categorical(&["NYC", "LA"]).unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.unique_count, 2);
        assert_eq!(summary.most_common_label(), "NYC (1 times)");

        let outcome = categorical(&["b", "a", "a", "b", "c"]).unwrap();
        assert_eq!(outcome.summary().unwrap().most_common, ("b".to_string(), 2));
    }

    #[test]
    fn test_categorical_highest_count_wins() {
        let outcome = categorical(&["red", "blue", "", "blue", "green", "blue"]).unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.unique_count, 3);
        assert_eq!(summary.most_common, ("blue".to_string(), 3));
    }

    #[test]
    fn test_all_empty_categorical_is_omitted() {
        assert_eq!(categorical(&["", ""]), None);
    }

    #[test]
    fn test_frequency_counts_order() {
        let counts = frequency_counts(["x", "y", "x", "z"].into_iter());
        assert_eq!(counts, vec![("x", 2), ("y", 1), ("z", 1)]);
    }

    proptest! {
        #[test]
        fn prop_summary_is_ordered(values in prop::collection::vec(-1.0e9f64..1.0e9, 1..50)) {
            let raw = describe(&Series::new("value".into(), values.as_slice())).unwrap();
            prop_assert!(raw.min <= raw.median && raw.median <= raw.max);
            prop_assert!(raw.min <= raw.mean && raw.mean <= raw.max);

            let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let outcome = Summarizer::default()
                .summarize_numeric(&Series::new("value".into(), cells.as_slice()))
                .unwrap();
            let rounded = outcome.summary().unwrap();
            prop_assert!(rounded.min <= rounded.median && rounded.median <= rounded.max);
            prop_assert!(rounded.min <= rounded.mean && rounded.mean <= rounded.max);
            prop_assert!(rounded.stdev >= 0.0);
        }

        #[test]
        fn prop_rounding_is_idempotent(value in -1.0e12f64..1.0e12, places in 0u32..6) {
            let once = round_to(value, places);
            prop_assert_eq!(round_to(once, places), once);
        }

        #[test]
        fn prop_categorical_counts(values in prop::collection::vec("[a-d]{0,2}", 0..40)) {
            let outcome = Summarizer::default()
                .summarize_categorical(values.iter().map(String::as_str));

            let filled: Vec<&str> = values.iter().map(String::as_str).filter(|v| !v.is_empty()).collect();
            match outcome {
                None => prop_assert!(filled.is_empty()),
                Some(outcome) => {
                    let summary = outcome.summary().unwrap();
                    let mut distinct = filled.clone();
                    distinct.sort_unstable();
                    distinct.dedup();
                    let max_frequency = distinct
                        .iter()
                        .map(|d| filled.iter().filter(|v| *v == d).count())
                        .max()
                        .unwrap();
                    prop_assert_eq!(summary.unique_count, distinct.len());
                    prop_assert_eq!(summary.most_common.1, max_frequency);
                }
            }
        }
    }
}
