//! Shared utilities for the transformation pipeline.
//!
//! Column extraction helpers that turn polars columns into plain vectors,
//! and the order statistics the imputers and scalers are built on.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Column Extraction Utilities
// =============================================================================

/// Read a column as optional `f64` values.
///
/// Values that cannot be cast become `None`, as do NaNs.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Read a column as optional string values.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Arithmetic mean of the present values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (ddof 0) around a known mean.
pub fn population_std(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in `[0, 100]`; `sorted` must be ascending.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = (q / 100.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Ascending copy of a slice; NaNs are expected to be filtered out already.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Most frequent value; ties resolve to the smallest value.
pub fn most_frequent<T>(values: impl IntoIterator<Item = T>) -> Option<T>
where
    T: Ord + std::hash::Hash + Clone,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a, count_a), (b, count_b)| count_a.cmp(count_b).then_with(|| b.cmp(a)))
        .map(|(value, _)| value)
}

/// Most frequent numeric value; ties resolve to the smallest value.
pub fn most_frequent_f64(values: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(values);
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let run = j - i;
        // strict comparison keeps the earliest (smallest) value on ties
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((sorted[i], run));
        }
        i = j;
    }
    best.map(|(value, _)| value)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_values_casts_and_drops_nan() {
        let series = Series::new("a".into(), &[Some(1.0), None, Some(f64::NAN), Some(4.0)]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, None, Some(4.0)]);
    }

    #[test]
    fn test_numeric_values_from_strings() {
        let series = Series::new("a".into(), &[Some("1.5"), Some("oops"), None]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.5), None, None]);
    }

    #[test]
    fn test_string_values() {
        let series = Series::new("s".into(), &[Some("Pave"), None, Some("Grvl")]);
        let values = string_values(&series).unwrap();
        assert_eq!(
            values,
            vec![Some("Pave".to_string()), None, Some("Grvl".to_string())]
        );
    }

    #[test]
    fn test_percentile_midpoint_even_and_odd() {
        assert_eq!(percentile(&sorted_copy(&[3.0, 1.0, 2.0]), 50.0), Some(2.0));
        assert_eq!(percentile(&sorted_copy(&[4.0, 1.0, 3.0, 2.0]), 50.0), Some(2.5));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 25.0), Some(2.0));
        assert_eq!(percentile(&sorted, 75.0), Some(4.0));

        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 25.0), Some(1.75));
        assert_eq!(percentile(&sorted, 75.0), Some(3.25));
    }

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values).unwrap();
        assert_eq!(m, 5.0);
        assert_eq!(population_std(&values, m), 2.0);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_most_frequent_tie_breaks_to_smallest() {
        let values = vec!["b", "a", "b", "a", "c"];
        assert_eq!(most_frequent(values), Some("a"));
        assert_eq!(most_frequent(vec!["z", "y", "z"]), Some("z"));
        assert_eq!(most_frequent(Vec::<String>::new()), None);
    }

    #[test]
    fn test_most_frequent_f64() {
        assert_eq!(most_frequent_f64(&[3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(most_frequent_f64(&[5.0, 5.0, 1.0]), Some(5.0));
        assert_eq!(most_frequent_f64(&[]), None);
    }
}
