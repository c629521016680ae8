//! Shared utilities for the EDA pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
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
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

// =============================================================================
// Value Extraction Utilities
// =============================================================================

/// Collect a numeric Series as `Option<f64>` values (nulls preserved).
pub fn series_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Collect the non-null values of a numeric Series as `f64`.
pub fn non_null_f64(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(series_to_f64(series)?.into_iter().flatten().collect())
}

/// Collect the non-null values of an integer Series as `i64`.
pub fn non_null_i64(series: &Series) -> PolarsResult<Vec<i64>> {
    let int_series = series.cast(&DataType::Int64)?;
    Ok(int_series.i64()?.into_iter().flatten().collect())
}

/// Collect any Series as optional strings (nulls preserved).
pub fn series_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Format a single value for display, without the quotes polars puts
/// around strings.
pub fn format_any_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "null".to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Round to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    Some(variance.sqrt())
}

/// Quantile of already sorted values using linear interpolation.
pub fn quantile_sorted(sorted: &[f64], quantile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = quantile.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Median of unsorted values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, 0.5)
}

/// Most frequent value of a numeric slice. Ties resolve to the smallest value.
pub fn numeric_mode(values: &[f64]) -> Option<f64> {
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for &v in values {
        counts.entry(v.to_bits()).or_insert((v, 0)).1 += 1;
    }
    counts
        .into_values()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.total_cmp(va)))
        .map(|(v, _)| v)
}

/// Most frequent integer. Ties resolve to the smallest value.
pub fn integer_mode(values: &[i64]) -> Option<i64> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
        .map(|(v, _)| v)
}

/// Calculate the mode (most frequent value) of a string Series.
///
/// Ties resolve to the lexicographically smallest value so the result is
/// stable across runs.
pub fn string_mode(series: &Series) -> Option<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return None;
    }

    let str_series = non_null.cast(&DataType::String).ok()?;
    let str_chunked = str_series.str().ok()?;

    let mut value_counts: HashMap<&str, usize> = HashMap::new();
    for val in str_chunked.into_iter().flatten() {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    value_counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
        .map(|(val, _)| val.to_string())
}

/// Count occurrences of each non-null value, descending by count
/// (ties by value ascending).
pub fn value_counts(series: &Series) -> PolarsResult<Vec<(String, usize)>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in series_to_strings(series)?.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|(va, ca), (vb, cb)| cb.cmp(ca).then_with(|| va.cmp(vb)));
    Ok(entries)
}

/// Number of distinct non-null values.
pub fn distinct_non_null(series: &Series) -> PolarsResult<usize> {
    let n_unique = series.n_unique()?;
    Ok(if series.null_count() > 0 {
        n_unique.saturating_sub(1)
    } else {
        n_unique
    })
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<Option<f64>> = series_to_f64(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in an integer Series with a specific integer.
pub fn fill_integer_nulls(series: &Series, fill_value: i64) -> PolarsResult<Series> {
    let int_series = series.cast(&DataType::Int64)?;
    let filled: Vec<Option<i64>> = int_series
        .i64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<Option<String>> = series_to_strings(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or_else(|| fill_value.to_string())))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a boolean Series with a specific value.
pub fn fill_boolean_nulls(series: &Series, fill_value: bool) -> PolarsResult<Series> {
    let filled: Vec<Option<bool>> = series
        .bool()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Boolean Detection Utilities
// =============================================================================

/// Common boolean true representations.
pub const BOOLEAN_TRUE_VALUES: [&str; 8] =
    ["true", "yes", "1", "t", "y", "on", "enabled", "active"];

/// Common boolean false representations.
pub const BOOLEAN_FALSE_VALUES: [&str; 8] =
    ["false", "no", "0", "f", "n", "off", "disabled", "inactive"];

/// Parse a string as a boolean, if it is one of the known representations.
pub fn parse_boolean_string(s: &str) -> Option<bool> {
    let lower = s.trim().to_ascii_lowercase();
    if BOOLEAN_TRUE_VALUES.iter().any(|&v| v == lower) {
        Some(true)
    } else if BOOLEAN_FALSE_VALUES.iter().any(|&v| v == lower) {
        Some(false)
    } else {
        None
    }
}

// =============================================================================
// Column Name Utilities
// =============================================================================

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace run"));

/// Standardize a column name: trim, lower-case, whitespace runs to `_`.
///
/// ```rust,ignore
/// assert_eq!(standardize_name("  Loyalty   Number "), "loyalty_number");
/// ```
pub fn standardize_name(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(name.trim(), "_")
        .to_lowercase()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_predicates() {
        assert!(is_integer_dtype(&DataType::Int64));
        assert!(is_float_dtype(&DataType::Float32));
        assert!(is_numeric_dtype(&DataType::UInt16));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(is_datetime_dtype(&DataType::Date));
        assert!(is_boolean_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(850.04, 1), 850.0);
        assert_eq!(round_to(79245.6094, 1), 79245.6);
        assert_eq!(round_to(-2.25, 0), -2.0);
    }

    #[test]
    fn test_quantile_sorted_linear() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_sample_std() {
        // Mean = 3, Variance = 10/4 = 2.5
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[5.0]), None);
    }

    #[test]
    fn test_numeric_mode_tie_takes_smallest() {
        assert_eq!(numeric_mode(&[3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(numeric_mode(&[2.0, 2.0, 7.0]), Some(2.0));
        assert_eq!(numeric_mode(&[]), None);
    }

    #[test]
    fn test_integer_mode_is_exact_above_f64_precision() {
        let big = (1i64 << 53) + 1;
        assert_eq!(integer_mode(&[big, 7, big, 7, big]), Some(big));
        assert_eq!(integer_mode(&[4, 2, 4, 2]), Some(2));
        assert_eq!(integer_mode(&[]), None);
    }

    #[test]
    fn test_string_mode() {
        let series = Series::new("test".into(), &["a", "b", "a", "c", "a"]);
        assert_eq!(string_mode(&series), Some("a".to_string()));

        let tie = Series::new("test".into(), &["b", "a"]);
        assert_eq!(string_mode(&tie), Some("a".to_string()));

        let empty = Series::new("test".into(), &[Option::<&str>::None, None]);
        assert_eq!(string_mode(&empty), None);
    }

    #[test]
    fn test_value_counts_order() {
        let series = Series::new(
            "card".into(),
            &[Some("Star"), Some("Nova"), None, Some("Star"), Some("Aurora"), Some("Nova")],
        );
        let counts = value_counts(&series).unwrap();
        assert_eq!(
            counts,
            vec![
                ("Nova".to_string(), 2),
                ("Star".to_string(), 2),
                ("Aurora".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_distinct_non_null() {
        let series = Series::new("x".into(), &[Some(1i64), Some(1), None, Some(2)]);
        assert_eq!(distinct_non_null(&series).unwrap(), 2);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_fill_string_nulls_keeps_values_unquoted() {
        let series = Series::new("test".into(), &[Some("A"), None]);
        let filled = fill_string_nulls(&series, "Unknown").unwrap();
        let values: Vec<Option<&str>> = filled.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("A"), Some("Unknown")]);
    }

    #[test]
    fn test_parse_boolean_string() {
        assert_eq!(parse_boolean_string("YES"), Some(true));
        assert_eq!(parse_boolean_string(" 0 "), Some(false));
        assert_eq!(parse_boolean_string("Unknown"), None);
    }

    #[test]
    fn test_standardize_name() {
        assert_eq!(standardize_name("  Loyalty   Number "), "loyalty_number");
        assert_eq!(standardize_name("CLV"), "clv");
    }

    #[test]
    fn test_format_any_value() {
        let series = Series::new("s".into(), &[Some("Ontario"), None]);
        assert_eq!(format_any_value(&series.get(0).unwrap()), "Ontario");
        assert_eq!(format_any_value(&series.get(1).unwrap()), "null");
    }
}
