//! Descriptive statistics for numeric and categorical columns.

use crate::config::DisplayOptions;
use crate::error::Result;
use crate::table::{Table, render_text_table};
use crate::utils::{mean, non_null_f64, quantile_sorted, sample_std, value_counts};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::debug;

/// count / mean / std / min / quartiles / max of one numeric column.
///
/// Statistics are `None` when the column has no values (and `std` also when
/// it has a single value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericDescription {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericDescription {
    /// Describe a set of values under the given label.
    pub fn from_values(column: impl Into<String>, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            column: column.into(),
            count: sorted.len(),
            mean: mean(&sorted),
            std: sample_std(&sorted),
            min: sorted.first().copied(),
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Value counts of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub column: String,
    /// (value, count), descending by count, ties by value ascending.
    pub counts: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn count_of(&self, value: &str) -> usize {
        self.counts
            .iter()
            .find(|(v, _)| v == value)
            .map_or(0, |(_, c)| *c)
    }
}

/// Render numeric descriptions as a table, one row per column.
pub fn render_numeric(stats: &[NumericDescription], options: &DisplayOptions) -> String {
    let fmt = |v: Option<f64>| match v {
        Some(v) => format!("{:.*}", options.float_precision, v),
        None => "-".to_string(),
    };
    let headers = ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        .map(String::from);
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            vec![
                s.column.clone(),
                s.count.to_string(),
                fmt(s.mean),
                fmt(s.std),
                fmt(s.min),
                fmt(s.q25),
                fmt(s.median),
                fmt(s.q75),
                fmt(s.max),
            ]
        })
        .collect();
    render_text_table(&headers, &rows)
}

/// Render frequency tables, listing at most `options.max_listed_values` values each.
pub fn render_frequencies(tables: &[FrequencyTable], options: &DisplayOptions) -> String {
    let mut out = String::new();
    for table in tables {
        let _ = writeln!(out, "{}:", table.column);
        for (value, count) in table.counts.iter().take(options.max_listed_values) {
            let _ = writeln!(out, "  {:<24} {}", value, count);
        }
        let hidden = table.counts.len().saturating_sub(options.max_listed_values);
        if hidden > 0 {
            let _ = writeln!(out, "  ... (+{} more)", hidden);
        }
    }
    out
}

/// Stateless summary statistics over a [`Table`].
pub struct Summarizer;

impl Summarizer {
    /// Describe every Integer, Float and DatePart column.
    pub fn numeric_stats(table: &Table) -> Result<Vec<NumericDescription>> {
        let mut stats = Vec::new();
        for meta in table.schema().iter().filter(|m| m.kind.is_numeric()) {
            let values = non_null_f64(table.series(&meta.name)?)?;
            stats.push(NumericDescription::from_values(meta.name.clone(), &values));
        }
        debug!(
            "Described {} numeric columns of '{}'",
            stats.len(),
            table.name()
        );
        Ok(stats)
    }

    /// Count the values of every Text and Category column, nulls excluded.
    pub fn categorical_frequencies(table: &Table) -> Result<Vec<FrequencyTable>> {
        let mut tables = Vec::new();
        for meta in table.schema().iter().filter(|m| m.kind.is_categorical()) {
            tables.push(FrequencyTable {
                column: meta.name.clone(),
                counts: value_counts(table.series(&meta.name)?)?,
            });
        }
        debug!(
            "Counted values of {} categorical columns of '{}'",
            tables.len(),
            table.name()
        );
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn profile() -> Table {
        let df = df![
            "Salary" => [Some(10.0), Some(20.0), None, Some(30.0), Some(40.0)],
            "Loyalty Card" => [Some("Star"), Some("Nova"), Some("Star"), None, Some("Aurora")],
            "Enrollment Year" => [2015i64, 2016, 2016, 2018, 2021],
            "Active" => [true, false, true, true, false],
        ]
        .unwrap();
        Table::new("profile", df)
    }

    // ========================================================================
    // numeric_stats() tests
    // ========================================================================

    #[test]
    fn test_numeric_stats_selects_numeric_columns() {
        let stats = Summarizer::numeric_stats(&profile()).unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, vec!["Salary", "Enrollment Year"]);
    }

    #[test]
    fn test_numeric_stats_values() {
        let stats = Summarizer::numeric_stats(&profile()).unwrap();
        let salary = &stats[0];

        assert_eq!(salary.count, 4);
        assert_eq!(salary.mean, Some(25.0));
        assert_eq!(salary.min, Some(10.0));
        assert_eq!(salary.q25, Some(17.5));
        assert_eq!(salary.median, Some(25.0));
        assert_eq!(salary.q75, Some(32.5));
        assert_eq!(salary.max, Some(40.0));
        let std = salary.std.unwrap();
        assert!((std - 12.909944487358056).abs() < 1e-9);
    }

    #[test]
    fn test_describe_empty_values() {
        let empty = NumericDescription::from_values("x", &[]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
        assert_eq!(empty.max, None);
    }

    // ========================================================================
    // categorical_frequencies() tests
    // ========================================================================

    #[test]
    fn test_categorical_frequencies_order() {
        let tables = Summarizer::categorical_frequencies(&profile()).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].counts,
            vec![
                ("Star".to_string(), 2),
                ("Aurora".to_string(), 1),
                ("Nova".to_string(), 1),
            ]
        );
        assert_eq!(tables[0].count_of("Nova"), 1);
        assert_eq!(tables[0].count_of("Gold"), 0);
    }

    #[test]
    fn test_render_frequencies_truncates() {
        let tables = Summarizer::categorical_frequencies(&profile()).unwrap();
        let options = DisplayOptions {
            max_listed_values: 1,
            ..DisplayOptions::default()
        };
        let text = render_frequencies(&tables, &options);
        assert!(text.contains("Star"));
        assert!(text.contains("(+2 more)"));
    }
}
