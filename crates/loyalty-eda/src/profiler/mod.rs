//! Read-only profiling of a table.
//!
//! This module answers the first questions asked of any freshly loaded
//! dataset:
//! - Shape, column names, declared kinds and physical dtypes
//! - Null and distinct value counts per column
//! - The distinct values themselves
//!
//! Every report serializes with serde and renders to text through a
//! `render(&DisplayOptions)` method.

use crate::config::DisplayOptions;
use crate::error::Result;
use crate::table::{Table, render_text_table};
use crate::types::ColumnKind;
use crate::utils::{distinct_non_null, series_to_strings};
use polars::prelude::*;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use tracing::debug;

const SAMPLE_VALUES: usize = 5;

/// Structural information about one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub kind: ColumnKind,
    /// Physical polars dtype, e.g. "i64" or "str".
    pub dtype: String,
    pub non_null: usize,
    /// A few non-null values picked with a fixed seed.
    pub sample_values: Vec<String>,
}

/// Structural summary of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOverview {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub column_info: Vec<ColumnOverview>,
    /// Rows identical to an earlier row.
    pub duplicate_rows: usize,
    pub estimated_bytes: usize,
}

impl TableOverview {
    pub fn render(&self, options: &DisplayOptions) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Table '{}': {} rows x {} columns ({} duplicate rows, ~{:.1} KiB)",
            self.table,
            self.rows,
            self.columns,
            self.duplicate_rows,
            self.estimated_bytes as f64 / 1024.0
        );

        let headers = ["column", "kind", "dtype", "non-null", "sample"].map(String::from);
        let rows: Vec<Vec<String>> = self
            .column_info
            .iter()
            .map(|c| {
                let shown: Vec<&str> = c
                    .sample_values
                    .iter()
                    .take(options.max_listed_values)
                    .map(String::as_str)
                    .collect();
                vec![
                    c.name.clone(),
                    c.kind.to_string(),
                    c.dtype.clone(),
                    c.non_null.to_string(),
                    shown.join(", "),
                ]
            })
            .collect();
        out.push_str(&render_text_table(&headers, &rows));
        out
    }
}

/// Null and distinct counts for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub null_count: usize,
    /// Distinct non-null values.
    pub distinct: usize,
}

/// Per-column null and distinct counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub column_summaries: Vec<ColumnSummary>,
}

impl TableSummary {
    pub fn render(&self, _options: &DisplayOptions) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Summary of '{}' ({} rows x {} columns)",
            self.table, self.rows, self.columns
        );
        let headers = ["column", "kind", "nulls", "distinct"].map(String::from);
        let rows: Vec<Vec<String>> = self
            .column_summaries
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.kind.to_string(),
                    c.null_count.to_string(),
                    c.distinct.to_string(),
                ]
            })
            .collect();
        out.push_str(&render_text_table(&headers, &rows));
        out
    }
}

/// Distinct values of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnUniqueValues {
    pub name: String,
    /// Distinct non-null values.
    pub distinct: usize,
    /// Distinct values in first-appearance order; `null` appears as a value
    /// when the column has nulls.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueValuesReport {
    pub table: String,
    pub columns: Vec<ColumnUniqueValues>,
}

impl UniqueValuesReport {
    pub fn column(&self, name: &str) -> Option<&ColumnUniqueValues> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Lists at most `options.max_listed_values` values per column.
    pub fn render(&self, options: &DisplayOptions) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Distinct values of '{}'", self.table);
        for column in &self.columns {
            let shown: Vec<&str> = column
                .values
                .iter()
                .take(options.max_listed_values)
                .map(String::as_str)
                .collect();
            let hidden = column.values.len().saturating_sub(shown.len());
            let suffix = if hidden > 0 {
                format!(", ... (+{} more)", hidden)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "  {} ({} distinct): [{}{}]",
                column.name,
                column.distinct,
                shown.join(", "),
                suffix
            );
        }
        out
    }
}

/// Read-only profiler over a [`Table`].
pub struct Profiler;

impl Profiler {
    /// Structural summary: shape, names, kinds, dtypes and non-null counts.
    pub fn explore(table: &Table) -> Result<TableOverview> {
        let frame = table.frame();
        let mut column_info = Vec::with_capacity(table.width());

        for meta in table.schema() {
            let series = table.series(&meta.name)?;
            column_info.push(ColumnOverview {
                name: meta.name.clone(),
                kind: meta.kind,
                dtype: series.dtype().to_string(),
                non_null: series.len() - series.null_count(),
                sample_values: Self::sample_values(series)?,
            });
        }

        let duplicate_rows = frame.height()
            - frame
                .unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?
                .height();

        debug!(
            "Explored '{}': {} columns, {} duplicate rows",
            table.name(),
            table.width(),
            duplicate_rows
        );

        Ok(TableOverview {
            table: table.name().to_string(),
            rows: table.height(),
            columns: table.width(),
            column_names: table.column_names(),
            column_info,
            duplicate_rows,
            estimated_bytes: frame.estimated_size(),
        })
    }

    /// Null count and distinct non-null count per column.
    pub fn summarize(table: &Table) -> Result<TableSummary> {
        let mut column_summaries = Vec::with_capacity(table.width());
        for meta in table.schema() {
            let series = table.series(&meta.name)?;
            column_summaries.push(ColumnSummary {
                name: meta.name.clone(),
                kind: meta.kind,
                null_count: series.null_count(),
                distinct: distinct_non_null(series)?,
            });
        }

        Ok(TableSummary {
            table: table.name().to_string(),
            rows: table.height(),
            columns: table.width(),
            column_summaries,
        })
    }

    /// Distinct values of every column, in first-appearance order.
    pub fn unique_values(table: &Table) -> Result<UniqueValuesReport> {
        let mut columns = Vec::with_capacity(table.width());
        for meta in table.schema() {
            let series = table.series(&meta.name)?;
            let mut seen: HashSet<Option<String>> = HashSet::new();
            let mut values = Vec::new();

            for value in series_to_strings(series)? {
                if seen.insert(value.clone()) {
                    values.push(value.unwrap_or_else(|| "null".to_string()));
                }
            }

            columns.push(ColumnUniqueValues {
                name: meta.name.clone(),
                distinct: distinct_non_null(series)?,
                values,
            });
        }

        Ok(UniqueValuesReport {
            table: table.name().to_string(),
            columns,
        })
    }

    fn sample_values(series: &Series) -> Result<Vec<String>> {
        let non_null = series.drop_nulls();
        if non_null.is_empty() {
            return Ok(Vec::new());
        }

        let sample_size = SAMPLE_VALUES.min(non_null.len());
        let mut rng = StdRng::seed_from_u64(42);
        let all_indices: Vec<usize> = (0..non_null.len()).collect();
        let mut indices: Vec<usize> = all_indices
            .choose_multiple(&mut rng, sample_size)
            .copied()
            .collect();
        indices.sort_unstable();

        let strings = series_to_strings(&non_null)?;
        Ok(indices
            .into_iter()
            .filter_map(|idx| strings.get(idx).cloned().flatten())
            .collect())
    }
}
