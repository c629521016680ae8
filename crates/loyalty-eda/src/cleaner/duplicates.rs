//! Duplicate detection by column and by row.

use crate::error::{Result, ResultExt};
use crate::table::Table;
use crate::types::{CleaningLog, ColumnIssue};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Repeated values in a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDuplicates {
    pub column: String,
    /// rows - distinct values (null counts as a value)
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub table: String,
    pub rows: usize,
    /// Rows that repeat an earlier row in every column.
    pub duplicate_rows: usize,
    /// Only columns with at least one repeated value, in table order.
    pub columns: Vec<ColumnDuplicates>,
}

impl DuplicateReport {
    pub fn duplicates_in(&self, column: &str) -> usize {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map_or(0, |c| c.duplicates)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Duplicates in '{}': {} duplicate rows out of {}",
            self.table, self.duplicate_rows, self.rows
        );
        for column in &self.columns {
            let _ = writeln!(out, "  {}: {}", column.column, column.duplicates);
        }
        out
    }
}

pub(crate) fn duplicate_report(table: &Table) -> Result<DuplicateReport> {
    let rows = table.height();
    let mut columns = Vec::new();

    for meta in table.schema() {
        let distinct = table.series(&meta.name)?.n_unique()?;
        let duplicates = rows.saturating_sub(distinct);
        if duplicates > 0 {
            columns.push(ColumnDuplicates {
                column: meta.name.clone(),
                duplicates,
            });
        }
    }

    let duplicate_rows = rows - first_occurrences(table, None)?.height();

    Ok(DuplicateReport {
        table: table.name().to_string(),
        rows,
        duplicate_rows,
        columns,
    })
}

pub(crate) fn remove_duplicate_rows(
    mut table: Table,
    subset: Option<&[&str]>,
) -> Result<(Table, CleaningLog)> {
    let mut log = CleaningLog::new();

    let key_columns: Vec<String> = match subset {
        Some(names) => {
            let mut present = Vec::with_capacity(names.len());
            for name in names {
                if table.has_column(name) {
                    present.push(name.to_string());
                } else {
                    log.issue(ColumnIssue::MissingColumn {
                        column: name.to_string(),
                    });
                }
            }
            present
        }
        None => table.column_names(),
    };

    if key_columns.is_empty() {
        log.step("No key columns left to judge duplicate rows; table unchanged");
        return Ok((table, log));
    }

    let frame = first_occurrences(&table, Some(key_columns.as_slice()))?;
    let removed = table.height() - frame.height();
    if removed == 0 {
        log.step(format!("No duplicate rows in '{}'", table.name()));
        return Ok((table, log));
    }

    table.replace_frame(frame);
    log.step(format!(
        "Removed {} duplicate rows from '{}' (judged on {} columns), keeping first occurrences",
        removed,
        table.name(),
        key_columns.len()
    ));

    Ok((table, log))
}

/// The first row of each combination of key values (all columns when
/// `subset` is `None`), in table order. Nulls compare equal to each other.
fn first_occurrences(table: &Table, subset: Option<&[String]>) -> Result<DataFrame> {
    let selector = subset.map(|names| cols(names.to_vec()));
    table
        .frame()
        .clone()
        .lazy()
        .unique_stable(selector, UniqueKeepStrategy::First)
        .collect()
        .context(format!("Finding duplicate rows in '{}'", table.name()))
}
