//! Data cleaning module for the loyalty tables.
//!
//! This module provides functionality for:
//! - Normalizing the sign of numeric columns
//! - Reporting and imputing nulls
//! - Reporting duplicates and removing duplicate rows
//! - Dropping columns
//! - Strict type coercion
//!
//! Every transforming operation takes the [`Table`] by value and returns the
//! new table together with a [`CleaningLog`]. Callers that need the original
//! clone it first. Column-level problems (a missing column, a column of the
//! wrong kind) are logged as issues and never abort the operation.

mod caster;
mod duplicates;
mod nulls;

pub use duplicates::{ColumnDuplicates, DuplicateReport};
pub use nulls::{ColumnNulls, NullReport};

use crate::config::{CategoricalImputation, NumericImputation};
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::table::Table;
use crate::types::{CleaningLog, ColumnIssue, ColumnKind};
use crate::utils::standardize_name;
use polars::prelude::*;
use tracing::info;

/// Stateless cleaning operations over a [`Table`].
pub struct Cleaner;

impl Cleaner {
    /// Replace negative values of a numeric column with their absolute value.
    ///
    /// Nulls are left untouched.
    pub fn fix_sign(mut table: Table, column: &str) -> Result<(Table, CleaningLog)> {
        let mut log = CleaningLog::new();
        let Some(kind) = table.kind(column) else {
            log.issue(ColumnIssue::MissingColumn {
                column: column.to_string(),
            });
            return Ok((table, log));
        };

        let series = table.series(column)?;
        let name = series.name().clone();
        let (fixed, negatives) = match kind {
            ColumnKind::Float => {
                let values = series.cast(&DataType::Float64)?;
                let values = values.f64()?;
                let negatives = values.into_iter().flatten().filter(|v| *v < 0.0).count();
                let fixed: Float64Chunked = values.apply_values(f64::abs);
                (fixed.with_name(name).into_series(), negatives)
            }
            ColumnKind::Integer | ColumnKind::DatePart => {
                let values = series.cast(&DataType::Int64)?;
                let values = values.i64()?;
                let negatives = values.into_iter().flatten().filter(|v| *v < 0).count();
                let fixed: Int64Chunked = values.apply_values(i64::saturating_abs);
                let fixed = fixed.with_name(name).into_series();
                (fixed.cast(&kind.physical_dtype())?, negatives)
            }
            other => {
                log.issue(ColumnIssue::wrong_type(column, "numeric", other));
                return Ok((table, log));
            }
        };

        table.replace_column(fixed, kind)?;
        log.step(format!(
            "Made {} negative values in '{}' positive",
            negatives, column
        ));
        Ok((table, log))
    }

    /// Per-column null counts and the columns with nulls grouped by kind.
    pub fn null_report(table: &Table) -> Result<NullReport> {
        nulls::null_report(table)
    }

    /// Fill nulls in numeric columns with their mean, median or mode.
    pub fn impute_numeric(
        mut table: Table,
        columns: &[&str],
        method: NumericImputation,
    ) -> Result<(Table, CleaningLog)> {
        let mut log = CleaningLog::new();
        for column in columns {
            StatisticalImputer::apply_numeric(&mut table, column, method, &mut log)
                .context(format!("Imputing '{}'", column))?;
        }
        Ok((table, log))
    }

    /// Fill nulls in Text or Category columns with the mode or a literal.
    pub fn impute_categorical(
        mut table: Table,
        columns: &[&str],
        method: &CategoricalImputation,
    ) -> Result<(Table, CleaningLog)> {
        let mut log = CleaningLog::new();
        for column in columns {
            StatisticalImputer::apply_categorical(&mut table, column, method, &mut log)
                .context(format!("Imputing '{}'", column))?;
        }
        Ok((table, log))
    }

    /// Fill nulls in Boolean columns with the mode or a literal.
    pub fn impute_boolean(
        mut table: Table,
        columns: &[&str],
        method: &CategoricalImputation,
    ) -> Result<(Table, CleaningLog)> {
        let mut log = CleaningLog::new();
        for column in columns {
            StatisticalImputer::apply_boolean(&mut table, column, method, &mut log)
                .context(format!("Imputing '{}'", column))?;
        }
        Ok((table, log))
    }

    /// Repeated values per column and fully duplicated rows.
    pub fn duplicate_report(table: &Table) -> Result<DuplicateReport> {
        duplicates::duplicate_report(table)
    }

    /// Remove columns flagged by the duplicate report.
    pub fn drop_duplicate_columns(
        table: Table,
        columns: &[&str],
    ) -> Result<(Table, CleaningLog)> {
        Self::remove_columns(table, columns, "repeated-value column")
    }

    /// Remove duplicate rows, keeping the first occurrence.
    ///
    /// With a `subset`, rows are compared on those columns only.
    pub fn remove_duplicate_rows(
        table: Table,
        subset: Option<&[&str]>,
    ) -> Result<(Table, CleaningLog)> {
        duplicates::remove_duplicate_rows(table, subset)
    }

    /// Coerce columns to `kind`, failing on the first value that does not fit.
    pub fn cast(
        mut table: Table,
        columns: &[&str],
        kind: ColumnKind,
    ) -> Result<(Table, CleaningLog)> {
        let mut log = CleaningLog::new();
        for column in columns {
            let Some(from) = table.kind(column) else {
                log.issue(ColumnIssue::MissingColumn {
                    column: column.to_string(),
                });
                continue;
            };

            let converted = caster::coerce_series(table.series(column)?, from, kind)?;
            table.replace_column(converted, kind)?;
            log.step(format!("Cast '{}' from {} to {}", column, from, kind));
        }
        info!(
            "Cast {} columns of '{}' to {}",
            log.steps.len(),
            table.name(),
            kind
        );
        Ok((table, log))
    }

    /// Remove the named columns.
    pub fn drop_columns(table: Table, columns: &[&str]) -> Result<(Table, CleaningLog)> {
        Self::remove_columns(table, columns, "column")
    }

    /// Trim, lower-case and underscore every column name.
    pub fn standardize_column_names(mut table: Table) -> Result<(Table, CleaningLog)> {
        let mut log = CleaningLog::new();
        let old_names = table.column_names();
        let new_names: Vec<String> = old_names.iter().map(|n| standardize_name(n)).collect();

        table.rename_columns(&new_names)?;
        for (old, new) in old_names.iter().zip(&new_names) {
            if old != new {
                log.step(format!("Renamed '{}' to '{}'", old, new));
            }
        }
        Ok((table, log))
    }

    fn remove_columns(
        mut table: Table,
        columns: &[&str],
        what: &str,
    ) -> Result<(Table, CleaningLog)> {
        let mut log = CleaningLog::new();
        for column in columns {
            if !table.has_column(column) {
                log.issue(ColumnIssue::MissingColumn {
                    column: column.to_string(),
                });
                continue;
            }
            table.drop_column(column)?;
            log.step(format!("Dropped {} '{}'", what, column));
        }
        Ok((table, log))
    }
}
