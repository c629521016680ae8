//! Statistical imputation methods.
//!
//! Provides mean, median and mode imputation for numeric columns, and mode or
//! new-category imputation for categorical and boolean columns. Each method
//! fills nulls in a single column of a [`Table`] and records what it did in a
//! [`CleaningLog`]; a column that does not fit the method is skipped with a
//! [`ColumnIssue`].

use crate::config::{CategoricalImputation, NumericImputation};
use crate::error::Result;
use crate::table::Table;
use crate::types::{CleaningLog, ColumnIssue, ColumnKind};
use crate::utils::{
    fill_boolean_nulls, fill_integer_nulls, fill_numeric_nulls, fill_string_nulls, integer_mode,
    mean, median, non_null_f64, non_null_i64, numeric_mode, parse_boolean_string, round_to,
    string_mode,
};
use polars::prelude::*;
use std::fmt;

/// Value used to fill a numeric column. Integral values stay exact.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FillValue {
    Integral(i64),
    Real(f64),
}

impl FillValue {
    fn from_f64(value: f64) -> Self {
        let in_range = value >= i64::MIN as f64 && value < -(i64::MIN as f64);
        if value.fract() == 0.0 && in_range {
            FillValue::Integral(value as i64)
        } else {
            FillValue::Real(value)
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            FillValue::Integral(v) => v as f64,
            FillValue::Real(v) => v,
        }
    }
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillValue::Integral(v) => write!(f, "{}", v),
            FillValue::Real(v) => write!(f, "{}", v),
        }
    }
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill nulls of a numeric column with its mean, median or mode.
    ///
    /// Mean and median are rounded to one decimal. An Integer or DatePart
    /// column keeps its kind when the fill value is integral and becomes
    /// Float otherwise.
    pub fn apply_numeric(
        table: &mut Table,
        col_name: &str,
        method: NumericImputation,
        log: &mut CleaningLog,
    ) -> Result<()> {
        let Some(kind) = Self::checked_kind(table, col_name, log) else {
            return Ok(());
        };
        if !kind.is_numeric() {
            log.issue(ColumnIssue::wrong_type(col_name, "numeric", kind));
            return Ok(());
        }

        let series = table.series(col_name)?.clone();
        if series.null_count() == 0 {
            log.step(format!("'{}' has no nulls; nothing to impute", col_name));
            return Ok(());
        }

        let integer_kind = matches!(kind, ColumnKind::Integer | ColumnKind::DatePart);
        let fill_value = match method {
            NumericImputation::Mode if integer_kind => {
                integer_mode(&non_null_i64(&series)?).map(FillValue::Integral)
            }
            NumericImputation::Mode => numeric_mode(&non_null_f64(&series)?).map(FillValue::from_f64),
            NumericImputation::Mean => mean(&non_null_f64(&series)?)
                .map(|v| FillValue::from_f64(round_to(v, 1))),
            NumericImputation::Median => median(&non_null_f64(&series)?)
                .map(|v| FillValue::from_f64(round_to(v, 1))),
        };
        let Some(fill_value) = fill_value else {
            log.issue(ColumnIssue::EmptyColumn {
                column: col_name.to_string(),
            });
            return Ok(());
        };

        Self::fill_with_value(table, col_name, kind, fill_value, &series, log, method)
    }

    /// Fill nulls of a Text or Category column with its mode or a literal.
    pub fn apply_categorical(
        table: &mut Table,
        col_name: &str,
        method: &CategoricalImputation,
        log: &mut CleaningLog,
    ) -> Result<()> {
        let Some(kind) = Self::checked_kind(table, col_name, log) else {
            return Ok(());
        };
        if !kind.is_categorical() {
            log.issue(ColumnIssue::wrong_type(col_name, "text or category", kind));
            return Ok(());
        }

        let series = table.series(col_name)?;
        let fill_value = match method {
            CategoricalImputation::Mode => match string_mode(series) {
                Some(mode) => mode,
                None => {
                    log.issue(ColumnIssue::EmptyColumn {
                        column: col_name.to_string(),
                    });
                    return Ok(());
                }
            },
            CategoricalImputation::NewCategory(literal) => literal.clone(),
        };

        let nulls = series.null_count();
        let filled = fill_string_nulls(series, &fill_value)?;
        table.replace_column(filled, kind)?;

        log.step(format!(
            "Filled {} nulls in '{}' with {}: '{}'",
            nulls,
            col_name,
            Self::describe(method),
            fill_value
        ));
        Ok(())
    }

    /// Fill nulls of a Boolean column with its mode or a literal.
    ///
    /// A literal that reads as a boolean (`true`, `no`, `1`, ...) keeps the
    /// column Boolean. Any other literal turns the column into Text holding
    /// `true`, `false` and the literal.
    pub fn apply_boolean(
        table: &mut Table,
        col_name: &str,
        method: &CategoricalImputation,
        log: &mut CleaningLog,
    ) -> Result<()> {
        let Some(kind) = Self::checked_kind(table, col_name, log) else {
            return Ok(());
        };
        if !kind.is_boolean() {
            log.issue(ColumnIssue::wrong_type(col_name, "boolean", kind));
            return Ok(());
        }

        let series = table.series(col_name)?;
        let nulls = series.null_count();

        match method {
            CategoricalImputation::Mode => {
                let Some(mode) = boolean_mode(series)? else {
                    log.issue(ColumnIssue::EmptyColumn {
                        column: col_name.to_string(),
                    });
                    return Ok(());
                };
                let filled = fill_boolean_nulls(series, mode)?;
                table.replace_column(filled, ColumnKind::Boolean)?;
                log.step(format!(
                    "Filled {} nulls in '{}' with mode: {}",
                    nulls, col_name, mode
                ));
            }
            CategoricalImputation::NewCategory(literal) => match parse_boolean_string(literal) {
                Some(value) => {
                    let filled = fill_boolean_nulls(series, value)?;
                    table.replace_column(filled, ColumnKind::Boolean)?;
                    log.step(format!(
                        "Filled {} nulls in '{}' with {}",
                        nulls, col_name, value
                    ));
                }
                None => {
                    let filled = fill_string_nulls(series, literal)?;
                    table.replace_column(filled, ColumnKind::Text)?;
                    log.step(format!(
                        "Filled {} nulls in '{}' with new category '{}'; column is now text",
                        nulls, col_name, literal
                    ));
                }
            },
        }
        Ok(())
    }

    fn checked_kind(table: &Table, col_name: &str, log: &mut CleaningLog) -> Option<ColumnKind> {
        let kind = table.kind(col_name);
        if kind.is_none() {
            log.issue(ColumnIssue::MissingColumn {
                column: col_name.to_string(),
            });
        }
        kind
    }

    fn describe(method: &CategoricalImputation) -> &'static str {
        match method {
            CategoricalImputation::Mode => "mode",
            CategoricalImputation::NewCategory(_) => "new category",
        }
    }

    /// Fill numeric column with a specific value.
    fn fill_with_value(
        table: &mut Table,
        col_name: &str,
        kind: ColumnKind,
        fill_value: FillValue,
        series: &Series,
        log: &mut CleaningLog,
        method: NumericImputation,
    ) -> Result<()> {
        let (filled, new_kind) = match (kind, fill_value) {
            (ColumnKind::Integer, FillValue::Integral(v)) => {
                (fill_integer_nulls(series, v)?, ColumnKind::Integer)
            }
            (ColumnKind::DatePart, FillValue::Integral(v)) => (
                fill_integer_nulls(series, v)?.strict_cast(&DataType::Int32)?,
                ColumnKind::DatePart,
            ),
            (_, fill) => (fill_numeric_nulls(series, fill.as_f64())?, ColumnKind::Float),
        };
        table.replace_column(filled, new_kind)?;

        log.step(format!(
            "Filled {} nulls in '{}' with {}: {}",
            series.null_count(),
            col_name,
            method,
            fill_value
        ));
        if new_kind != kind {
            log.step(format!("'{}' changed from {} to {}", col_name, kind, new_kind));
        }
        Ok(())
    }
}

/// Most frequent boolean; a tie resolves to `false`.
fn boolean_mode(series: &Series) -> Result<Option<bool>> {
    let (trues, falses) = series
        .bool()?
        .into_iter()
        .flatten()
        .fold((0usize, 0usize), |(t, f), v| if v { (t + 1, f) } else { (t, f + 1) });

    Ok(match (trues, falses) {
        (0, 0) => None,
        (t, f) => Some(t > f),
    })
}
