//! Null accounting for a table.

use crate::config::DisplayOptions;
use crate::error::Result;
use crate::table::{Table, render_text_table};
use crate::types::ColumnKind;
use crate::utils::round_to;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Null count of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNulls {
    pub column: String,
    pub kind: ColumnKind,
    pub null_count: usize,
    /// Share of rows that are null, 0-100.
    pub null_percentage: f64,
}

/// Null counts for every column plus the columns that need imputation,
/// grouped by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullReport {
    pub table: String,
    pub rows: usize,
    /// Every column, in table order.
    pub columns: Vec<ColumnNulls>,
    /// Columns with at least one null, by percentage descending.
    pub with_nulls: Vec<ColumnNulls>,
    /// Text and category columns with nulls.
    pub categorical: Vec<String>,
    /// Integer, float and date-part columns with nulls.
    pub numeric: Vec<String>,
    /// Boolean columns with nulls.
    pub boolean: Vec<String>,
}

impl NullReport {
    pub fn has_nulls(&self) -> bool {
        !self.with_nulls.is_empty()
    }

    pub fn render(&self, options: &DisplayOptions) -> String {
        let mut out = String::new();
        if !self.has_nulls() {
            let _ = writeln!(out, "'{}' has no null values", self.table);
            return out;
        }

        let _ = writeln!(out, "Null values in '{}' ({} rows)", self.table, self.rows);
        let headers = ["column", "kind", "nulls", "%"].map(String::from);
        let rows: Vec<Vec<String>> = self
            .with_nulls
            .iter()
            .map(|c| {
                vec![
                    c.column.clone(),
                    c.kind.to_string(),
                    c.null_count.to_string(),
                    format!("{:.*}", options.float_precision, c.null_percentage),
                ]
            })
            .collect();
        out.push_str(&render_text_table(&headers, &rows));

        for (label, group) in [
            ("categorical", &self.categorical),
            ("numeric", &self.numeric),
            ("boolean", &self.boolean),
        ] {
            if !group.is_empty() {
                let _ = writeln!(out, "  {} with nulls: {}", label, group.join(", "));
            }
        }
        out
    }
}

pub(crate) fn null_report(table: &Table) -> Result<NullReport> {
    let rows = table.height();
    let mut columns = Vec::with_capacity(table.width());

    for meta in table.schema() {
        let null_count = table.null_count(&meta.name)?;
        let null_percentage = if rows > 0 {
            round_to(null_count as f64 / rows as f64 * 100.0, 2)
        } else {
            0.0
        };
        columns.push(ColumnNulls {
            column: meta.name.clone(),
            kind: meta.kind,
            null_count,
            null_percentage,
        });
    }

    let mut with_nulls: Vec<ColumnNulls> = columns
        .iter()
        .filter(|c| c.null_count > 0)
        .cloned()
        .collect();
    with_nulls.sort_by(|a, b| b.null_percentage.total_cmp(&a.null_percentage));

    let names_where = |pred: fn(&ColumnKind) -> bool| -> Vec<String> {
        columns
            .iter()
            .filter(|c| c.null_count > 0 && pred(&c.kind))
            .map(|c| c.column.clone())
            .collect()
    };
    let categorical = names_where(ColumnKind::is_categorical);
    let numeric = names_where(ColumnKind::is_numeric);
    let boolean = names_where(ColumnKind::is_boolean);

    Ok(NullReport {
        table: table.name().to_string(),
        rows,
        columns,
        with_nulls,
        categorical,
        numeric,
        boolean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_null_report_groups_and_orders() {
        let df = df![
            "Loyalty Number" => [1i64, 2, 3, 4],
            "Salary" => [Some(1.0), None, None, Some(4.0)],
            "Education" => [Some("College"), None, Some("Master"), Some("Doctor")],
            "Active" => [Some(true), Some(false), None, None],
        ]
        .unwrap();
        let report = null_report(&Table::new("profile", df)).unwrap();

        assert_eq!(report.columns.len(), 4);
        assert_eq!(report.columns[0].null_count, 0);

        let ordered: Vec<&str> = report.with_nulls.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(ordered, vec!["Salary", "Active", "Education"]);
        assert_eq!(report.with_nulls[2].null_percentage, 25.0);

        assert_eq!(report.numeric, vec!["Salary"]);
        assert_eq!(report.categorical, vec!["Education"]);
        assert_eq!(report.boolean, vec!["Active"]);
    }

    #[test]
    fn test_null_report_clean_table() {
        let df = df!["a" => [1i64, 2]].unwrap();
        let report = null_report(&Table::new("t", df)).unwrap();
        assert!(!report.has_nulls());
        assert!(report.render(&DisplayOptions::default()).contains("no null values"));
    }
}
