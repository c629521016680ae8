//! The [`Table`] type threaded through every pipeline stage.
//!
//! A table pairs a polars `DataFrame` with an explicit schema of
//! [`ColumnMeta`] entries. The frame holds the values; the schema holds the
//! semantic [`ColumnKind`] of each column, which is what every operation
//! matches on.

use crate::config::DisplayOptions;
use crate::error::{EdaError, Result};
use crate::types::{ColumnKind, ColumnMeta};
use crate::utils::format_any_value;
use polars::prelude::*;
use std::fmt::Write as _;

/// A named in-memory table with a semantic schema.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    frame: DataFrame,
    schema: Vec<ColumnMeta>,
}

static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// Wrap a frame, inferring each column's kind from its dtype.
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        let schema = frame
            .get_columns()
            .iter()
            .map(|col| ColumnMeta {
                name: col.name().to_string(),
                kind: ColumnKind::from_dtype(col.dtype()),
            })
            .collect();

        Self {
            name: name.into(),
            frame,
            schema,
        }
    }

    /// Wrap a frame with a known schema. The schema must list the frame's
    /// columns in order.
    pub(crate) fn from_parts(
        name: impl Into<String>,
        frame: DataFrame,
        schema: Vec<ColumnMeta>,
    ) -> Self {
        debug_assert_eq!(frame.width(), schema.len());
        Self {
            name: name.into(),
            frame,
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    pub fn schema(&self) -> &[ColumnMeta] {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.iter().map(|meta| meta.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.iter().any(|meta| meta.name == name)
    }

    /// Kind of the named column, if it exists.
    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.schema
            .iter()
            .find(|meta| meta.name == name)
            .map(|meta| meta.kind)
    }

    /// The named column as a Series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        if !self.has_column(name) {
            return Err(EdaError::ColumnNotFound(name.to_string()));
        }
        Ok(self.frame.column(name)?.as_materialized_series())
    }

    pub fn null_count(&self, name: &str) -> Result<usize> {
        Ok(self.series(name)?.null_count())
    }

    /// Swap in new values for an existing column, keeping its position.
    pub(crate) fn replace_column(&mut self, series: Series, kind: ColumnKind) -> Result<()> {
        let name = series.name().to_string();
        let meta = self
            .schema
            .iter_mut()
            .find(|meta| meta.name == name)
            .ok_or_else(|| EdaError::ColumnNotFound(name.clone()))?;
        self.frame.with_column(series)?;
        meta.kind = kind;
        Ok(())
    }

    /// Remove a column from the frame and the schema.
    pub(crate) fn drop_column(&mut self, name: &str) -> Result<()> {
        if !self.has_column(name) {
            return Err(EdaError::ColumnNotFound(name.to_string()));
        }
        self.frame.drop_in_place(name)?;
        self.schema.retain(|meta| meta.name != name);
        Ok(())
    }

    /// Replace the frame after a row-level operation that keeps the columns.
    pub(crate) fn replace_frame(&mut self, frame: DataFrame) {
        debug_assert_eq!(frame.width(), self.schema.len());
        self.frame = frame;
    }

    /// Rename every column, keeping values and kinds.
    pub(crate) fn rename_columns(&mut self, new_names: &[String]) -> Result<()> {
        self.frame.set_column_names(new_names.iter().map(String::as_str))?;
        for (meta, name) in self.schema.iter_mut().zip(new_names) {
            meta.name = name.clone();
        }
        Ok(())
    }

    /// First `n` rows as a new table with the same schema.
    pub fn head(&self, n: usize) -> Table {
        Table::from_parts(
            self.name.clone(),
            self.frame.head(Some(n)),
            self.schema.clone(),
        )
    }

    /// Render the first `options.preview_rows` rows as an aligned text table.
    pub fn preview(&self, options: &DisplayOptions) -> String {
        let rows = options.preview_rows.min(self.height());
        let headers = self.column_names();
        let mut cells: Vec<Vec<String>> = Vec::with_capacity(rows);

        for row in 0..rows {
            let values = self
                .frame
                .get_columns()
                .iter()
                .map(|col| match col.get(row) {
                    Ok(AnyValue::Float64(v)) => format!("{:.*}", options.float_precision, v),
                    Ok(AnyValue::Float32(v)) => format!("{:.*}", options.float_precision, v),
                    Ok(value) => format_any_value(&value),
                    Err(_) => String::new(),
                })
                .collect();
            cells.push(values);
        }

        render_text_table(&headers, &cells)
    }
}

/// Lay out a header row and body rows in padded columns.
pub(crate) fn render_text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let write_row = |out: &mut String, row: &[String]| {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        let _ = writeln!(out, "| {} |", line.join(" | "));
    };

    write_row(&mut out, headers);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "|-{}-|", separator.join("-|-"));
    for row in rows {
        write_row(&mut out, row);
    }
    out
}
