//! Reading the first worksheet of an Excel workbook into a DataFrame.
//!
//! The first row is the header. Each column's dtype is decided from its
//! non-empty cells: all integral numbers give Int64, all numbers give
//! Float64, all booleans give Boolean, anything else gives String.
//! Empty and error cells become null.

use crate::error::Result;
use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

static EMPTY_CELL: Data = Data::Empty;

/// Read the first worksheet of `path`.
pub fn read_first_sheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(calamine::Error::Msg("workbook has no worksheets"))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| match cell {
                Data::Empty => format!("column_{}", idx + 1),
                other => cell_to_string(other).unwrap_or_else(|| format!("column_{}", idx + 1)),
            })
            .collect(),
        None => return Ok(DataFrame::empty()),
    };

    let body: Vec<&[Data]> = rows.collect();
    debug!(
        "Worksheet 0 of {}: {} data rows, {} columns",
        path.display(),
        body.len(),
        headers.len()
    );

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
                .collect();
            build_series(header, &cells).into_column()
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    Integer,
    Float,
    Boolean,
    Text,
}

fn is_empty(cell: &Data) -> bool {
    matches!(cell, Data::Empty | Data::Error(_))
}

fn classify(cells: &[&Data]) -> CellType {
    let mut non_empty = cells.iter().filter(|c| !is_empty(c)).peekable();
    if non_empty.peek().is_none() {
        return CellType::Text;
    }

    let mut all_integral = true;
    let mut all_numeric = true;
    let mut all_bool = true;
    for cell in non_empty {
        match cell {
            Data::Int(_) => all_bool = false,
            Data::Float(f) => {
                all_bool = false;
                if f.fract() != 0.0 || !f.is_finite() {
                    all_integral = false;
                }
            }
            Data::Bool(_) => {
                all_integral = false;
                all_numeric = false;
            }
            _ => return CellType::Text,
        }
    }

    if all_bool {
        CellType::Boolean
    } else if all_integral && all_numeric {
        CellType::Integer
    } else if all_numeric {
        CellType::Float
    } else {
        CellType::Text
    }
}

fn cell_to_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(format!("{}", *f as i64)),
        other => Some(other.to_string()),
    }
}

fn build_series(name: &str, cells: &[&Data]) -> Series {
    let name: PlSmallStr = name.into();
    match classify(cells) {
        CellType::Integer => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| cell_to_f64(c).map(|v| v as i64))
                .collect();
            Series::new(name, values)
        }
        CellType::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(|c| cell_to_f64(c)).collect();
            Series::new(name, values)
        }
        CellType::Boolean => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        CellType::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|c| cell_to_string(c)).collect();
            Series::new(name, values)
        }
    }
}
