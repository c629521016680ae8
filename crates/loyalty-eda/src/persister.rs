//! Writing tables to CSV or Excel files.

use crate::config::OutputFormat;
use crate::error::{Result, ResultExt};
use crate::table::Table;
use crate::types::ColumnKind;
use crate::utils::{series_to_f64, series_to_strings};
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Excel caps worksheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// Result of one save attempt, as recorded by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub table: String,
    pub path: PathBuf,
    pub format: OutputFormat,
    pub success: bool,
    pub error: Option<String>,
}

/// Write `table` to `path` in the given format.
///
/// The file extension always follows `format` (`csv` / `xlsx`): it is
/// appended when missing and replaced when it names another format. Missing
/// parent directories are created. Returns the path that was written.
pub fn save(table: &Table, path: impl AsRef<Path>, format: OutputFormat) -> Result<PathBuf> {
    let path = with_format_extension(path.as_ref(), format);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let context = format!("Saving '{}' to {}", table.name(), path.display());
    match format {
        OutputFormat::Csv => write_csv(table, &path).context(context)?,
        OutputFormat::Excel => write_excel(table, &path).context(context)?,
    }

    info!(
        "Saved '{}' ({} rows) as {} to {}",
        table.name(),
        table.height(),
        format,
        path.display()
    );
    Ok(path)
}

/// Save and record the outcome instead of returning the error.
pub fn save_recorded(table: &Table, path: impl AsRef<Path>, format: OutputFormat) -> SaveOutcome {
    let requested = path.as_ref().to_path_buf();
    match save(table, &requested, format) {
        Ok(written) => SaveOutcome {
            table: table.name().to_string(),
            path: written,
            format,
            success: true,
            error: None,
        },
        Err(e) => {
            warn!("Could not save '{}': {}", table.name(), e);
            SaveOutcome {
                table: table.name().to_string(),
                path: requested,
                format,
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}

fn with_format_extension(path: &Path, format: OutputFormat) -> PathBuf {
    let expected = format.extension();
    let matches = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(expected));
    let mut path = path.to_path_buf();
    if !matches {
        path.set_extension(expected);
    }
    path
}

fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    let mut frame = table.frame().clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut frame)?;
    Ok(())
}

fn write_excel(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(table.name()))?;

    for (col_idx, meta) in table.schema().iter().enumerate() {
        let col_idx = col_idx as u16;
        worksheet.write_string(0, col_idx, &meta.name)?;

        let series = table.series(&meta.name)?;
        match meta.kind {
            ColumnKind::Integer | ColumnKind::Float | ColumnKind::DatePart => {
                for (row, value) in series_to_f64(series)?.into_iter().enumerate() {
                    if let Some(v) = value {
                        worksheet.write_number(row as u32 + 1, col_idx, v)?;
                    }
                }
            }
            ColumnKind::Boolean => {
                for (row, value) in series.bool()?.into_iter().enumerate() {
                    if let Some(v) = value {
                        worksheet.write_boolean(row as u32 + 1, col_idx, v)?;
                    }
                }
            }
            ColumnKind::Text | ColumnKind::Category => {
                for (row, value) in series_to_strings(series)?.into_iter().enumerate() {
                    if let Some(v) = value {
                        worksheet.write_string(row as u32 + 1, col_idx, &v)?;
                    }
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Worksheet name derived from the table name, within Excel's rules.
fn sheet_name(table_name: &str) -> String {
    let cleaned: String = table_name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}
