//! Loading tables from disk.
//!
//! The parser is chosen from the file extension, case-insensitively:
//! `.csv` goes through the polars CSV reader, `.xlsx` / `.xls` through
//! [`excel::read_first_sheet`], and `.json` through the polars JSON reader
//! (an array of records). Anything else is an
//! [`EdaError::UnsupportedFormat`].

pub mod excel;

use crate::config::DisplayOptions;
use crate::error::{EdaError, Result, ResultExt};
use crate::table::Table;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Input file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Excel,
    Json,
}

impl InputFormat {
    /// Detect the format from the path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "xlsx" | "xls" => Ok(InputFormat::Excel),
            "json" => Ok(InputFormat::Json),
            "" => Err(EdaError::UnsupportedFormat(format!(
                "{} (no extension)",
                path.display()
            ))),
            other => Err(EdaError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Load a file into a [`Table`] named after the file stem.
///
/// Logs the shape at info level and a preview of the first
/// `display.preview_rows` rows at debug level.
///
/// # Errors
///
/// * [`EdaError::UnsupportedFormat`] for an unknown or missing extension
/// * [`EdaError::Io`] when the file does not exist
/// * parser errors from polars or calamine
pub fn load(path: impl AsRef<Path>, display: &DisplayOptions) -> Result<Table> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;

    if !path.exists() {
        return Err(EdaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }

    let context = format!("Loading {}", path.display());
    let frame = match format {
        InputFormat::Csv => read_csv(path).context(context)?,
        InputFormat::Excel => excel::read_first_sheet(path).context(context)?,
        InputFormat::Json => read_json(path).context(context)?,
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();
    let table = Table::new(name, frame);

    info!(
        "Loaded '{}' ({:?}): {} rows x {} columns",
        table.name(),
        format,
        table.height(),
        table.width()
    );
    debug!("Preview of '{}':\n{}", table.name(), table.preview(display));

    Ok(table)
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()?;
    Ok(df)
}

fn read_json(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = JsonReader::new(file)
        .with_json_format(JsonFormat::Json)
        .finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnKind;
    use std::io::Write;

    // ==========================================================================
    // Format detection
    // ==========================================================================

    #[test]
    fn test_format_from_extension_is_case_insensitive() {
        assert_eq!(
            InputFormat::from_path(Path::new("data/Flights.CSV")).unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::from_path(Path::new("history.xls")).unwrap(),
            InputFormat::Excel
        );
        assert_eq!(
            InputFormat::from_path(Path::new("history.Json")).unwrap(),
            InputFormat::Json
        );
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = InputFormat::from_path(Path::new("notes.txt")).unwrap_err();
        assert!(err.is_unsupported_format());

        let err = InputFormat::from_path(Path::new("README")).unwrap_err();
        assert!(err.is_unsupported_format());
    }

    // ==========================================================================
    // Loading
    // ==========================================================================

    #[test]
    fn test_load_txt_fails_before_touching_disk() {
        let err = load("does/not/exist.txt", &DisplayOptions::default()).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_load_missing_csv_is_io_error() {
        let err = load("does/not/exist.csv", &DisplayOptions::default()).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_load_csv_names_table_after_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Customer_Loyalty_History.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Loyalty Number,Province,Salary").unwrap();
        writeln!(file, "100018,Alberta,92552.0").unwrap();
        writeln!(file, "100102,Ontario,").unwrap();
        drop(file);

        let table = load(&path, &DisplayOptions::default()).unwrap();
        assert_eq!(table.name(), "Customer_Loyalty_History");
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.kind("Loyalty Number"), Some(ColumnKind::Integer));
        assert_eq!(table.kind("Province"), Some(ColumnKind::Text));
        assert_eq!(table.kind("Salary"), Some(ColumnKind::Float));
        assert_eq!(table.null_count("Salary").unwrap(), 1);
    }

    #[test]
    fn test_load_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");
        std::fs::write(
            &path,
            r#"[{"Loyalty Card": "Star", "CLV": 3839.1},
                {"Loyalty Card": "Aurora", "CLV": 8257.4}]"#,
        )
        .unwrap();

        let table = load(&path, &DisplayOptions::default()).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.kind("CLV"), Some(ColumnKind::Float));
        assert_eq!(table.kind("Loyalty Card"), Some(ColumnKind::Text));
    }
}
