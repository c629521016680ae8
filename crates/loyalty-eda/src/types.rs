use crate::utils::{is_boolean_dtype, is_datetime_dtype, is_float_dtype, is_integer_dtype};
use polars::prelude::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Semantic type of a column.
///
/// The closed set of kinds a [`Table`](crate::Table) column can carry. The
/// physical polars dtype follows from the kind (see [`ColumnKind::physical_dtype`]),
/// except that `Text` and `Category` share string storage and differ only in
/// the schema tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Whole numbers
    Integer,
    /// Floating point numbers
    Float,
    /// Free text
    Text,
    /// Text with a small, closed set of values
    Category,
    /// True / false
    Boolean,
    /// A date component such as a year or a month
    DatePart,
}

impl ColumnKind {
    /// Infer the kind of a freshly loaded column from its physical dtype.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_integer_dtype(dtype) {
            ColumnKind::Integer
        } else if is_float_dtype(dtype) {
            ColumnKind::Float
        } else if is_boolean_dtype(dtype) {
            ColumnKind::Boolean
        } else if is_datetime_dtype(dtype) {
            ColumnKind::DatePart
        } else {
            ColumnKind::Text
        }
    }

    /// The polars dtype used to store values of this kind.
    pub fn physical_dtype(&self) -> DataType {
        match self {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Text | ColumnKind::Category => DataType::String,
            ColumnKind::Boolean => DataType::Boolean,
            ColumnKind::DatePart => DataType::Int32,
        }
    }

    /// Integer, float and date-part columns hold numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnKind::Integer | ColumnKind::Float | ColumnKind::DatePart
        )
    }

    /// Text and category columns hold labels.
    pub fn is_categorical(&self) -> bool {
        matches!(self, ColumnKind::Text | ColumnKind::Category)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, ColumnKind::Boolean)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
            ColumnKind::Category => "category",
            ColumnKind::Boolean => "boolean",
            ColumnKind::DatePart => "date_part",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "int64" => Ok(ColumnKind::Integer),
            "float" | "float64" | "double" => Ok(ColumnKind::Float),
            "text" | "string" | "str" | "object" => Ok(ColumnKind::Text),
            "category" | "categorical" => Ok(ColumnKind::Category),
            "boolean" | "bool" => Ok(ColumnKind::Boolean),
            "date_part" | "datepart" | "date-part" => Ok(ColumnKind::DatePart),
            other => Err(format!("unknown column kind '{}'", other)),
        }
    }
}

/// Schema entry for one column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub kind: ColumnKind,
}

/// A column-level problem that made an operation skip a column.
///
/// Issues are logged as warnings and collected in a [`CleaningLog`]; they
/// never abort the operation for the remaining columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ColumnIssue {
    /// The referenced column does not exist.
    MissingColumn { column: String },
    /// The column exists but its kind does not fit the operation.
    WrongType {
        column: String,
        expected: String,
        found: ColumnKind,
    },
    /// The column has no non-null values to compute a statistic from.
    EmptyColumn { column: String },
}

impl ColumnIssue {
    pub fn column(&self) -> &str {
        match self {
            ColumnIssue::MissingColumn { column }
            | ColumnIssue::WrongType { column, .. }
            | ColumnIssue::EmptyColumn { column } => column,
        }
    }

    pub(crate) fn wrong_type(column: &str, expected: &str, found: ColumnKind) -> Self {
        ColumnIssue::WrongType {
            column: column.to_string(),
            expected: expected.to_string(),
            found,
        }
    }
}

impl fmt::Display for ColumnIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnIssue::MissingColumn { column } => {
                write!(f, "column '{}' does not exist", column)
            }
            ColumnIssue::WrongType {
                column,
                expected,
                found,
            } => write!(
                f,
                "'{}' is {}, expected {}; skipped",
                column, found, expected
            ),
            ColumnIssue::EmptyColumn { column } => {
                write!(f, "'{}' has no values to compute from; skipped", column)
            }
        }
    }
}

/// Record of what a cleaning operation did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningLog {
    /// Human-readable description of each applied change.
    pub steps: Vec<String>,
    /// Columns that were skipped, and why.
    pub issues: Vec<ColumnIssue>,
}

impl CleaningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn step(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("{}", message);
        self.steps.push(message);
    }

    pub(crate) fn issue(&mut self, issue: ColumnIssue) {
        warn!("{}", issue);
        self.issues.push(issue);
    }

    /// Append another log after this one.
    pub fn extend(&mut self, other: CleaningLog) {
        self.steps.extend(other.steps);
        self.issues.extend(other.issues);
    }

    /// True when no column was skipped.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_dtype() {
        assert_eq!(ColumnKind::from_dtype(&DataType::Int32), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_dtype(&DataType::UInt8), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_dtype(&DataType::Float64), ColumnKind::Float);
        assert_eq!(ColumnKind::from_dtype(&DataType::String), ColumnKind::Text);
        assert_eq!(ColumnKind::from_dtype(&DataType::Boolean), ColumnKind::Boolean);
        assert_eq!(ColumnKind::from_dtype(&DataType::Date), ColumnKind::DatePart);
    }

    #[test]
    fn test_kind_groups() {
        assert!(ColumnKind::DatePart.is_numeric());
        assert!(ColumnKind::Category.is_categorical());
        assert!(!ColumnKind::Boolean.is_numeric());
        assert!(!ColumnKind::Float.is_categorical());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Category".parse::<ColumnKind>(), Ok(ColumnKind::Category));
        assert_eq!("int64".parse::<ColumnKind>(), Ok(ColumnKind::Integer));
        assert!("decimal".parse::<ColumnKind>().is_err());
    }

    #[test]
    fn test_issue_display_and_column() {
        let issue = ColumnIssue::wrong_type("Gender", "numeric", ColumnKind::Text);
        assert_eq!(issue.column(), "Gender");
        assert_eq!(issue.to_string(), "'Gender' is text, expected numeric; skipped");
    }

    #[test]
    fn test_issue_serialization_is_tagged() {
        let issue = ColumnIssue::MissingColumn {
            column: "Country".to_string(),
        };
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"issue\":\"missing_column\""));
    }

    #[test]
    fn test_cleaning_log_extend() {
        let mut first = CleaningLog::new();
        first.step("dropped 'Country'");
        let mut second = CleaningLog::new();
        second.issue(ColumnIssue::EmptyColumn {
            column: "Notes".to_string(),
        });

        first.extend(second);
        assert_eq!(first.steps.len(), 1);
        assert!(!first.is_clean());
    }
}
