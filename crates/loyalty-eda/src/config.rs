//! Configuration types for the EDA pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. Display settings travel with
//! the configuration and are handed to every rendering call, so nothing in
//! the crate relies on global formatting state.

use crate::error::EdaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Strategy for imputing missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NumericImputation {
    /// Use the mean of non-null values (rounded to 1 decimal)
    #[default]
    Mean,
    /// Use the median of non-null values (rounded to 1 decimal)
    Median,
    /// Use the most frequent value
    Mode,
}

impl fmt::Display for NumericImputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericImputation::Mean => f.write_str("mean"),
            NumericImputation::Median => f.write_str("median"),
            NumericImputation::Mode => f.write_str("mode"),
        }
    }
}

/// Strategy for imputing missing categorical and boolean values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CategoricalImputation {
    /// Use the most frequent value (mode)
    #[default]
    Mode,
    /// Fill with a literal, introducing a new category
    NewCategory(String),
}

/// File format used when saving a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Excel,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Excel => "xlsx",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => f.write_str("csv"),
            OutputFormat::Excel => f.write_str("excel"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            other => Err(EdaError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Per-call rendering options for previews and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Rows shown in table previews.
    pub preview_rows: usize,
    /// Maximum distinct values listed per column before truncating.
    pub max_listed_values: usize,
    /// Decimal places used for floats in rendered reports.
    pub float_precision: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            max_listed_values: 20,
            float_precision: 2,
        }
    }
}

/// Configuration for the EDA pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use loyalty_eda::config::{OutputFormat, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .output_dir("out")
///     .output_format(OutputFormat::Excel)
///     .alpha(0.01)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Flight activity input file (CSV, Excel or JSON).
    /// Default: "Customer_Flight_Activity.csv"
    pub activity_path: PathBuf,

    /// Customer profile input file (CSV, Excel or JSON).
    /// Default: "Customer_Loyalty_History.csv"
    pub profile_path: PathBuf,

    /// Directory where cleaned tables are written.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Format of the written tables.
    /// Default: Csv
    pub output_format: OutputFormat,

    /// Column shared by both tables, used for the merge.
    /// Default: "Loyalty Number"
    pub join_key: String,

    /// How missing salaries are filled.
    /// Default: Mean
    pub salary_imputation: NumericImputation,

    /// Preview and report rendering options.
    pub display: DisplayOptions,

    /// Significance level for the hypothesis tests, in (0, 1).
    /// Default: 0.05
    pub alpha: f64,

    /// Largest group checked with Shapiro-Wilk (at most 5000); bigger groups
    /// use Lilliefors' Kolmogorov-Smirnov test.
    /// Default: 5000
    pub normality_sample_limit: usize,

    /// Whether to compute the chart data and hypothesis tests.
    /// Default: true
    pub run_analysis: bool,

    /// Whether to write the cleaned tables to disk.
    /// Default: true
    pub save_outputs: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            activity_path: PathBuf::from("Customer_Flight_Activity.csv"),
            profile_path: PathBuf::from("Customer_Loyalty_History.csv"),
            output_dir: PathBuf::from("output"),
            output_format: OutputFormat::default(),
            join_key: "Loyalty Number".to_string(),
            salary_imputation: NumericImputation::default(),
            display: DisplayOptions::default(),
            alpha: 0.05,
            normality_sample_limit: 5000,
            run_analysis: true,
            save_outputs: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigValidationError::InvalidAlpha(self.alpha));
        }

        if self.join_key.trim().is_empty() {
            return Err(ConfigValidationError::EmptyJoinKey);
        }

        if self.normality_sample_limit < 3 {
            return Err(ConfigValidationError::InvalidSampleLimit(
                self.normality_sample_limit,
            ));
        }

        if self.display.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidDisplay {
                field: "preview_rows".to_string(),
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid significance level: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidAlpha(f64),

    #[error("Join key must not be empty")]
    EmptyJoinKey,

    #[error("Invalid normality sample limit: {0} (must be at least 3)")]
    InvalidSampleLimit(usize),

    #[error("Invalid display option '{field}': must be at least 1")]
    InvalidDisplay { field: String },
}

impl From<ConfigValidationError> for EdaError {
    fn from(err: ConfigValidationError) -> Self {
        EdaError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    base: Option<PipelineConfig>,
    activity_path: Option<PathBuf>,
    profile_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    output_format: Option<OutputFormat>,
    join_key: Option<String>,
    salary_imputation: Option<NumericImputation>,
    preview_rows: Option<usize>,
    max_listed_values: Option<usize>,
    float_precision: Option<usize>,
    alpha: Option<f64>,
    normality_sample_limit: Option<usize>,
    run_analysis: Option<bool>,
    save_outputs: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration (e.g. one read from a JSON file)
    /// instead of the defaults. Fields set on the builder override it.
    pub fn base(mut self, config: PipelineConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the flight activity input file.
    pub fn activity_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.activity_path = Some(path.into());
        self
    }

    /// Set the customer profile input file.
    pub fn profile_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_path = Some(path.into());
        self
    }

    /// Set the output directory for cleaned tables.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set the column used to merge profile and activity.
    pub fn join_key(mut self, key: impl Into<String>) -> Self {
        self.join_key = Some(key.into());
        self
    }

    pub fn salary_imputation(mut self, method: NumericImputation) -> Self {
        self.salary_imputation = Some(method);
        self
    }

    /// Set the number of rows shown in previews.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set how many distinct values are listed per column.
    pub fn max_listed_values(mut self, max: usize) -> Self {
        self.max_listed_values = Some(max);
        self
    }

    pub fn float_precision(mut self, precision: usize) -> Self {
        self.float_precision = Some(precision);
        self
    }

    /// Set the significance level for the hypothesis tests.
    ///
    /// # Arguments
    /// * `alpha` - Value strictly between 0.0 and 1.0 (e.g., 0.05)
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn normality_sample_limit(mut self, limit: usize) -> Self {
        self.normality_sample_limit = Some(limit);
        self
    }

    /// Enable or disable the analysis stage.
    pub fn run_analysis(mut self, run: bool) -> Self {
        self.run_analysis = Some(run);
        self
    }

    /// Enable or disable writing the cleaned tables.
    ///
    /// When false, results are kept in memory only.
    pub fn save_outputs(mut self, save: bool) -> Self {
        self.save_outputs = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let display = DisplayOptions {
            preview_rows: self.preview_rows.unwrap_or(base.display.preview_rows),
            max_listed_values: self
                .max_listed_values
                .unwrap_or(base.display.max_listed_values),
            float_precision: self.float_precision.unwrap_or(base.display.float_precision),
        };

        let config = PipelineConfig {
            activity_path: self.activity_path.unwrap_or(base.activity_path),
            profile_path: self.profile_path.unwrap_or(base.profile_path),
            output_dir: self.output_dir.unwrap_or(base.output_dir),
            output_format: self.output_format.unwrap_or(base.output_format),
            join_key: self.join_key.unwrap_or(base.join_key),
            salary_imputation: self.salary_imputation.unwrap_or(base.salary_imputation),
            display,
            alpha: self.alpha.unwrap_or(base.alpha),
            normality_sample_limit: self
                .normality_sample_limit
                .unwrap_or(base.normality_sample_limit),
            run_analysis: self.run_analysis.unwrap_or(base.run_analysis),
            save_outputs: self.save_outputs.unwrap_or(base.save_outputs),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.join_key, "Loyalty Number");
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.salary_imputation, NumericImputation::Mean);
        assert_eq!(config.display.preview_rows, 5);
        assert!(config.run_analysis);
        assert!(config.save_outputs);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.normality_sample_limit, 5000);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .output_dir("custom")
            .output_format(OutputFormat::Excel)
            .alpha(0.01)
            .preview_rows(10)
            .salary_imputation(NumericImputation::Median)
            .run_analysis(false)
            .build()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("custom"));
        assert_eq!(config.output_format, OutputFormat::Excel);
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.display.preview_rows, 10);
        assert_eq!(config.display.max_listed_values, 20);
        assert_eq!(config.salary_imputation, NumericImputation::Median);
        assert!(!config.run_analysis);
    }

    #[test]
    fn test_builder_overrides_base() {
        let base = PipelineConfig {
            alpha: 0.1,
            join_key: "Customer".to_string(),
            ..PipelineConfig::default()
        };
        let config = PipelineConfig::builder()
            .base(base)
            .alpha(0.02)
            .build()
            .unwrap();

        assert_eq!(config.alpha, 0.02);
        assert_eq!(config.join_key, "Customer");
    }

    #[test]
    fn test_validation_invalid_alpha() {
        for alpha in [0.0, 1.0, -0.5, 1.5] {
            let result = PipelineConfig::builder().alpha(alpha).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidAlpha(_)
            ));
        }
    }

    #[test]
    fn test_validation_empty_join_key() {
        let result = PipelineConfig::builder().join_key("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyJoinKey
        ));
    }

    #[test]
    fn test_validation_error_converts_to_eda_error() {
        let err: EdaError = PipelineConfig::builder()
            .normality_sample_limit(1)
            .build()
            .unwrap_err()
            .into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("excel".parse::<OutputFormat>().unwrap(), OutputFormat::Excel);

        let err = "parquet".parse::<OutputFormat>().unwrap_err();
        assert!(err.is_unsupported_format());
    }

    #[test]
    fn test_pipeline_config_from_json() {
        // Partial JSON falls back to defaults for the missing fields
        let json = r#"{
            "output_dir": "results",
            "output_format": "excel",
            "salary_imputation": "Median",
            "display": { "preview_rows": 3 },
            "alpha": 0.1
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.output_dir.to_str().unwrap(), "results");
        assert_eq!(config.output_format, OutputFormat::Excel);
        assert_eq!(config.salary_imputation, NumericImputation::Median);
        assert_eq!(config.display.preview_rows, 3);
        assert_eq!(config.display.max_listed_values, 20);
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.join_key, "Loyalty Number");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_categorical_imputation_serialization() {
        let method = CategoricalImputation::NewCategory("Unknown".to_string());
        let json = serde_json::to_string(&method).unwrap();
        assert_eq!(json, r#"{"NewCategory":"Unknown"}"#);
    }
}
