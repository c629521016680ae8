//! Loyalty Program EDA Library
//!
//! Exploratory data analysis and ETL for an airline loyalty program, built on
//! Polars.
//!
//! # Overview
//!
//! The crate reads two tables (monthly flight activity and customer
//! profiles) and runs them through a linear pipeline:
//!
//! - **Loading**: CSV, Excel or JSON, chosen by file extension
//! - **Profiling**: shape, column kinds, null and distinct counts
//! - **Cleaning**: sign normalization, null imputation, duplicate handling,
//!   column removal and strict type coercion
//! - **Merging**: left join of profiles and activity on `Loyalty Number`
//! - **Summarizing**: numeric `describe()` and categorical frequencies
//! - **Saving**: CSV or Excel snapshots of the cleaned tables
//! - **Analysis**: chart data and a Kruskal-Wallis test of flights booked
//!   across education levels
//!
//! Every stage is also usable on its own: the operations are stateless and
//! work on a [`Table`], a polars `DataFrame` paired with a semantic schema.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use loyalty_eda::{Pipeline, PipelineConfig, OutputFormat};
//!
//! let config = PipelineConfig::builder()
//!     .activity_path("data/Customer_Flight_Activity.csv")
//!     .profile_path("data/Customer_Loyalty_History.csv")
//!     .output_dir("output")
//!     .output_format(OutputFormat::Excel)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{}] {}", update.stage.display_name(), update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! if let Some(kw) = &result.analysis.as_ref().and_then(|a| a.kruskal_wallis.clone()) {
//!     println!("H = {:.3}, p = {:.4}", kw.statistic, kw.p_value);
//! }
//! ```
//!
//! # Using the stages directly
//!
//! ```rust,ignore
//! use loyalty_eda::{Cleaner, DisplayOptions, NumericImputation, loader};
//!
//! let profile = loader::load("Customer_Loyalty_History.csv", &DisplayOptions::default())?;
//! let (profile, _) = Cleaner::fix_sign(profile, "Salary")?;
//! let (profile, log) = Cleaner::impute_numeric(profile, &["Salary"], NumericImputation::Mean)?;
//! for issue in &log.issues {
//!     eprintln!("{}", issue);
//! }
//! ```

pub mod analysis;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod merger;
pub mod persister;
pub mod pipeline;
pub mod profiler;
pub mod summarizer;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{AnalysisReport, Analyzer, GroupSample, KruskalWallisResult, NormalityResult};
pub use cleaner::{Cleaner, DuplicateReport, NullReport};
pub use config::{
    CategoricalImputation, ConfigValidationError, DisplayOptions, NumericImputation, OutputFormat,
    PipelineConfig, PipelineConfigBuilder,
};
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use loader::InputFormat;
pub use merger::left_join;
pub use persister::{SaveOutcome, save};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineResult, PipelineStage,
    ProgressReporter, ProgressUpdate, TableReport,
};
pub use profiler::{Profiler, TableOverview, TableSummary, UniqueValuesReport};
pub use summarizer::{FrequencyTable, NumericDescription, Summarizer};
pub use table::Table;
pub use types::{CleaningLog, ColumnIssue, ColumnKind, ColumnMeta};
