//! The end-to-end EDA pipeline and its builder.

use crate::analysis::columns::*;
use crate::analysis::{AnalysisReport, Analyzer};
use crate::cleaner::{Cleaner, DuplicateReport, NullReport};
use crate::config::PipelineConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::loader;
use crate::merger;
use crate::persister::{self, SaveOutcome};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::{Profiler, TableOverview, TableSummary, UniqueValuesReport};
use crate::summarizer::{FrequencyTable, NumericDescription, Summarizer};
use crate::table::Table;
use crate::types::{CleaningLog, ColumnKind};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Name of the merged table and of its output file.
pub const MERGED_TABLE: &str = "Customer_Info";

/// Suffix appended to the cleaned input tables when saved.
pub const CLEANED_SUFFIX: &str = "_limpio";

const CATEGORY_COLUMNS: [&str; 5] = [GENDER, ENROLLMENT_TYPE, EDUCATION, MARITAL_STATUS, LOYALTY_CARD];
const DATE_PART_COLUMNS: [&str; 2] = [CANCELLATION_YEAR, CANCELLATION_MONTH];

/// Everything the profiler and the cleaner's reports say about one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub overview: TableOverview,
    pub summary: TableSummary,
    pub unique_values: UniqueValuesReport,
    pub nulls: NullReport,
    pub duplicates: DuplicateReport,
}

impl TableReport {
    fn build(table: &Table) -> Result<Self> {
        Ok(Self {
            overview: Profiler::explore(table)?,
            summary: Profiler::summarize(table)?,
            unique_values: Profiler::unique_values(table)?,
            nulls: Cleaner::null_report(table)?,
            duplicates: Cleaner::duplicate_report(table)?,
        })
    }
}

/// Descriptive statistics of one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableStatistics {
    pub table: String,
    pub numeric: Vec<NumericDescription>,
    pub categorical: Vec<FrequencyTable>,
}

/// The cleaned and merged tables, for callers that keep working with them.
#[derive(Debug, Clone)]
pub struct CleanedTables {
    pub activity: Table,
    pub profile: Table,
    pub merged: Table,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// RFC 3339 start time.
    pub started_at: String,
    pub duration_ms: u64,
    pub config: PipelineConfig,
    /// Reports on the activity table as loaded.
    pub activity: TableReport,
    /// Reports on the profile table as loaded.
    pub profile: TableReport,
    /// Reports on the merged table.
    pub merged: TableReport,
    pub statistics: Vec<TableStatistics>,
    pub cleaning: CleaningLog,
    pub saves: Vec<SaveOutcome>,
    pub analysis: Option<AnalysisReport>,
    #[serde(skip)]
    pub tables: CleanedTables,
}

impl PipelineResult {
    /// Whether every requested save succeeded.
    pub fn all_saved(&self) -> bool {
        self.saves.iter().all(|s| s.success)
    }
}

/// The loyalty EDA pipeline: load, profile, clean, merge, summarize, save
/// and analyze.
///
/// # Example
///
/// ```rust,ignore
/// use loyalty_eda::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().output_dir("out").build()?)
///     .build()?
///     .run()?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load both input files named in the configuration and process them.
    pub fn run(&self) -> Result<PipelineResult> {
        self.report_progress(ProgressUpdate::new(PipelineStage::Loading, "Loading files..."));
        let loaded = loader::load(&self.config.activity_path, &self.config.display).and_then(
            |activity| {
                loader::load(&self.config.profile_path, &self.config.display)
                    .map(|profile| (activity, profile))
            },
        );

        match loaded {
            Ok((activity, profile)) => self.process(activity, profile),
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Process an already loaded activity table and profile table.
    pub fn process(&self, activity: Table, profile: Table) -> Result<PipelineResult> {
        match self.process_internal(activity, profile) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, activity: Table, profile: Table) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let started_at = chrono::Local::now().to_rfc3339();
        info!(
            "Starting pipeline on '{}' and '{}'",
            activity.name(),
            profile.name()
        );

        // Step 1: Profile both tables as loaded
        self.report_progress(ProgressUpdate::new(PipelineStage::Profiling, "Profiling tables..."));
        info!("Step 1: Profiling tables...");
        let activity_report = TableReport::build(&activity)?;
        let profile_report = TableReport::build(&profile)?;

        // Step 2: Clean the profile table
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            "Cleaning customer profiles...",
        ));
        info!("Step 2: Cleaning '{}'...", profile.name());
        let (profile, cleaning) = self.clean_profile(profile)?;
        debug!("Cleaning steps: {:?}", cleaning.steps);

        // Step 3: Merge
        self.report_progress(ProgressUpdate::new(PipelineStage::Merging, "Merging tables..."));
        info!("Step 3: Merging tables...");
        let mut merged = merger::left_join(&profile, &activity, &self.config.join_key)?;
        merged.set_name(MERGED_TABLE);
        let merged_report = TableReport::build(&merged)?;

        // Step 4: Descriptive statistics
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Summarizing,
            "Computing statistics...",
        ));
        info!("Step 4: Computing statistics...");
        let statistics = [&activity, &profile, &merged]
            .into_iter()
            .map(|table| {
                Ok(TableStatistics {
                    table: table.name().to_string(),
                    numeric: Summarizer::numeric_stats(table)?,
                    categorical: Summarizer::categorical_frequencies(table)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Step 5: Save
        let saves = if self.config.save_outputs {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Saving,
                "Saving cleaned tables...",
            ));
            info!("Step 5: Saving cleaned tables...");
            self.save_all(&activity, &profile, &merged)
        } else {
            info!("Step 5: Skipping saves (disabled)");
            Vec::new()
        };

        // Step 6: Analysis
        let analysis = if self.config.run_analysis {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Analyzing,
                "Running analysis...",
            ));
            info!("Step 6: Running analysis...");
            Some(
                Analyzer::analyze(
                    &activity,
                    &profile,
                    &merged,
                    self.config.alpha,
                    self.config.normality_sample_limit,
                )
                .context("Analyzing cleaned tables")?,
            )
        } else {
            info!("Step 6: Skipping analysis (disabled)");
            None
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Pipeline finished in {} ms", duration_ms);

        Ok(PipelineResult {
            started_at,
            duration_ms,
            config: self.config.clone(),
            activity: activity_report,
            profile: profile_report,
            merged: merged_report,
            statistics,
            cleaning,
            saves,
            analysis,
            tables: CleanedTables {
                activity,
                profile,
                merged,
            },
        })
    }

    /// Sign fix and imputation of Salary, removal of the constant Country
    /// column, and the categorical and date-part casts.
    fn clean_profile(&self, profile: Table) -> Result<(Table, CleaningLog)> {
        let mut log = CleaningLog::new();

        let (profile, step) = Cleaner::fix_sign(profile, SALARY)?;
        log.extend(step);

        let (profile, step) =
            Cleaner::impute_numeric(profile, &[SALARY], self.config.salary_imputation)?;
        log.extend(step);

        let (profile, step) = Cleaner::drop_duplicate_columns(profile, &[COUNTRY])?;
        log.extend(step);

        let (profile, step) = Cleaner::cast(profile, &CATEGORY_COLUMNS, ColumnKind::Category)?;
        log.extend(step);

        let (profile, step) = Cleaner::cast(profile, &DATE_PART_COLUMNS, ColumnKind::DatePart)?;
        log.extend(step);

        Ok((profile, log))
    }

    fn save_all(&self, activity: &Table, profile: &Table, merged: &Table) -> Vec<SaveOutcome> {
        let dir = &self.config.output_dir;
        let format = self.config.output_format;
        [
            (activity, format!("{}{}", activity.name(), CLEANED_SUFFIX)),
            (profile, format!("{}{}", profile.name(), CLEANED_SUFFIX)),
            (merged, MERGED_TABLE.to_string()),
        ]
        .into_iter()
        .map(|(table, file_name)| persister::save_recorded(table, dir.join(file_name), format))
        .collect()
    }
}

/// Builder for creating a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Receive progress updates through a closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(EdaError::from)?;
        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
