//! Pipeline module.
//!
//! This module provides the end-to-end EDA pipeline and its progress
//! reporting.

mod builder;
pub mod progress;

pub use builder::{
    CLEANED_SUFFIX, CleanedTables, MERGED_TABLE, Pipeline, PipelineBuilder, PipelineResult,
    TableReport, TableStatistics,
};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
