//! Stage events emitted while the pipeline runs.
//!
//! The pipeline reports one update when it enters a stage, then a final
//! `Complete` or `Failed` update.
//!
//! ```rust,ignore
//! use loyalty_eda::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| println!("[{}] {}", update.stage.display_name(), update.message))
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Loading,
    Profiling,
    Cleaning,
    Merging,
    Summarizing,
    Saving,
    Analyzing,
    Complete,
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Files",
            Self::Profiling => "Profiling Tables",
            Self::Cleaning => "Cleaning Data",
            Self::Merging => "Merging Tables",
            Self::Summarizing => "Summarizing",
            Self::Saving => "Saving Outputs",
            Self::Analyzing => "Analyzing",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// `Complete` and `Failed` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Failed, message)
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

/// Receives progress updates from the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
