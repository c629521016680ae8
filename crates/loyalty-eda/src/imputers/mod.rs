//! Imputation module for handling missing values.
//!
//! This module provides statistical imputation strategies (mean, median,
//! mode, new category) used by the [`Cleaner`](crate::cleaner::Cleaner).

mod statistical;

pub use statistical::StatisticalImputer;
