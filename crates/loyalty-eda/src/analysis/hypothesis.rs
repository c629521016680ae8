//! Normality checks and the Kruskal-Wallis H test.
//!
//! Groups up to a configurable size are checked with Shapiro-Wilk; larger
//! groups with Lilliefors' Kolmogorov-Smirnov test against a normal fitted by
//! the sample mean and standard deviation. The tests themselves come from
//! `normality` and `anofox_statistics`; this module only shapes the groups and
//! the results.

use crate::error::{EdaError, Result};
use anofox_statistics::nonparametric::kruskal::kruskal_wallis as kruskal_h;
use normality::{lilliefors, shapiro_wilk};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Largest sample the Shapiro-Wilk implementation accepts.
pub const SHAPIRO_MAX_SAMPLES: usize = 5000;

/// Values of one group, e.g. flights booked per customer of one education level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSample {
    pub group: String,
    pub values: Vec<f64>,
}

impl GroupSample {
    pub fn new(group: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            group: group.into(),
            values,
        }
    }

    fn finite_values(&self) -> Vec<f64> {
        self.values.iter().copied().filter(|v| v.is_finite()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalityTest {
    ShapiroWilk,
    /// Lilliefors variant: normal parameters estimated from the sample.
    KolmogorovSmirnov,
}

/// Outcome of the normality check of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityResult {
    pub group: String,
    pub n: usize,
    pub test: NormalityTest,
    pub statistic: f64,
    pub p_value: f64,
    /// `p_value > alpha`: normality is not rejected.
    pub normal: bool,
}

/// Outcome of a Kruskal-Wallis H test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KruskalWallisResult {
    pub groups: Vec<String>,
    pub n: usize,
    /// Tie-corrected H statistic.
    pub statistic: f64,
    pub df: usize,
    pub p_value: f64,
    pub alpha: f64,
    /// `p_value < alpha`: the group distributions differ.
    pub reject_null: bool,
}

fn insufficient(test: &str, reason: impl Into<String>) -> EdaError {
    EdaError::InsufficientData {
        test: test.to_string(),
        reason: reason.into(),
    }
}

// =============================================================================
// Normality
// =============================================================================

/// Check every group for normality at significance `alpha`.
///
/// Groups of at most `shapiro_limit` values (capped at
/// [`SHAPIRO_MAX_SAMPLES`]) use Shapiro-Wilk, larger ones Lilliefors.
/// Non-finite values are dropped first. Groups the tests reject as input
/// (too few values, no spread) are skipped with a warning.
pub fn normality_by_group(
    groups: &[GroupSample],
    shapiro_limit: usize,
    alpha: f64,
) -> Vec<NormalityResult> {
    let limit = shapiro_limit.min(SHAPIRO_MAX_SAMPLES);
    let mut results = Vec::with_capacity(groups.len());

    for sample in groups {
        let values = sample.finite_values();
        let n = values.len();
        let (test, outcome) = if n <= limit {
            (NormalityTest::ShapiroWilk, shapiro_wilk(values))
        } else {
            (NormalityTest::KolmogorovSmirnov, lilliefors(values))
        };

        match outcome {
            Ok(computation) => {
                debug!(
                    "{:?} on '{}' (n={}): statistic={:.4}, p={:.4}",
                    test, sample.group, n, computation.statistic, computation.p_value
                );
                results.push(NormalityResult {
                    group: sample.group.clone(),
                    n,
                    test,
                    statistic: computation.statistic,
                    p_value: computation.p_value,
                    normal: computation.p_value > alpha,
                });
            }
            Err(e) => warn!("Normality check skipped for '{}': {}", sample.group, e),
        }
    }
    results
}

// =============================================================================
// Kruskal-Wallis
// =============================================================================

/// Kruskal-Wallis H test across groups, tie-corrected, at significance `alpha`.
///
/// Empty groups are ignored. At least two non-empty groups are required, and
/// the pooled values must not all be identical.
pub fn kruskal_wallis(groups: &[GroupSample], alpha: f64) -> Result<KruskalWallisResult> {
    const TEST: &str = "Kruskal-Wallis";

    let kept: Vec<(&str, Vec<f64>)> = groups
        .iter()
        .map(|g| (g.group.as_str(), g.finite_values()))
        .filter(|(_, values)| !values.is_empty())
        .collect();
    if kept.len() < 2 {
        return Err(insufficient(
            TEST,
            format!("needs at least 2 non-empty groups, got {}", kept.len()),
        ));
    }

    let mut pooled = kept.iter().flat_map(|(_, values)| values.iter().copied());
    let first = pooled.next().unwrap_or_default();
    if pooled.all(|v| v == first) {
        return Err(insufficient(TEST, "all values are identical"));
    }

    let slices: Vec<&[f64]> = kept.iter().map(|(_, values)| values.as_slice()).collect();
    let result = kruskal_h(&slices)?;
    let n: usize = slices.iter().map(|s| s.len()).sum();
    let p_value = result.p_value.clamp(0.0, 1.0);

    debug!(
        "Kruskal-Wallis over {} groups (n={}): H={:.4}, p={:.4}",
        kept.len(),
        n,
        result.statistic,
        p_value
    );

    Ok(KruskalWallisResult {
        groups: kept.iter().map(|(name, _)| name.to_string()).collect(),
        n,
        statistic: result.statistic.max(0.0),
        df: kept.len() - 1,
        p_value,
        alpha,
        reject_null: p_value < alpha,
    })
}
