//! Chart data and hypothesis tests over the cleaned loyalty tables.
//!
//! Each operation returns the aggregated series a chart would plot (no
//! rendering happens here). The questions answered:
//!
//! - How are flights booked distributed across the months of the year?
//! - Do longer distances earn more points?
//! - How are customers distributed across provinces?
//! - How does salary vary with education?
//! - What share of customers holds each loyalty card?
//! - How are customers split by marital status and gender?
//!
//! plus whether flights booked differ by education level
//! ([`kruskal_wallis`] over the per-customer totals).

mod hypothesis;

pub use hypothesis::{
    GroupSample, KruskalWallisResult, NormalityResult, NormalityTest, SHAPIRO_MAX_SAMPLES,
    kruskal_wallis, normality_by_group,
};

use crate::config::DisplayOptions;
use crate::error::{Result, ResultExt};
use crate::summarizer::{NumericDescription, render_numeric};
use crate::table::{Table, render_text_table};
use crate::utils::{mean, series_to_f64, series_to_strings, value_counts};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, info, warn};

/// Column names of the two loyalty input files.
pub mod columns {
    pub const LOYALTY_NUMBER: &str = "Loyalty Number";
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Month";
    pub const FLIGHTS_BOOKED: &str = "Flights Booked";
    pub const DISTANCE: &str = "Distance";
    pub const POINTS_ACCUMULATED: &str = "Points Accumulated";
    pub const COUNTRY: &str = "Country";
    pub const PROVINCE: &str = "Province";
    pub const GENDER: &str = "Gender";
    pub const EDUCATION: &str = "Education";
    pub const SALARY: &str = "Salary";
    pub const MARITAL_STATUS: &str = "Marital Status";
    pub const LOYALTY_CARD: &str = "Loyalty Card";
    pub const ENROLLMENT_TYPE: &str = "Enrollment Type";
    pub const CANCELLATION_YEAR: &str = "Cancellation Year";
    pub const CANCELLATION_MONTH: &str = "Cancellation Month";
}

use columns::*;

// =============================================================================
// Result types
// =============================================================================

/// Total flights booked in one month of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFlights {
    pub year: i64,
    pub month: i64,
    pub flights_booked: f64,
}

/// Summed distance and points of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerTotals {
    pub loyalty_number: i64,
    pub distance: f64,
    pub points: f64,
}

/// Scatter data of distance against points, with the fitted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistancePoints {
    pub customers: Vec<CustomerTotals>,
    /// Pearson correlation; `None` with fewer than 2 customers or no spread.
    pub pearson_r: Option<f64>,
    /// Least-squares line `points = slope * distance + intercept`.
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
}

/// Count and share of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    /// Share of the non-null values, in percent.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryByEducation {
    pub education: String,
    pub customers: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaritalGenderCount {
    pub marital_status: String,
    pub gender: String,
    pub count: usize,
}

/// Per-customer flight totals grouped by education level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightsByEducation {
    /// One sample per education level, in alphabetical order.
    pub groups: Vec<GroupSample>,
    /// `describe()` of each group, labelled with the education level.
    pub descriptions: Vec<NumericDescription>,
}

/// Everything the analysis stage produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub monthly_flights: Vec<MonthlyFlights>,
    pub distance_vs_points: DistancePoints,
    pub province_distribution: Vec<CategoryCount>,
    pub salary_by_education: Vec<SalaryByEducation>,
    pub loyalty_card_share: Vec<CategoryCount>,
    pub marital_gender_counts: Vec<MaritalGenderCount>,
    pub flights_by_education: FlightsByEducation,
    pub normality: Vec<NormalityResult>,
    /// `None` when the test could not run (e.g. a single education level).
    pub kruskal_wallis: Option<KruskalWallisResult>,
}

impl AnalysisReport {
    /// Render every section as text.
    pub fn render(&self, options: &DisplayOptions) -> String {
        let p = options.float_precision;
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.*}", p, v));
        let mut out = String::new();

        let _ = writeln!(out, "Flights booked per month:");
        let rows: Vec<Vec<String>> = self
            .monthly_flights
            .iter()
            .map(|m| vec![m.year.to_string(), m.month.to_string(), format!("{:.0}", m.flights_booked)])
            .collect();
        let _ = writeln!(
            out,
            "{}",
            render_text_table(&["year", "month", "flights"].map(String::from), &rows)
        );

        let dp = &self.distance_vs_points;
        let _ = writeln!(
            out,
            "Distance vs points ({} customers): r = {}, points = {} * distance + {}\n",
            dp.customers.len(),
            fmt(dp.pearson_r),
            fmt(dp.slope),
            fmt(dp.intercept)
        );

        render_counts(&mut out, "Customers per province", &self.province_distribution, options);

        let _ = writeln!(out, "Salary by education:");
        let rows: Vec<Vec<String>> = self
            .salary_by_education
            .iter()
            .map(|s| vec![s.education.clone(), s.customers.to_string(), fmt(s.mean), fmt(s.median)])
            .collect();
        let _ = writeln!(
            out,
            "{}",
            render_text_table(&["education", "customers", "mean", "median"].map(String::from), &rows)
        );

        render_counts(&mut out, "Loyalty card share", &self.loyalty_card_share, options);

        let _ = writeln!(out, "Customers by marital status and gender:");
        let rows: Vec<Vec<String>> = self
            .marital_gender_counts
            .iter()
            .map(|c| vec![c.marital_status.clone(), c.gender.clone(), c.count.to_string()])
            .collect();
        let _ = writeln!(
            out,
            "{}",
            render_text_table(&["marital status", "gender", "count"].map(String::from), &rows)
        );

        let _ = writeln!(out, "Flights booked per customer by education:");
        let _ = writeln!(
            out,
            "{}",
            render_numeric(&self.flights_by_education.descriptions, options)
        );

        let _ = writeln!(out, "Normality:");
        for n in &self.normality {
            let _ = writeln!(
                out,
                "  {:<24} {:?} n={} statistic={:.4} p={:.4} -> {}",
                n.group,
                n.test,
                n.n,
                n.statistic,
                n.p_value,
                if n.normal { "normal" } else { "not normal" }
            );
        }

        match &self.kruskal_wallis {
            Some(kw) => {
                let _ = writeln!(
                    out,
                    "\nKruskal-Wallis: H = {:.4}, df = {}, p = {:.4} -> {}",
                    kw.statistic,
                    kw.df,
                    kw.p_value,
                    if kw.reject_null {
                        "flights booked differ by education"
                    } else {
                        "no significant difference between education levels"
                    }
                );
            }
            None => {
                let _ = writeln!(out, "\nKruskal-Wallis: not run");
            }
        }
        out
    }
}

fn render_counts(out: &mut String, title: &str, counts: &[CategoryCount], options: &DisplayOptions) {
    let _ = writeln!(out, "{}:", title);
    for c in counts.iter().take(options.max_listed_values) {
        let _ = writeln!(
            out,
            "  {:<24} {:>8} {:>6.*}%",
            c.value, c.count, options.float_precision, c.percentage
        );
    }
    let hidden = counts.len().saturating_sub(options.max_listed_values);
    if hidden > 0 {
        let _ = writeln!(out, "  ... (+{} more)", hidden);
    }
    out.push('\n');
}

// =============================================================================
// Column helpers
// =============================================================================

fn numbers(table: &Table, column: &str) -> Result<Vec<Option<f64>>> {
    Ok(series_to_f64(table.series(column)?)?)
}

fn keys(table: &Table, column: &str) -> Result<Vec<Option<i64>>> {
    let series = table.series(column)?.cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

fn labels(table: &Table, column: &str) -> Result<Vec<Option<String>>> {
    Ok(series_to_strings(table.series(column)?)?)
}

fn counts(table: &Table, column: &str) -> Result<Vec<usize>> {
    Ok(keys(table, column)?
        .into_iter()
        .map(|c| c.unwrap_or(0).max(0) as usize)
        .collect())
}

fn require(table: &Table, columns: &[&str]) -> Result<()> {
    for column in columns {
        table.series(column)?;
    }
    Ok(())
}

/// Count the non-null values of a column, descending by count (ties by value).
fn category_counts(table: &Table, column: &str) -> Result<Vec<CategoryCount>> {
    let counts = value_counts(table.series(column)?)?;
    let total: usize = counts.iter().map(|(_, count)| count).sum();

    Ok(counts
        .into_iter()
        .map(|(value, count)| CategoryCount {
            value,
            count,
            percentage: count as f64 * 100.0 / total as f64,
        })
        .collect())
}

fn pearson_and_line(xs: &[f64], ys: &[f64]) -> (Option<f64>, Option<f64>, Option<f64>) {
    let (Some(mx), Some(my)) = (mean(xs), mean(ys)) else {
        return (None, None, None);
    };
    if xs.len() < 2 {
        return (None, None, None);
    }

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }

    let r = (sxx > 0.0 && syy > 0.0).then(|| sxy / (sxx * syy).sqrt());
    let slope = (sxx > 0.0).then(|| sxy / sxx);
    let intercept = slope.map(|b| my - b * mx);
    (r, slope, intercept)
}

// =============================================================================
// Analyzer
// =============================================================================

/// Stateless analysis operations over the cleaned tables.
pub struct Analyzer;

impl Analyzer {
    /// Run every analysis: chart data from the activity (`activity`), profile
    /// (`profile`) and merged (`merged`) tables, then the normality checks and
    /// the Kruskal-Wallis test on flights booked per education level.
    ///
    /// A Kruskal-Wallis test that cannot run is logged and left as `None`.
    pub fn analyze(
        activity: &Table,
        profile: &Table,
        merged: &Table,
        alpha: f64,
        normality_sample_limit: usize,
    ) -> Result<AnalysisReport> {
        info!("Analyzing '{}', '{}' and '{}'", activity.name(), profile.name(), merged.name());

        let flights_by_education = Self::flights_by_education(merged)?;
        let normality =
            normality_by_group(&flights_by_education.groups, normality_sample_limit, alpha);
        let kruskal = match kruskal_wallis(&flights_by_education.groups, alpha) {
            Ok(result) => {
                info!(
                    "Kruskal-Wallis: H={:.4}, p={:.4}, reject={}",
                    result.statistic, result.p_value, result.reject_null
                );
                Some(result)
            }
            Err(e) => {
                warn!("Kruskal-Wallis test not run: {}", e);
                None
            }
        };

        Ok(AnalysisReport {
            monthly_flights: Self::monthly_flights(activity)?,
            distance_vs_points: Self::distance_vs_points(activity)?,
            province_distribution: Self::province_distribution(profile)?,
            salary_by_education: Self::salary_by_education(profile)?,
            loyalty_card_share: Self::loyalty_card_share(profile)?,
            marital_gender_counts: Self::marital_gender_counts(profile)?,
            flights_by_education,
            normality,
            kruskal_wallis: kruskal,
        })
    }

    /// Total flights booked per (Year, Month), sorted by year then month.
    pub fn monthly_flights(activity: &Table) -> Result<Vec<MonthlyFlights>> {
        require(activity, &[YEAR, MONTH, FLIGHTS_BOOKED])?;

        let totals = activity
            .frame()
            .clone()
            .lazy()
            .group_by([col(YEAR), col(MONTH)])
            .agg([col(FLIGHTS_BOOKED).sum()])
            .sort([YEAR, MONTH], SortMultipleOptions::default())
            .collect()
            .context("Summing flights per month")?;
        let totals = Table::new("monthly_flights", totals);

        let result: Vec<MonthlyFlights> = keys(&totals, YEAR)?
            .into_iter()
            .zip(keys(&totals, MONTH)?)
            .zip(numbers(&totals, FLIGHTS_BOOKED)?)
            .filter_map(|((year, month), flights)| {
                Some(MonthlyFlights {
                    year: year?,
                    month: month?,
                    flights_booked: flights.unwrap_or(0.0),
                })
            })
            .collect();
        debug!("{} months of flight activity", result.len());
        Ok(result)
    }

    /// Per-customer distance and points totals with their correlation.
    pub fn distance_vs_points(activity: &Table) -> Result<DistancePoints> {
        require(activity, &[LOYALTY_NUMBER, DISTANCE, POINTS_ACCUMULATED])?;

        let totals = activity
            .frame()
            .clone()
            .lazy()
            .group_by([col(LOYALTY_NUMBER)])
            .agg([col(DISTANCE).sum(), col(POINTS_ACCUMULATED).sum()])
            .sort([LOYALTY_NUMBER], SortMultipleOptions::default())
            .collect()
            .context("Summing distance and points per customer")?;
        let totals = Table::new("customer_totals", totals);

        let customers: Vec<CustomerTotals> = keys(&totals, LOYALTY_NUMBER)?
            .into_iter()
            .zip(numbers(&totals, DISTANCE)?)
            .zip(numbers(&totals, POINTS_ACCUMULATED)?)
            .filter_map(|((key, distance), points)| {
                Some(CustomerTotals {
                    loyalty_number: key?,
                    distance: distance.unwrap_or(0.0),
                    points: points.unwrap_or(0.0),
                })
            })
            .collect();

        let xs: Vec<f64> = customers.iter().map(|c| c.distance).collect();
        let ys: Vec<f64> = customers.iter().map(|c| c.points).collect();
        let (pearson_r, slope, intercept) = pearson_and_line(&xs, &ys);
        debug!("Distance vs points over {} customers: r={:?}", customers.len(), pearson_r);

        Ok(DistancePoints {
            customers,
            pearson_r,
            slope,
            intercept,
        })
    }

    /// Customers per province, descending.
    pub fn province_distribution(profile: &Table) -> Result<Vec<CategoryCount>> {
        category_counts(profile, PROVINCE)
    }

    /// Mean and median salary per education level, in alphabetical order.
    ///
    /// `customers` counts every profile of the level, including those
    /// without a salary.
    pub fn salary_by_education(profile: &Table) -> Result<Vec<SalaryByEducation>> {
        require(profile, &[EDUCATION, SALARY])?;

        let grouped = profile
            .frame()
            .clone()
            .lazy()
            .filter(col(EDUCATION).is_not_null())
            .group_by([col(EDUCATION)])
            .agg([
                len().alias("customers"),
                col(SALARY).cast(DataType::Float64).mean().alias("mean"),
                col(SALARY).cast(DataType::Float64).median().alias("median"),
            ])
            .sort([EDUCATION], SortMultipleOptions::default())
            .collect()
            .context("Aggregating salary per education level")?;
        let grouped = Table::new("salary_by_education", grouped);

        Ok(labels(&grouped, EDUCATION)?
            .into_iter()
            .zip(counts(&grouped, "customers")?)
            .zip(numbers(&grouped, "mean")?)
            .zip(numbers(&grouped, "median")?)
            .filter_map(|(((education, customers), mean), median)| {
                Some(SalaryByEducation {
                    education: education?,
                    customers,
                    mean,
                    median,
                })
            })
            .collect())
    }

    /// Count and percentage of customers per loyalty card.
    pub fn loyalty_card_share(profile: &Table) -> Result<Vec<CategoryCount>> {
        category_counts(profile, LOYALTY_CARD)
    }

    /// Customers per (Marital Status, Gender), sorted by both.
    pub fn marital_gender_counts(profile: &Table) -> Result<Vec<MaritalGenderCount>> {
        require(profile, &[MARITAL_STATUS, GENDER])?;

        let grouped = profile
            .frame()
            .clone()
            .lazy()
            .filter(col(MARITAL_STATUS).is_not_null().and(col(GENDER).is_not_null()))
            .group_by([col(MARITAL_STATUS), col(GENDER)])
            .agg([len().alias("count")])
            .sort([MARITAL_STATUS, GENDER], SortMultipleOptions::default())
            .collect()
            .context("Counting customers per marital status and gender")?;
        let grouped = Table::new("marital_gender_counts", grouped);

        Ok(labels(&grouped, MARITAL_STATUS)?
            .into_iter()
            .zip(labels(&grouped, GENDER)?)
            .zip(counts(&grouped, "count")?)
            .filter_map(|((marital_status, gender), count)| {
                Some(MaritalGenderCount {
                    marital_status: marital_status?,
                    gender: gender?,
                    count,
                })
            })
            .collect())
    }

    /// Flights booked per customer, grouped by education level.
    ///
    /// Monthly rows are summed per (Loyalty Number, Education); a customer
    /// without activity counts as 0 flights. Rows missing either key are
    /// ignored.
    pub fn flights_by_education(merged: &Table) -> Result<FlightsByEducation> {
        require(merged, &[LOYALTY_NUMBER, EDUCATION, FLIGHTS_BOOKED])?;

        // null flights sum to 0
        let totals = merged
            .frame()
            .clone()
            .lazy()
            .filter(col(LOYALTY_NUMBER).is_not_null().and(col(EDUCATION).is_not_null()))
            .group_by([col(EDUCATION), col(LOYALTY_NUMBER)])
            .agg([col(FLIGHTS_BOOKED).sum()])
            .sort([EDUCATION, LOYALTY_NUMBER], SortMultipleOptions::default())
            .collect()
            .context("Summing flights per customer and education level")?;
        let totals = Table::new("customer_flights", totals);

        let mut groups: Vec<GroupSample> = Vec::new();
        for (level, booked) in labels(&totals, EDUCATION)?
            .into_iter()
            .zip(numbers(&totals, FLIGHTS_BOOKED)?)
        {
            let Some(level) = level else { continue };
            let booked = booked.unwrap_or(0.0);
            match groups.last_mut() {
                Some(last) if last.group == level => last.values.push(booked),
                _ => groups.push(GroupSample::new(level, vec![booked])),
            }
        }

        let descriptions = groups
            .iter()
            .map(|g| NumericDescription::from_values(g.group.clone(), &g.values))
            .collect();

        debug!("{} education levels with flight totals", groups.len());
        Ok(FlightsByEducation {
            groups,
            descriptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn activity() -> Table {
        let df = df![
            LOYALTY_NUMBER => [1i64, 1, 2, 2, 3],
            YEAR => [2018i64, 2018, 2017, 2018, 2018],
            MONTH => [2i64, 1, 12, 1, 2],
            FLIGHTS_BOOKED => [3i64, 2, 4, 0, 5],
            DISTANCE => [1000i64, 500, 2000, 0, 3000],
            POINTS_ACCUMULATED => [100.0, 50.0, 200.0, 0.0, 300.0],
        ]
        .unwrap();
        Table::new("Customer_Flight_Activity", df)
    }

    fn profile() -> Table {
        let df = df![
            LOYALTY_NUMBER => [1i64, 2, 3, 4],
            PROVINCE => [Some("Ontario"), Some("Quebec"), Some("Ontario"), None],
            EDUCATION => ["Bachelor", "Bachelor", "Master", "Master"],
            SALARY => [Some(50000.0), Some(70000.0), Some(90000.0), None],
            MARITAL_STATUS => ["Married", "Single", "Married", "Married"],
            GENDER => ["Female", "Male", "Female", "Male"],
            LOYALTY_CARD => ["Star", "Star", "Aurora", "Nova"],
        ]
        .unwrap();
        Table::new("Customer_Loyalty_History", df)
    }

    // ==========================================================================
    // Chart data
    // ==========================================================================

    #[test]
    fn test_monthly_flights_sums_and_sorts() {
        let months = Analyzer::monthly_flights(&activity()).unwrap();
        let triples: Vec<(i64, i64, f64)> = months
            .iter()
            .map(|m| (m.year, m.month, m.flights_booked))
            .collect();
        assert_eq!(
            triples,
            vec![(2017, 12, 4.0), (2018, 1, 2.0), (2018, 2, 8.0)]
        );
    }

    #[test]
    fn test_distance_vs_points_perfect_line() {
        let result = Analyzer::distance_vs_points(&activity()).unwrap();
        assert_eq!(result.customers.len(), 3);
        assert_eq!(result.customers[0].distance, 1500.0);
        assert_eq!(result.customers[0].points, 150.0);

        // points are exactly distance / 10
        assert!((result.pearson_r.unwrap() - 1.0).abs() < 1e-12);
        assert!((result.slope.unwrap() - 0.1).abs() < 1e-12);
        assert!(result.intercept.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_province_distribution_excludes_nulls() {
        let counts = Analyzer::province_distribution(&profile()).unwrap();
        assert_eq!(counts[0].value, "Ontario");
        assert_eq!(counts[0].count, 2);
        assert!((counts[0].percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_salary_by_education() {
        let rows = Analyzer::salary_by_education(&profile()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].education, "Bachelor");
        assert_eq!(rows[0].mean, Some(60000.0));
        assert_eq!(rows[0].median, Some(60000.0));
        assert_eq!(rows[1].customers, 2);
        assert_eq!(rows[1].mean, Some(90000.0));
    }

    #[test]
    fn test_salary_by_education_skips_null_levels() {
        let profile = Table::new(
            "Customer_Loyalty_History",
            df![
                EDUCATION => [Some("College"), None, Some("College"), Some("Bachelor")],
                SALARY => [Some(40000.0), Some(99999.0), None, Some(61000.0)],
            ]
            .unwrap(),
        );
        let rows = Analyzer::salary_by_education(&profile).unwrap();

        let levels: Vec<(&str, usize, Option<f64>)> = rows
            .iter()
            .map(|r| (r.education.as_str(), r.customers, r.mean))
            .collect();
        assert_eq!(
            levels,
            vec![("Bachelor", 1, Some(61000.0)), ("College", 2, Some(40000.0))]
        );
    }

    #[test]
    fn test_loyalty_card_share_sums_to_100() {
        let share = Analyzer::loyalty_card_share(&profile()).unwrap();
        assert_eq!(share[0].value, "Star");
        let total: f64 = share.iter().map(|c| c.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_marital_gender_counts() {
        let counts = Analyzer::marital_gender_counts(&profile()).unwrap();
        let flat: Vec<(&str, &str, usize)> = counts
            .iter()
            .map(|c| (c.marital_status.as_str(), c.gender.as_str(), c.count))
            .collect();
        assert_eq!(
            flat,
            vec![("Married", "Female", 2), ("Married", "Male", 1), ("Single", "Male", 1)]
        );
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let err = Analyzer::monthly_flights(&profile()).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    // ==========================================================================
    // Flights by education
    // ==========================================================================

    #[test]
    fn test_flights_by_education_sums_per_customer() {
        let merged = Table::new(
            "Customer_Info",
            df![
                LOYALTY_NUMBER => [1i64, 1, 2, 3, 4],
                EDUCATION => [Some("Bachelor"), Some("Bachelor"), Some("Bachelor"), Some("Master"), None],
                FLIGHTS_BOOKED => [Some(3i64), Some(2), None, Some(7), Some(1)],
            ]
            .unwrap(),
        );
        let result = Analyzer::flights_by_education(&merged).unwrap();

        assert_eq!(
            result.groups,
            vec![
                GroupSample::new("Bachelor", vec![5.0, 0.0]),
                GroupSample::new("Master", vec![7.0]),
            ]
        );
        assert_eq!(result.descriptions[0].column, "Bachelor");
        assert_eq!(result.descriptions[0].mean, Some(2.5));
    }

    #[test]
    fn test_analyze_single_group_skips_kruskal() {
        let merged = Table::new(
            "Customer_Info",
            df![
                LOYALTY_NUMBER => [1i64, 2, 3],
                EDUCATION => ["Bachelor", "Bachelor", "Bachelor"],
                FLIGHTS_BOOKED => [1i64, 2, 4],
            ]
            .unwrap(),
        );
        let report = Analyzer::analyze(&activity(), &profile(), &merged, 0.05, 5000).unwrap();

        assert!(report.kruskal_wallis.is_none());
        assert_eq!(report.normality.len(), 1);
        assert!(report.render(&DisplayOptions::default()).contains("not run"));
    }
}
