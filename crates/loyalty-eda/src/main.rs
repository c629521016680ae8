//! CLI entry point for the loyalty EDA pipeline.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use loyalty_eda::summarizer::{render_frequencies, render_numeric};
use loyalty_eda::{
    DisplayOptions, OutputFormat, Pipeline, PipelineConfig, PipelineResult, TableReport,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// CLI-compatible output format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook (.xlsx)
    Excel,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli: CliOutputFormat) -> Self {
        match cli {
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Excel => OutputFormat::Excel,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory data analysis of an airline loyalty program",
    long_about = "Loads the flight activity and customer profile tables, cleans and merges \
                  them, writes the cleaned snapshots and runs the analysis.\n\n\
                  EXAMPLES:\n  \
                  # Default file names in the current directory\n  \
                  loyalty-eda\n\n  \
                  # Explicit inputs, Excel output\n  \
                  loyalty-eda --activity data/activity.csv --profile data/history.csv \
                  -o out --format excel\n\n  \
                  # Machine-readable result\n  \
                  loyalty-eda --json | jq .analysis.kruskal_wallis"
)]
struct Args {
    /// Flight activity file (CSV, Excel or JSON)
    #[arg(long)]
    activity: Option<PathBuf>,

    /// Customer profile file (CSV, Excel or JSON)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Output directory for the cleaned tables
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format of the written tables
    #[arg(long, value_enum)]
    format: Option<CliOutputFormat>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rows shown in table previews
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Distinct values listed per column before truncating
    #[arg(long)]
    max_values: Option<usize>,

    /// Significance level for the hypothesis tests
    #[arg(long)]
    alpha: Option<f64>,

    /// Skip chart data and hypothesis tests
    #[arg(long)]
    skip_analysis: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable summary
    ///
    /// Disables all logs; only the final result is printed.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = Pipeline::builder().config(config).build()?;
    let result = pipeline.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result, &pipeline.config().display);
    }

    if !result.all_saved() {
        warn!("Some tables could not be saved");
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Reading config file {}", path.display()))?;
            let config: PipelineConfig = serde_json::from_str(&text)
                .with_context(|| format!("Parsing config file {}", path.display()))?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => PipelineConfig::default(),
    };

    let mut builder = PipelineConfig::builder().base(base);
    if let Some(path) = &args.activity {
        builder = builder.activity_path(path);
    }
    if let Some(path) = &args.profile {
        builder = builder.profile_path(path);
    }
    if let Some(dir) = &args.output {
        builder = builder.output_dir(dir);
    }
    if let Some(format) = args.format {
        builder = builder.output_format(format.into());
    }
    if let Some(rows) = args.preview_rows {
        builder = builder.preview_rows(rows);
    }
    if let Some(max) = args.max_values {
        builder = builder.max_listed_values(max);
    }
    if let Some(alpha) = args.alpha {
        builder = builder.alpha(alpha);
    }
    if args.skip_analysis {
        builder = builder.run_analysis(false);
    }

    Ok(builder.build()?)
}

/// Print the human-readable report.
///
/// Uses `println!` on purpose: this is the program's output, not logging.
fn print_summary(result: &PipelineResult, display: &DisplayOptions) {
    let rule = "=".repeat(80);

    for (title, report) in [
        ("FLIGHT ACTIVITY", &result.activity),
        ("CUSTOMER PROFILES", &result.profile),
        ("MERGED CUSTOMER INFO", &result.merged),
    ] {
        println!("\n{}\n{}\n{}", rule, title, rule);
        print_table_report(report, display);
    }

    println!("\n{}\nCLEANING\n{}", rule, rule);
    for step in &result.cleaning.steps {
        println!("  - {}", step);
    }
    for issue in &result.cleaning.issues {
        println!("  ! {}", issue);
    }

    println!("\n{}\nSTATISTICS\n{}", rule, rule);
    for stats in &result.statistics {
        println!("\n{}", stats.table);
        println!("{}", render_numeric(&stats.numeric, display));
        print!("{}", render_frequencies(&stats.categorical, display));
    }

    if !result.saves.is_empty() {
        println!("\n{}\nSAVED FILES\n{}", rule, rule);
        for save in &result.saves {
            match &save.error {
                None => println!("  {} -> {}", save.table, save.path.display()),
                Some(e) => println!("  {} FAILED: {}", save.table, e),
            }
        }
    }

    if let Some(analysis) = &result.analysis {
        println!("\n{}\nANALYSIS\n{}", rule, rule);
        print!("{}", analysis.render(display));
    }

    println!("\nCompleted in {} ms", result.duration_ms);
}

fn print_table_report(report: &TableReport, display: &DisplayOptions) {
    println!("{}", report.overview.render(display));
    println!("{}", report.summary.render(display));
    println!("{}", report.unique_values.render(display));
    println!("{}", report.nulls.render(display));
    println!("{}", report.duplicates.render());
}
