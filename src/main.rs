mod render;
mod report;

use analytics::derive_metrics;
use analyzer::filter_options;
use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use configuration::{Config, ReportFormat, load_config};
use core_types::{Column, FilterSpec, MetricKey, describe_columns};
use loader::SourceCache;
use report::ReportBuilder;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the Partnerscope report tool.
fn main() -> Result<()> {
    // A missing .env file is fine; PARTNERSCOPE__* variables may come from the shell.
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Report(args) => handle_report(args),
        Commands::Options(args) => handle_options(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Referral partner metrics: rankings, channel performance, churn risk and the ideal profile.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the partner report for the selected partners.
    Report(ReportArgs),
    /// List the values each filterable column offers.
    Options(OptionsArgs),
}

#[derive(Parser)]
struct SourceArgs {
    /// Path to the CSV export of the partner base. Overrides `[data] path`.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Path to the configuration file (default: partnerscope.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format. Overrides `[report] format`.
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,
}

#[derive(Parser)]
struct ReportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Keep only partners whose column value is listed, e.g. --filter "Cidade=Curitiba,Joinville".
    /// Repeat for several columns. An empty list ("Cidade=") selects nobody.
    #[arg(long = "filter", value_name = "COLUMN=V1,V2")]
    filters: Vec<String>,

    /// How many partners the ranking shows. Overrides `[ranking] top_n`.
    #[arg(long)]
    top: Option<usize>,

    /// The metric the ranking is ordered by, e.g. "qualification_rate". Overrides `[ranking] metric`.
    #[arg(long)]
    metric: Option<MetricKey>,

    /// Reference date for days since contact (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Parser)]
struct OptionsArgs {
    #[command(flatten)]
    source: SourceArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Loads the configuration and applies the command-line overrides to it.
fn resolve_config(args: &SourceArgs) -> Result<Config> {
    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = &args.data {
        config.data.path = path.clone();
    }
    if let Some(format) = args.format {
        config.report.format = format;
    }
    Ok(config)
}

/// Loads and derives the partner base. Each command runs once per process, so
/// the cache it passes in starts empty.
fn load_dataset(cache: &mut SourceCache, path: &Path, today: NaiveDate) -> Result<core_types::Dataset> {
    let table = cache
        .get_or_load(path)
        .with_context(|| format!("Failed to load partner base from {}", path.display()))?;
    Ok(derive_metrics(&table, today))
}

fn parse_filters(assignments: &[String]) -> Result<FilterSpec> {
    let mut spec = FilterSpec::new();
    for assignment in assignments {
        if !spec.add_assignment(assignment)? {
            bail!(
                "Unknown filter column in '{assignment}'. Filterable columns: {}",
                describe_columns(&Column::FILTERABLE)
            );
        }
    }
    if let Some((column, _)) = spec.iter().find(|(column, _)| !column.is_filterable()) {
        bail!(
            "Column '{column}' cannot be filtered. Filterable columns: {}",
            describe_columns(&Column::FILTERABLE)
        );
    }
    Ok(spec)
}

/// Handles the `report` command.
fn handle_report(args: ReportArgs) -> Result<()> {
    let mut config = resolve_config(&args.source)?;
    if let Some(top) = args.top {
        config.ranking.top_n = top;
    }
    if let Some(metric) = args.metric {
        config.ranking.metric = metric;
    }
    config.validate().context("Invalid command-line overrides")?;
    let filters = parse_filters(&args.filters)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let mut cache = SourceCache::new();
    let dataset = load_dataset(&mut cache, &config.data.path, today)?;

    let builder = ReportBuilder::from_config(&config)?;
    let report = builder.build(&dataset, &filters, today);
    println!("{}", render::render_report(&report, config.report.format)?);
    Ok(())
}

/// Handles the `options` command.
fn handle_options(args: OptionsArgs) -> Result<()> {
    let config = resolve_config(&args.source)?;
    let mut cache = SourceCache::new();
    let dataset = load_dataset(&mut cache, &config.data.path, Local::now().date_naive())?;
    println!(
        "{}",
        render::render_options(&filter_options(&dataset), config.report.format)?
    );
    Ok(())
}
