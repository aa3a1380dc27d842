//! CLI entry point for the water quality rater.
//!
//! Provides subcommands for grading single readings, classifying sample
//! files, building dashboard reports (optionally published to S3), listing
//! pollution warnings and listing known rivers or methods.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use water_quality_rater::analyzers::analyzer::Dashboard;
use water_quality_rater::analyzers::writetos3::{report_key, write_json_to_s3};
use water_quality_rater::{
    config::ReportConfig,
    fetch::{BasicClient, load_source},
    normalize::{Dimension, DimensionFilter},
    output::{append_samples, to_json, write_json},
    parser::parse_samples,
    quality::{Indicator, classify},
    store::{MemoryStore, SampleStore},
};

#[derive(Parser)]
#[command(name = "water_quality_rater")]
#[command(about = "Classify water samples and build water quality reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum IndicatorArg {
    Cod,
    AmmoniaNitrogen,
    TotalPhosphorus,
    Permanganate,
}

impl From<IndicatorArg> for Indicator {
    fn from(arg: IndicatorArg) -> Self {
        match arg {
            IndicatorArg::Cod => Indicator::Cod,
            IndicatorArg::AmmoniaNitrogen => Indicator::AmmoniaNitrogen,
            IndicatorArg::TotalPhosphorus => Indicator::TotalPhosphorus,
            IndicatorArg::Permanganate => Indicator::Permanganate,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DimensionArg {
    River,
    Method,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::River => Dimension::River,
            DimensionArg::Method => Dimension::Method,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a single indicator reading
    Grade {
        /// Indicator the reading belongs to
        #[arg(short, long, value_enum)]
        indicator: IndicatorArg,

        /// Reading in mg/L
        value: f64,
    },
    /// Grade every sample in a CSV file and append the results to another CSV
    Classify {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// CSV file to append classified samples to
        #[arg(short, long, default_value = "classified.csv")]
        output: String,
    },
    /// Build the full dashboard report for a sample file
    Report {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Restrict the report to one river
        #[arg(long, conflicts_with = "method")]
        river: Option<String>,

        /// Restrict the report to one collection method ("" selects Other)
        #[arg(long)]
        method: Option<String>,

        /// JSON file to write the report to (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Report limits config (JSON); falls back to REPORT_CONFIG
        #[arg(long)]
        config: Option<String>,

        /// Optional: S3 bucket name to publish the report to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress the report before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// List samples that warrant a pollution warning, most severe first
    Warnings {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Maximum number of warnings to return
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Restrict to one river
        #[arg(long, conflicts_with = "method")]
        river: Option<String>,

        /// Restrict to one collection method
        #[arg(long)]
        method: Option<String>,
    },
    /// List the known rivers or collection methods
    List {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Dimension to list
        #[arg(short, long, value_enum, default_value = "river")]
        dimension: DimensionArg,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/water_quality_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("water_quality_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grade { indicator, value } => {
            let indicator = Indicator::from(indicator);
            let grade = classify(indicator, Some(value));
            info!(%indicator, value, grade = ?grade, "Reading graded");
            match grade {
                Some(g) => println!("{g}"),
                None => println!("ungraded"),
            }
        }
        Commands::Classify { source, output } => {
            let store = load_store(&source).await?;
            let snapshot = store.query(&DimensionFilter::All).await?;
            append_samples(&output, snapshot.samples())?;

            let ungraded = snapshot
                .samples()
                .iter()
                .filter(|s| s.composite_grade.is_none())
                .count();
            if ungraded > 0 {
                warn!(ungraded, "Samples without any gradable reading");
            }
            info!(rows = snapshot.len(), output = %output, "Samples classified");
        }
        Commands::Report {
            source,
            river,
            method,
            output,
            config,
            s3_bucket,
            gzip,
        } => {
            let limits = ReportConfig::resolve(config.as_deref())?;
            let dashboard = Dashboard::with_limits(load_store(&source).await?, limits);
            let filter = DimensionFilter::from_options(river, method);
            ensure_known(&dashboard, &filter).await?;

            let report = dashboard.compute_dashboard(&filter).await?;
            info!(
                total = report.overview.counts.total_count,
                excellent_rate = report.overview.excellent_rate,
                warnings = report.warning_data.len(),
                "Report built"
            );

            match output {
                Some(path) => write_json(&path, &report)?,
                None => println!("{}", to_json(&report)?),
            }

            if let Some(bucket) = s3_bucket {
                let config = aws_config::load_from_env().await;
                let s3 = aws_sdk_s3::Client::new(&config);
                let key = report_key(&filter);
                write_json_to_s3(&s3, &bucket, &key, &report, gzip).await?;
                info!(bucket = %bucket, key = %key, gzip, "Report published to S3");
            }
        }
        Commands::Warnings {
            source,
            limit,
            river,
            method,
        } => {
            let dashboard = Dashboard::new(load_store(&source).await?);
            let filter = DimensionFilter::from_options(river, method);
            ensure_known(&dashboard, &filter).await?;

            let warnings = dashboard.compute_warnings(limit, &filter).await?;
            info!(count = warnings.len(), "Warnings ranked");
            println!("{}", to_json(&warnings)?);
        }
        Commands::List { source, dimension } => {
            let dashboard = Dashboard::new(load_store(&source).await?);
            let list = dashboard.list_values(dimension.into()).await?;
            println!("{}", to_json(&list)?);
        }
    }

    Ok(())
}

/// Loads and ingests a sample file into a fresh in-memory store.
#[tracing::instrument]
async fn load_store(source: &str) -> Result<MemoryStore> {
    let client = BasicClient::new();
    let bytes = load_source(&client, source).await?;
    let rows = parse_samples(&bytes)?;
    let store = MemoryStore::from_rows(rows)?;
    info!(rows = store.len(), "Samples ingested");
    Ok(store)
}

/// Rejects a filter naming a river or method that has no samples.
async fn ensure_known<S: SampleStore>(dashboard: &Dashboard<S>, filter: &DimensionFilter) -> Result<()> {
    if !dashboard.is_known(filter).await? {
        match filter.selection() {
            Some((Dimension::River, value)) => bail!("River '{value}' does not exist"),
            Some((Dimension::Method, value)) => bail!("Method '{value}' does not exist"),
            None => {}
        }
    }
    Ok(())
}
