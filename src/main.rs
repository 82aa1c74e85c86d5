//! intern-scout — binary entrypoint.
//! Subcommands: `scan` (provider → filter → CSV), `companies` (dataset filter),
//! `markdown` (job table → CSV).

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use intern_scout::companies::{self, CompanyFilter, IndustryCategory};
use intern_scout::dedup::{SeenUrls, DEFAULT_SEEN_PATH};
use intern_scout::ingest::{
    self,
    output::CsvSink,
    providers::{FixtureProvider, HttpProvider},
    types::ListingProvider,
};
use intern_scout::metrics::Metrics;
use intern_scout::{markdown, JobFilter, ScoutConfig};

const TOP_COMPANIES: usize = 10;

#[derive(Parser)]
#[command(name = "intern-scout", version, about = "Remote internship scout")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search every employer and append accepted, unseen listings to a CSV
    Scan(ScanArgs),
    /// Filter a company dataset by industry, size and country
    Companies {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Number of top localities to print
        #[arg(long, default_value_t = 15)]
        top: usize,
    },
    /// Convert a markdown job table into a CSV
    Markdown {
        #[arg(long, default_value = "README.md")]
        input: PathBuf,
        #[arg(long, default_value = "jobs.csv")]
        output: PathBuf,
        /// Keep only rows whose location contains this text
        #[arg(long)]
        location: Option<String>,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// CSV with a `name` column
    #[arg(long)]
    employers: PathBuf,
    /// JSON / JSONL listings file used as the provider
    #[arg(long, conflicts_with = "endpoint")]
    fixture: Option<PathBuf>,
    /// JSON search endpoint used as the provider
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long, default_value = "remote_internships.csv")]
    output: PathBuf,
    #[arg(long, default_value = DEFAULT_SEEN_PATH)]
    seen: PathBuf,
    /// Config file (overrides $SCOUT_CONFIG_PATH)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write Prometheus exposition text here after the run
    #[arg(long)]
    metrics_out: Option<PathBuf>,
}

/// Compact logs by default; SCOUT_LOG_JSON=1 switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("intern_scout=info,warn"));
    let json = std::env::var("SCOUT_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn scan(args: ScanArgs) -> Result<()> {
    let cfg = match &args.config {
        Some(p) => {
            let mut cfg = ScoutConfig::load_from(p)?;
            cfg.apply_env_overrides();
            cfg
        }
        None => ScoutConfig::load_default()?,
    };
    let filter = JobFilter::new(cfg.policy.clone())?;

    let provider: Box<dyn ListingProvider> = match (&args.fixture, &args.endpoint) {
        (Some(path), _) => Box::new(FixtureProvider::from_path(path)?),
        (None, Some(url)) => Box::new(HttpProvider::new(url.clone())?),
        (None, None) => bail!("either --fixture or --endpoint is required"),
    };

    let employers = companies::load_employers(&args.employers)?;
    if employers.is_empty() {
        tracing::warn!("no employers loaded; nothing to do");
        return Ok(());
    }

    // Output must be writable before any provider call.
    let mut sink = CsvSink::open(&args.output)?;
    let mut seen = SeenUrls::open(&args.seen)?;
    let metrics = match &args.metrics_out {
        Some(_) => Some(Metrics::init()?),
        None => None,
    };

    tracing::info!(
        employers = employers.len(),
        known_urls = seen.len(),
        output = %args.output.display(),
        provider = provider.name(),
        "scan starting"
    );
    let report = ingest::run_scan(
        provider.as_ref(),
        &employers,
        &filter,
        &cfg.scan,
        &mut seen,
        &mut sink,
    )
    .await?;

    if let (Some(m), Some(path)) = (metrics, &args.metrics_out) {
        m.write_to(path)?;
    }

    println!(
        "Searched {} employers, {} new listings written to {} ({} duplicates, {} provider errors) in {}s",
        report.employers_searched(),
        report.total_written(),
        args.output.display(),
        report.total_duplicates(),
        report.provider_errors(),
        (report.finished_at - report.started_at).num_seconds()
    );
    Ok(())
}

fn companies_cmd(input: PathBuf, output: PathBuf, top: usize) -> Result<()> {
    let summary = companies::filter_companies(&input, &output, &CompanyFilter::default())?;
    println!(
        "Kept {} of {} companies ({} tech, {} financial) -> {}",
        summary.kept,
        summary.total_rows,
        summary.count(IndustryCategory::Tech),
        summary.count(IndustryCategory::Financial),
        output.display()
    );
    for (loc, n) in summary.top_locations(top) {
        println!("{loc}: {n} companies");
    }
    for category in [IndustryCategory::Financial, IndustryCategory::Tech] {
        println!("\nTop {category} companies by employee count:");
        for c in summary.top_companies(category, TOP_COMPANIES) {
            println!("{}: {} employees", c.name, c.employees);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Scan(args) => scan(args).await.context("scan failed"),
        Command::Companies { input, output, top } => companies_cmd(input, output, top),
        Command::Markdown {
            input,
            output,
            location,
        } => {
            let rows = markdown::convert_file(&input, &output, location.as_deref())?;
            println!("Saved {rows} rows to {}", output.display());
            Ok(())
        }
    }
}
