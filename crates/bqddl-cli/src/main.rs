use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bqddl_catalog::{BigQueryAdapter, WarehouseAdapter, DEFAULT_QUERY_TIMEOUT};
use bqddl_core::{Config, QueryRewriter, RewriteMode};
use bqddl_engine::{FileOutcome, ProvisionReport, Provisioner};

mod logging;

/// bqddl - Create BigQuery tables from a folder of DDL files
///
/// Settings are read from GCP_PROJECT_ID, GCP_REGION, BQ_DATASET_NAME and
/// DDL_FOLDER_PATH (a `.env` file in the working directory is loaded first).
#[derive(Parser)]
#[command(name = "bqddl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log file (rotated at 10 MB, rotated files kept 10 days)
    #[arg(long, default_value = logging::DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// How table names in the DDL are qualified with the dataset
    #[arg(long, default_value_t = RewriteMode::Substring)]
    rewrite: RewriteMode,

    /// Service account key file (default: Application Default Credentials)
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Seconds to wait for a single DDL job before reporting a timeout
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT.as_secs())]
    query_timeout: u64,

    /// Also write a JSON report of every file's outcome
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_loaded = load_env_file(cli.env_file.as_deref());
    logging::init(&cli.log_file)?;
    env_loaded?;

    let credentials = cli.credentials.clone();
    let query_timeout = Duration::from_secs(cli.query_timeout);
    let outcome = run(
        &cli,
        |name| std::env::var(name).ok(),
        move |project_id, region| connect(project_id, region, credentials, query_timeout),
    )
    .await;

    match outcome {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(_) => std::process::exit(1),
    }
}

/// Configure, connect and provision
///
/// Configuration is resolved through `lookup` before `connect` is called, so
/// a missing variable never reaches the warehouse. Every fatal error is
/// logged before it is returned.
async fn run<L, C, Fut, A>(cli: &Cli, lookup: L, connect: C) -> Result<ProvisionReport>
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(String, String) -> Fut,
    Fut: Future<Output = Result<A>>,
    A: WarehouseAdapter + 'static,
{
    let config = Config::from_lookup(lookup).inspect_err(|e| tracing::error!("{}", e))?;

    let adapter = connect(config.project_id.clone(), config.region.clone())
        .await
        .inspect_err(|e| tracing::error!("{}", e))?;

    let rewriter = QueryRewriter::new(cli.rewrite);
    tracing::debug!("Rewriting table names with {} mode", rewriter.mode());

    let provisioner = Provisioner::new(&adapter, &config.project_id, &config.dataset).with_rewriter(rewriter);

    let report = provisioner
        .run_folder(&config.ddl_folder)
        .await
        .inspect_err(|e| tracing::error!("{}", e))?;

    if report.has_failures() {
        tracing::warn!("{} of {} DDL files failed.", report.summary.failed, report.summary.total);
    }

    if let Some(path) = &cli.report {
        report
            .save_to_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to write report {}: {}", path.display(), e))
            .inspect_err(|e| tracing::error!("{}", e))?;
        tracing::info!("Report saved to {}", path.display());
    }

    Ok(report)
}

/// Load `.env` style variables
///
/// Without an explicit path a missing `./.env` is fine; an explicit file must
/// exist.
fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .map_err(|e| anyhow::anyhow!("Failed to load env file {}: {}", path.display(), e))?;
        }
        None => match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(anyhow::anyhow!("Failed to load .env: {}", e)),
        },
    }

    Ok(())
}

/// Build the BigQuery client for the configured project
async fn connect(
    project_id: String,
    region: String,
    credentials: Option<PathBuf>,
    query_timeout: Duration,
) -> Result<BigQueryAdapter> {
    let adapter = match credentials {
        Some(key_path) => BigQueryAdapter::from_service_account_file(project_id, region, key_path).await,
        None => BigQueryAdapter::with_adc(project_id, region).await,
    }
    .map_err(|e| anyhow::anyhow!("Failed to create BigQuery client: {}", e))?
    .with_query_timeout(query_timeout);

    tracing::info!(
        "Connected to BigQuery project {} in {}",
        adapter.project_id(),
        adapter.region()
    );

    Ok(adapter)
}

/// Print run summary to stdout
fn print_summary(report: &ProvisionReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "DDL Provisioning Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Dataset: {}", report.dataset);
    println!("Files processed: {}", report.summary.total);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Created: {}", report.summary.created.to_string().green());
    println!("  Skipped: {}", report.summary.skipped);
    println!("  Empty:   {}", report.summary.empty);

    if report.has_failures() {
        println!("  Failed:  {}", report.summary.failed.to_string().red().bold());
    } else {
        println!("  Failed:  {}", report.summary.failed.to_string().green());
    }
    println!();

    for file in &report.files {
        let status = match &file.outcome {
            FileOutcome::Created => "CREATED".green().bold(),
            FileOutcome::Skipped => "SKIPPED".cyan(),
            FileOutcome::EmptyQuery => "EMPTY".yellow(),
            FileOutcome::Failed { .. } => "FAILED".red().bold(),
        };

        println!("  [{}] {}.{}", status, report.dataset, file.table);

        if let FileOutcome::Failed { reason } = &file.outcome {
            println!("    {}", reason);
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
