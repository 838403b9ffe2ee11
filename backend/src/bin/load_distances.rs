//! Stage a lot-to-building distance CSV and optionally materialize it.
//!
//! # Examples
//! ```sh
//! cargo run --bin load-distances -- --csv distances.csv --materialize
//! ```
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

use smartpark::domain::ports::DistanceLoadCommand;
use smartpark::domain::{
    AdminContext, BulkLoadService, DEFAULT_BATCH_SIZE, MaterializeReport, StageReport,
    StagingMode, StagingPlan,
};
use smartpark::outbound::persistence::{
    DbConnector, DieselSchemaRepository, DieselStagingRepository,
};

const OPERATOR: &str = "load-distances";

/// `load-distances` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "load-distances",
    about = "Stage lot-to-building walking distances and upsert them into production",
    version
)]
struct CliArgs {
    /// CSV with a header row naming the staging columns.
    #[arg(long = "csv", value_name = "path")]
    csv: PathBuf,
    /// Upsert staged rows into `lot_building_distance` after staging.
    #[arg(long)]
    materialize: bool,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Rows per insert batch.
    #[arg(long = "batch-size", value_name = "rows", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    /// Stage every batch in one transaction.
    #[arg(long)]
    atomic: bool,
}

impl CliArgs {
    fn staging_plan(&self) -> StagingPlan {
        let mode = if self.atomic {
            StagingMode::Atomic
        } else {
            StagingMode::PerBatch
        };
        StagingPlan::new(self.batch_size, mode)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        return Err(eyre!("tracing init failed: {error}"));
    }
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(&args))
}

async fn run(args: &CliArgs) -> Result<()> {
    let upload = read_file(&args.csv)?;
    let connector = DbConnector::new(resolve_database_url(args.database_url.clone())?);
    let loader = BulkLoadService::new(
        Arc::new(DieselSchemaRepository::new(connector.clone())),
        Arc::new(DieselStagingRepository::new(connector)),
        args.staging_plan(),
    );
    let admin = AdminContext::restore(OPERATOR).ok_or_else(|| eyre!("invalid operator name"))?;

    let staged = loader
        .stage(&admin, &upload)
        .await
        .map_err(|error| eyre!("staging failed: {error}"))?;
    print_stage_report(&staged);

    if args.materialize {
        let report = loader
            .materialize(&admin)
            .await
            .map_err(|error| eyre!("materialize failed: {error}"))?;
        print_materialize_report(&report);
    }
    Ok(())
}

fn print_stage_report(report: &StageReport) {
    println!("staged_rows={}", report.rows);
    println!("batches={}", report.batches);
    println!("sha256={}", report.sha256);
}

fn print_materialize_report(report: &MaterializeReport) {
    println!("upserted_rows={}", report.upserted_rows);
    println!("unmatched_rows={}", report.unmatched_rows);
    for row in &report.unmatched_sample {
        println!(
            "unmatched lot={:?} building={:?} distance={:?} lot_matched={} building_matched={}",
            row.lot_title_raw.as_deref().unwrap_or(""),
            row.building_name_raw.as_deref().unwrap_or(""),
            row.distance_sec_raw.as_deref().unwrap_or(""),
            row.lot_matched,
            row.building_matched,
        );
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("csv path must be a file: {}", path.display()))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open csv parent directory '{}'", parent.display()))?;
    let mut file = directory
        .open(Path::new(file_name))
        .wrap_err_with(|| format!("open csv file '{}'", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .wrap_err_with(|| format!("read csv file '{}'", path.display()))?;
    Ok(bytes)
}

fn resolve_database_url(explicit: Option<String>) -> Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(eyre!("--database-url must not be empty when provided"));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL")
        .map_err(|_| eyre!("database URL missing: set --database-url or DATABASE_URL"))?;
    if from_env.trim().is_empty() {
        return Err(eyre!("DATABASE_URL must not be empty"));
    }
    Ok(from_env)
}
