use std::error::Error;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use parkflow::analyzer::Dataset;
use parkflow::api;
use parkflow::config::{load_config, AppConfig, DbConfig};
use parkflow::ingest::{reader, CsvFileSource, VisitSource};
use parkflow::normalizer::normalize_all;
use parkflow::storage::{PgStorage, PgVisitSource};

#[derive(Parser)]
#[command(name = "parkflow")]
#[command(version)]
#[command(about = "Visitation ETL and dashboard API for U.S. national parks", long_about = None)]
struct Cli {
    /// Path to the application config file.
    #[arg(long, default_value = "config.json", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge raw visitation CSVs into the cleaned dataset
    Merge,
    /// Upsert the cleaned dataset into Postgres
    Load,
    /// Refresh the materialized views
    RefreshViews,
    /// Run smoke checks against the loaded database
    Status,
    /// Load the dataset and serve the dashboard API
    Serve,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    // Database credentials come from .env in local setups.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Merge => run_merge(&config).await,
        Commands::Load => run_load(&config),
        Commands::RefreshViews => run_refresh_views(),
        Commands::Status => run_status(),
        Commands::Serve => run_serve(config).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// `merge`: raw directory -> normalized batch -> cleaned CSV.
async fn run_merge(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let mut records = reader::merge_raw_dir(&config.raw_dir).await?;
    let before = records.len();
    normalize_all(&mut records);
    if records.len() < before {
        info!("Normalization dropped {} rows", before - records.len());
    }
    reader::write_cleaned_csv(&config.cleaned_file, &records)?;
    info!("Wrote {} with {} rows", config.cleaned_file, records.len());
    Ok(())
}

/// `load`: cleaned CSV -> staging upsert into park_visits.
fn run_load(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let mut records = reader::read_cleaned_csv(&config.cleaned_file)?;
    info!("Read {} rows from {}", records.len(), config.cleaned_file);
    normalize_all(&mut records);

    let db = DbConfig::from_env()?;
    let mut storage = PgStorage::connect(&db)?;
    storage.ensure_schema()?;
    let merged = storage.upsert_visits(&records)?;
    info!("Upserted {} rows into public.park_visits", merged);
    Ok(())
}

/// `refresh-views`: rebuild the reporting views after a load.
fn run_refresh_views() -> Result<(), Box<dyn Error>> {
    let db = DbConfig::from_env()?;
    let mut storage = PgStorage::connect(&db)?;
    storage.ensure_schema()?;
    storage.refresh_views()?;
    info!("All materialized views refreshed");
    Ok(())
}

/// `status`: the smoke checks run after a load/refresh cycle.
fn run_status() -> Result<(), Box<dyn Error>> {
    let db = DbConfig::from_env()?;
    let mut storage = PgStorage::connect(&db)?;

    let rows = storage.row_count()?;
    info!("park_visits rows: {}", rows);

    info!("Top states (latest year):");
    for entry in storage.top_states_latest_year(10)? {
        info!(
            "  {:<4} {}-{:02}  {:>12}",
            entry.state, entry.year, entry.month, entry.visits
        );
    }

    info!("Fastest growing parks (YoY):");
    for entry in storage.top_yoy_parks(10)? {
        info!(
            "  {:<6} {:<40} {}  {:+.1}%  ({} visits)",
            entry.unit_code, entry.park, entry.year, entry.yoy_pct, entry.visits_year
        );
    }
    Ok(())
}

/// `serve`: database first, cleaned CSV as fallback, then the API.
async fn run_serve(config: AppConfig) -> Result<(), Box<dyn Error>> {
    let mut sources: Vec<Box<dyn VisitSource>> = Vec::new();
    match DbConfig::from_env() {
        Ok(db) => sources.push(Box::new(PgVisitSource { config: db })),
        Err(e) => warn!("Database source disabled: {}", e),
    }
    sources.push(Box::new(CsvFileSource {
        path: config.cleaned_file.clone(),
    }));

    let dataset = Dataset::load(&sources, &config.forecast_file).await?;
    if dataset.is_empty() {
        warn!("Dataset is empty; every dashboard view will be blank");
    }
    info!(
        "Serving {} records across {} years",
        dataset.len(),
        dataset.years().len()
    );

    api::run_server(config, dataset).await?;
    Ok(())
}
