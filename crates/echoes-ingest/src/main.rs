//! Urban Echoes Ingest - species reference maintenance tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use echoes_common::logging::{init_logging, LogConfig, LogLevel};
use echoes_common::types::SpeciesRecord;
use echoes_ingest::config::IngestConfig;
use echoes_ingest::db::{create_pool, health_check, run_migrations, DbConfig};
use echoes_ingest::ebird::EbirdClient;
use echoes_ingest::reconciler::{ReconcileReport, Reconciler, ReconcilerConfig};
use echoes_ingest::sample::{seed_observations, SampleGenerator, DEFAULT_SAMPLE_COUNT};
use echoes_ingest::store::{MemoryStore, PgStore, ReferenceStore};
use echoes_ingest::IngestError;
use sqlx::PgPool;
use std::io::Write;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "echoes-ingest")]
#[command(author, version, about = "Urban Echoes species reference tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile the species table with eBird for one region
    Reconcile {
        /// eBird region code for the species list
        #[arg(long)]
        region_code: Option<String>,

        /// Region name stored with each species
        #[arg(long)]
        region_name: Option<String>,

        /// Locale for localized species names
        #[arg(long)]
        locale: Option<String>,

        /// Latitude for the recent observations query
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude for the recent observations query
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Maximum number of recent observations to fetch
        #[arg(long)]
        max_results: Option<u32>,

        /// Reconcile into an in-memory table instead of the database
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply database migrations
    Migrate,

    /// Print the species table
    List {
        /// Only species of this region
        #[arg(short, long)]
        region: Option<String>,
    },

    /// Seed a batch of synthetic observations
    Sample {
        /// Number of observations to generate
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        count: usize,

        /// Seed for reproducible batches
        #[arg(long)]
        seed: Option<u64>,

        /// Only draw species of this region
        #[arg(short, long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_config = build_log_config(cli.verbose)?;
    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Reconcile {
            region_code,
            region_name,
            locale,
            lat,
            lng,
            max_results,
            dry_run,
        } => {
            let mut config = IngestConfig::load()?;
            let region = &mut config.region;
            if let Some(code) = region_code {
                region.region_code = code;
            }
            if let Some(name) = region_name {
                region.region_name = name;
            }
            if let Some(locale) = locale {
                region.locale = locale;
            }
            if let Some(lat) = lat {
                region.latitude = lat;
            }
            if let Some(lng) = lng {
                region.longitude = lng;
            }
            if let Some(max_results) = max_results {
                region.max_results = max_results;
            }
            config.validate()?;

            let provider = EbirdClient::new(&config.ebird)?;
            let reconciler_config =
                ReconcilerConfig::from_region(&config.region).with_progress(!cli.verbose);

            info!(
                region_code = %reconciler_config.region_code,
                region_name = %reconciler_config.region_name,
                dry_run,
                "Reconciling species reference table"
            );

            let report = if dry_run {
                Reconciler::new(provider, MemoryStore::new(), reconciler_config)
                    .run()
                    .await?
            } else {
                let store = PgStore::new(connect().await?);
                Reconciler::new(provider, store, reconciler_config).run().await?
            };

            log_report(&report);
        },
        Command::Migrate => {
            info!("Applying database migrations");
            connect().await?;
        },
        Command::List { region } => {
            let store = PgStore::new(connect().await?);
            let species = store.list_species(region.as_deref()).await?;
            print_species(&species)?;
        },
        Command::Sample { count, seed, region } => {
            let store = PgStore::new(connect().await?);
            let species = store.list_species(region.as_deref()).await?;
            if species.is_empty() {
                return Err(IngestError::no_species(region.as_deref()).into());
            }

            let mut generator = match seed {
                Some(seed) => SampleGenerator::seeded(seed),
                None => SampleGenerator::new(),
            };

            info!(count, species = species.len(), "Generating sample observations");
            let batch = seed_observations(&store, &mut generator, &species, count).await?;
            info!(
                batch_id = %batch.batch_id,
                inserted = batch.inserted,
                species_marked = batch.species_marked,
                "Sample batch stored"
            );
        },
    }

    info!("Done");
    Ok(())
}

/// `LOG_*` variables override the defaults; `--verbose` overrides `LOG_LEVEL`
fn build_log_config(verbose: bool) -> echoes_common::Result<LogConfig> {
    let mut config = LogConfig::builder()
        .level(LogLevel::Info)
        .log_file_prefix("echoes-ingest")
        .build()
        .merge_env()?;

    if verbose {
        config.level = LogLevel::Debug;
    }

    Ok(config)
}

/// Open the pool from `DATABASE_URL` and bring the schema up to date
async fn connect() -> Result<PgPool> {
    let db_config = DbConfig::from_env()?;
    let pool = create_pool(&db_config)
        .await
        .context("Failed to connect to the database")?;
    health_check(&pool).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

fn log_report(report: &ReconcileReport) {
    info!(
        species_codes = report.species_codes,
        taxonomy_entries = report.taxonomy_entries,
        inserted = report.inserted,
        updated = report.updated,
        unchanged = report.unchanged,
        rejected_hybrid = report.rejected_hybrid,
        rejected_undetermined = report.rejected_undetermined,
        rejected_denylisted = report.rejected_denylisted,
        malformed = report.malformed,
        duplicates = report.duplicates,
        "Species phase summary"
    );
    info!(
        fetched = report.observations_fetched,
        marked = report.marked,
        unmatched = report.unmatched,
        skipped = report.observations_skipped,
        "Recent observation phase summary"
    );
}

fn print_species(species: &[SpeciesRecord]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(
        out,
        "scientific_name\tcommon_name\tlocalized_name\tregion\tis_common\tlast_observed"
    )?;

    for bird in species {
        let last_observed = bird
            .last_observed
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            bird.scientific_name,
            bird.common_name,
            bird.localized_name.as_deref().unwrap_or("-"),
            bird.region,
            bird.is_common,
            last_observed
        )?;
    }

    Ok(())
}
