//! NeuroKeep reporting CLI.
//!
//! Prints doctor-facing reports from a NeuroKeep database as JSON or CSV.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use neurokeep_core::export::{Exporter, LATEST_EVENTS_LIMIT};
use neurokeep_core::{seed, CoreConfig, Database, ReportAssembler};

#[derive(Parser)]
#[command(name = "neurokeep-report")]
#[command(about = "Adherence and blood-pressure reports from a NeuroKeep database")]
struct Cli {
    /// Database path (overrides NEUROKEEP_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Doctor dashboard: every patient with adherence, latest BP and risk
    Dashboard,

    /// Detail page for one patient
    Patient {
        /// Patient ID
        id: String,
    },

    /// Seven-day blood-pressure overview for one patient
    Bp {
        /// Patient ID
        id: String,
    },

    /// A patient's full event log as CSV
    ExportCsv {
        /// Patient ID
        id: String,
    },

    /// Most recent events across all patients
    Events {
        /// Number of events
        #[arg(short, long, default_value_t = LATEST_EVENTS_LIMIT)]
        limit: usize,
    },

    /// Seed demo data into an empty database
    Seed,
}

fn main() -> Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let cli = Cli::parse();
    let mut config = CoreConfig::from_env().context("invalid configuration")?;
    if let Some(path) = cli.db {
        config.db_path = path;
    }

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
    }
    let db = Database::open(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    let clock = config.clock();

    if config.seed_demo || matches!(cli.command, Commands::Seed) {
        let mut rng = rand::thread_rng();
        match seed::seed_demo(&db, &clock, &mut rng)? {
            Some(summary) => info!(patients = summary.patient_ids.len(), "demo data seeded"),
            None => info!("database already seeded"),
        }
    }

    let assembler = ReportAssembler::new(&db, &clock);
    let output = match cli.command {
        Commands::Dashboard => serde_json::to_string_pretty(&assembler.doctor_dashboard()?)?,
        Commands::Patient { id } => serde_json::to_string_pretty(&assembler.patient_detail(&id)?)?,
        Commands::Bp { id } => serde_json::to_string_pretty(&assembler.bp_overview(&id)?)?,
        Commands::ExportCsv { id } => {
            let export = Exporter::new(&db, &clock).export_events_csv(&id)?;
            info!(sha256 = %export.metadata.content_sha256, "event log exported");
            export.csv
        }
        Commands::Events { limit } => Exporter::new(&db, &clock).latest_events(limit)?.to_json()?,
        Commands::Seed => return Ok(()),
    };

    println!("{}", output);
    Ok(())
}
