use std::{error::Error, path::PathBuf};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use credit_tracker::{CredentialHash, initialize_db, load_fixture_directory};

/// A utility for loading JSON seed data into the credit_tracker database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. It is created if it does not exist.
    #[arg(long)]
    db_path: String,

    /// The directory containing the `*.json` fixture files.
    #[arg(long, default_value = "fixtures")]
    fixtures_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let record_count =
        load_fixture_directory(&args.fixtures_dir, CredentialHash::DEFAULT_COST, &conn)?;

    println!(
        "Loaded {record_count} records from {:#?}",
        args.fixtures_dir
    );

    Ok(())
}
