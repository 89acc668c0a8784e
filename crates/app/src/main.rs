use clap::Parser;
use services::{AppServices, Clock};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, normalize_sqlite_url, sqlite_file_path};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Create the directory that will hold the database file.
fn prepare_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let Some(parent) = sqlite_file_path(db_url).and_then(std::path::Path::parent) else {
        return Ok(());
    };
    std::fs::create_dir_all(parent)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let db_url = normalize_sqlite_url(&cli.db_url);
    debug!(%db_url, catalog = ?cli.catalog, "opening stores");

    // Open + migrate SQLite here so core/services stay free of file handling.
    prepare_sqlite_dir(&db_url)?;
    let mut app = AppServices::new_sqlite(&db_url, Clock::system(), cli.catalog).await?;

    commands::execute(&mut app, cli.command).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
