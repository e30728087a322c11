//! tasting-search - wine name autocomplete service
//!
//! Serves merged catalog and event-local wine search over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tasting_common::config::{
    resolve_root_folder, ConfigSource, LoggingConfig, TomlConfig, ROOT_FOLDER_ENV,
};
use tasting_common::db::init_database;
use tasting_search::{build_router, AppState, SqliteWineStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tasting-search", version, about = "Wine search service for tasting events")]
struct Args {
    /// Root folder holding the database (overrides env and config)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Path to TOML config file
    #[arg(long, env = "TASTING_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP port (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = TomlConfig::load(args.config.as_deref())?;
    init_tracing(&config.logging)?;

    info!(
        "Starting tasting-search v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &source {
        ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
        ConfigSource::Defaults { missing: Some(path) } => {
            warn!("Config file {} not found, using built-in defaults", path.display())
        }
        ConfigSource::Defaults { missing: None } => {
            warn!("No config file found, using built-in defaults")
        }
    }

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, &config);
    let db_path = config.resolve_database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Connected to database");

    let store = Arc::new(SqliteWineStore::new(pool));
    let state = AppState::new(store, &config.search);
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("tasting-search listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
