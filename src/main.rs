use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use audiocloud_server::config::{AppConfig, CliConfig, FileConfig};
use audiocloud_server::ingestion::{IngestionManager, StagingStore};
use audiocloud_server::playlist_store::{PlaylistStore, SqlitePlaylistStore};
use audiocloud_server::server::{self, run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the SQLite playlist database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Permanent media root. Defaults to `<db-dir>/static`.
    #[clap(long, value_parser = parse_path)]
    pub root_path: Option<PathBuf>,

    /// Scratch directory for uploads being ingested. Defaults to `<db-dir>/tmp`.
    #[clap(long, value_parser = parse_path)]
    pub temp_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Prepended to every track URL.
    #[clap(long, default_value = "")]
    pub public_base_url: String,

    /// Route prefix the media root is served under.
    #[clap(long, default_value = "/static")]
    pub static_path_prefix: String,

    /// Largest accepted upload, in megabytes.
    #[clap(long, default_value_t = 100)]
    pub max_upload_size_mb: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            root_path: self.root_path.clone(),
            temp_path: self.temp_path.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            public_base_url: self.public_base_url.clone(),
            static_path_prefix: self.static_path_prefix.clone(),
            max_upload_size_mb: self.max_upload_size_mb,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, stopping server...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    let db_path = app_config.playlist_db_path();
    info!("Opening SQLite playlist database at {:?}...", db_path);
    let playlist_store: Arc<dyn PlaylistStore> = Arc::new(SqlitePlaylistStore::new(&db_path)?);

    let staging = StagingStore::new(app_config.root_path.clone(), app_config.temp_path.clone());
    let swept = staging.init().await.with_context(|| {
        format!(
            "Failed to prepare media directories {:?} and {:?}",
            app_config.root_path, app_config.temp_path
        )
    })?;
    if swept > 0 {
        info!("Removed {} leftover entries from {:?}", swept, app_config.temp_path);
    }
    let ingestion_manager = Arc::new(IngestionManager::new(staging, playlist_store.clone()));

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
        media: app_config.media.clone(),
    };

    info!("Serving media from {:?}", app_config.root_path);
    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);
    run_server(
        server_config,
        playlist_store,
        ingestion_manager,
        shutdown_signal(),
    )
    .await
}
