mod file_config;

pub use file_config::{FileConfig, MediaConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub root_path: Option<PathBuf>,
    pub temp_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub public_base_url: String,
    pub static_path_prefix: String,
    pub max_upload_size_mb: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub root_path: PathBuf,
    pub temp_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub media: MediaSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaSettings {
    pub public_base_url: String,
    /// Always starts with '/' and never ends with one.
    pub static_path_prefix: String,
    pub max_upload_size_mb: usize,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            public_base_url: String::new(),
            static_path_prefix: "/static".to_string(),
            max_upload_size_mb: 100,
        }
    }
}

impl MediaSettings {
    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// Public URL of a file stored under the media root.
    pub fn track_url(&self, file_path: &str) -> String {
        format!(
            "{}{}/{}",
            self.public_base_url, self.static_path_prefix, file_path
        )
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let root_path = file
            .root_path
            .map(PathBuf::from)
            .or_else(|| cli.root_path.clone())
            .unwrap_or_else(|| db_dir.join("static"));
        let temp_path = file
            .temp_path
            .map(PathBuf::from)
            .or_else(|| cli.temp_path.clone())
            .unwrap_or_else(|| db_dir.join("tmp"));

        if root_path == temp_path {
            bail!("root_path and temp_path must differ: {:?}", root_path);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let media_file = file.media.unwrap_or_default();
        let static_path_prefix = normalize_path_prefix(
            &media_file
                .static_path_prefix
                .unwrap_or_else(|| cli.static_path_prefix.clone()),
        )?;
        let media = MediaSettings {
            public_base_url: media_file
                .public_base_url
                .unwrap_or_else(|| cli.public_base_url.clone())
                .trim_end_matches('/')
                .to_string(),
            static_path_prefix,
            max_upload_size_mb: media_file
                .max_upload_size_mb
                .unwrap_or(cli.max_upload_size_mb),
        };

        Ok(Self {
            db_dir,
            root_path,
            temp_path,
            port,
            metrics_port,
            logging_level,
            media,
        })
    }

    pub fn playlist_db_path(&self) -> PathBuf {
        self.db_dir.join("playlists.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

/// "media/" and "/media" both become "/media".
fn normalize_path_prefix(prefix: &str) -> Result<String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        bail!("static_path_prefix must not be empty");
    }
    Ok(format!("/{}", trimmed))
}
