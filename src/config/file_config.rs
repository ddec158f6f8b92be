use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    /// Permanent media root, one directory per playlist.
    pub root_path: Option<String>,
    /// Scratch space for staged uploads and expansion working directories.
    pub temp_path: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,

    pub media: Option<MediaConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct MediaConfig {
    /// Prepended to track URLs, e.g. "https://audio.example.com".
    pub public_base_url: Option<String>,
    /// Route prefix the media root is served under.
    pub static_path_prefix: Option<String>,
    pub max_upload_size_mb: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
