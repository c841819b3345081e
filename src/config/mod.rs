use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const API_KEY_ENV: &str = "PEXELS_API_KEY";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pexels: PexelsConfig,
    pub output: OutputConfig,
    pub cache: CacheConfig,
    pub encoder: EncoderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PexelsConfig {
    /// Overridden by the PEXELS_API_KEY environment variable when set.
    pub api_key: Option<String>,
    pub api_base: String,
    pub landscape_per_page: u32,
    pub reel_per_page: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for rendered videos. Relative paths resolve against the working directory.
    pub directory: PathBuf,
    pub landscape_file: String,
    pub reel_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub search_file: Option<PathBuf>,
    /// Keep downloaded assets between runs, keyed by a hash of their URL.
    pub keep_assets: bool,
    pub asset_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub ffmpeg: Option<String>,
    pub ffprobe: Option<String>,
    pub video_codec: String,
    pub audio_codec: String,
}

impl Default for PexelsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.pexels.com".to_string(),
            landscape_per_page: 4,
            reel_per_page: 5,
            timeout_secs: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            landscape_file: "final_reel.mp4".to_string(),
            reel_file: "output.mp4".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_file: None,
            keep_assets: false,
            asset_dir: None,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: None,
            ffprobe: None,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

impl PexelsConfig {
    /// Resolve the API key, preferring the environment over the config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }
}

impl CacheConfig {
    pub fn search_file_path(&self) -> Result<PathBuf> {
        match &self.search_file {
            Some(path) => Ok(path.clone()),
            None => global::search_cache_file(),
        }
    }

    pub fn asset_dir_path(&self) -> Result<PathBuf> {
        match &self.asset_dir {
            Some(path) => Ok(path.clone()),
            None => global::asset_cache_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let config = Self::load_from(&config_path)?;
        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
