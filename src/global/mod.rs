use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "reelgen";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .context("Unable to determine config directory")
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn cache_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::cache_dir() {
        return Ok(dir.join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".cache").join(APP_DIR));
    }
    Err(anyhow!("Unable to determine cache directory"))
}

pub fn search_cache_file() -> Result<PathBuf> {
    Ok(cache_dir()?.join("cached_videos.json"))
}

pub fn asset_cache_dir() -> Result<PathBuf> {
    Ok(cache_dir()?.join("assets"))
}
