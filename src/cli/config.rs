//! CLI handler for inspecting the configuration file.

use anyhow::{Context, Result};

use crate::cli::args::{ConfigCliArgs, ConfigCommand};
use crate::config::{Config, API_KEY_ENV};

pub fn handle_config_command(args: ConfigCliArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Show => handle_show(),
        ConfigCommand::Path => {
            println!("{}", Config::config_path()?.display());
            Ok(())
        }
        ConfigCommand::Init { force } => handle_init(force),
    }
}

fn handle_show() -> Result<()> {
    let config = Config::load()?;
    let pexels = &config.pexels;

    println!();
    println!("Configuration");
    println!("=============");
    println!();
    println!("Pexels:");
    println!("  API key:      {}", mask_secret(&pexels.resolve_api_key()));
    println!("  Key source:   {}", key_source(&config));
    println!("  Base URL:     {}", pexels.api_base);
    println!(
        "  Page size:    {} (landscape) / {} (reel)",
        pexels.landscape_per_page, pexels.reel_per_page
    );
    println!();
    println!("Output:");
    println!("  Directory:    {}", config.output.directory.display());
    println!("  Landscape:    {}", config.output.landscape_file);
    println!("  Reel:         {}", config.output.reel_file);
    println!();
    println!("Cache:");
    println!("  Enabled:      {}", config.cache.enabled);
    println!("  Search file:  {}", config.cache.search_file_path()?.display());
    println!("  Keep assets:  {}", config.cache.keep_assets);
    println!();
    println!("Encoder:");
    println!(
        "  ffmpeg:       {}",
        config.encoder.ffmpeg.as_deref().unwrap_or("<PATH>")
    );
    println!(
        "  ffprobe:      {}",
        config.encoder.ffprobe.as_deref().unwrap_or("<PATH>")
    );
    println!(
        "  Codecs:       {} / {}",
        config.encoder.video_codec, config.encoder.audio_codec
    );
    println!();
    println!("Config file:    {}", Config::config_path()?.display());

    Ok(())
}

fn handle_init(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    Config::default()
        .save()
        .context("Failed to write default config")?;
    println!("Wrote default config to {}", path.display());
    println!("Set {API_KEY_ENV} or add api_key under [pexels] before searching.");
    Ok(())
}

fn key_source(config: &Config) -> &'static str {
    if std::env::var(API_KEY_ENV).is_ok_and(|key| !key.trim().is_empty()) {
        "environment"
    } else if config
        .pexels
        .api_key
        .as_deref()
        .is_some_and(|key| !key.trim().is_empty())
    {
        "config file"
    } else {
        "<not set>"
    }
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(secret) if secret.len() > 8 => {
            let suffix = secret.get(secret.len() - 4..).unwrap_or_default();
            format!("****{suffix}")
        }
        Some(secret) if !secret.is_empty() => "****".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(&None), "<not set>");
        assert_eq!(mask_secret(&Some("short".to_string())), "****");
        assert_eq!(
            mask_secret(&Some("abcdefghijkl1234".to_string())),
            "****1234"
        );
    }

    #[test]
    fn test_blank_config_key_is_not_set() {
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        let mut config = Config::default();
        config.pexels.api_key = Some("   ".to_string());
        assert_eq!(key_source(&config), "<not set>");

        config.pexels.api_key = Some("abcdefghijkl1234".to_string());
        assert_eq!(key_source(&config), "config file");
    }
}
