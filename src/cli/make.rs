//! CLI handler for building a reel.
//!
//! Collects whatever the flags left open through interactive prompts, then
//! hands a resolved request to the `app` pipeline.

use anyhow::{anyhow, bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::app::{self, Pipeline, ReelRequest};
use crate::cli::args::MakeCliArgs;
use crate::config::Config;
use crate::media::{Encoder, ReelFormat};
use crate::pexels::{MediaKind, MediaOption};
use crate::themes::{self, LANDSCAPE_THEMES, REEL_THEMES};

pub async fn handle_make_command(args: MakeCliArgs) -> Result<()> {
    let config = Config::load()?;
    let prompter = Prompter::detect();

    // Fail early on a missing encoder, before any network traffic.
    let encoder = Encoder::from_config(&config.encoder)?;

    let audio = match &args.audio {
        Some(path) => path.clone(),
        None => PathBuf::from(prompter.text("Enter the path of the audio file", "--audio")?),
    };
    app::validate_audio(&audio)?;

    let format = match args.format {
        Some(format) => format,
        None => prompter.format()?,
    };

    let (kind, query, cache_only, duration) = match format {
        ReelFormat::Landscape => {
            let duration = match args.duration {
                Some(secs) => secs,
                None => prompter
                    .text("Enter the reel duration (5-60 seconds)", "--duration")?
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| anyhow!("Invalid duration. Please enter a value between 5 and 60."))?
                    as f64,
            };
            app::validate_duration(format, duration)?;

            let kind = match args.media {
                Some(kind) => kind,
                None => prompter.media_kind()?,
            };
            let query = match (&args.query, &args.theme) {
                (Some(query), _) => query.clone(),
                (None, Some(theme)) => themes::landscape_theme(theme)
                    .ok_or_else(|| anyhow!("Invalid theme selection: {theme}"))?
                    .to_string(),
                (None, None) => prompter.landscape_theme()?.to_string(),
            };
            (kind, query, args.cache_only, duration)
        }
        ReelFormat::Reel => {
            let kind = args.media.unwrap_or(MediaKind::Video);
            let query = match (&args.query, &args.theme) {
                (Some(query), _) => query.clone(),
                (None, Some(theme)) => reel_query(theme, &audio),
                (None, None) => {
                    let choice = prompter.reel_theme_choice()?;
                    reel_query(&choice, &audio)
                }
            };
            println!("\nSearching for videos related to: {query}");

            let cache_only = args.cache_only
                || (kind == MediaKind::Video
                    && config.cache.enabled
                    && args.pick.is_none()
                    && prompter.confirm("Do you want to use only cached results?", false)?);

            let duration = match args.duration {
                Some(secs) => secs,
                None => prompter
                    .text(
                        "Enter the desired duration (in seconds) for the output video",
                        "--duration",
                    )?
                    .trim()
                    .parse::<f64>()
                    .context("Invalid duration")?,
            };
            app::validate_duration(format, duration)?;
            (kind, query, cache_only, duration)
        }
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config, format));
    if output.exists() {
        warn!("Overwriting existing file {}", output.display());
    }

    let request = ReelRequest {
        audio,
        duration,
        format,
        kind,
        query,
        cache_only,
        output,
    };

    let show_progress = !args.no_progress && io::stderr().is_terminal();
    let mut pipeline = Pipeline::from_config(&config)?.with_progress(show_progress);

    let pick = args.pick;
    let mut chooser = |options: &[MediaOption]| -> Result<usize> {
        match pick {
            Some(choice) => app::selection_index(choice, options.len()),
            None => prompter.choose_media(options),
        }
    };

    let saved = pipeline.run(&encoder, &request, &mut chooser).await?;

    println!();
    println!("Reel generated successfully! Saved as {}", saved.display());
    Ok(())
}

/// Reel query: a theme number or name, otherwise words from the audio file name.
fn reel_query(choice: &str, audio: &Path) -> String {
    if let Some(theme) = themes::reel_theme(choice) {
        return theme.to_string();
    }
    let lowered = choice.trim().to_lowercase();
    if let Some((_, theme)) = REEL_THEMES.iter().find(|(_, theme)| *theme == lowered) {
        return theme.to_string();
    }
    let keywords = themes::keywords_from_filename(audio);
    info!("No theme chosen, searching by audio file name: '{}'", keywords);
    keywords
}

fn default_output(config: &Config, format: ReelFormat) -> PathBuf {
    let file = match format {
        ReelFormat::Landscape => &config.output.landscape_file,
        ReelFormat::Reel => &config.output.reel_file,
    };
    config.output.directory.join(file)
}

/// Terminal prompts, refusing to block when stdin is not a TTY.
struct Prompter {
    interactive: bool,
    theme: ColorfulTheme,
}

impl Prompter {
    fn detect() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
            theme: ColorfulTheme::default(),
        }
    }

    fn require_tty(&self, flag: &str) -> Result<()> {
        if !self.interactive {
            bail!("Non-interactive session: pass {flag} to answer this prompt");
        }
        Ok(())
    }

    fn text(&self, prompt: &str, flag: &str) -> Result<String> {
        self.require_tty(flag)?;
        let value: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact_text()?;
        Ok(value.trim().to_string())
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if !self.interactive {
            return Ok(default);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn format(&self) -> Result<ReelFormat> {
        self.require_tty("--format")?;
        let options = [
            "Reel (vertical 1080x1920, trimmed or looped to length)",
            "Landscape (video or image, 5-60 seconds)",
        ];
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Which format do you want?")
            .items(&options)
            .default(0)
            .interact()?;
        Ok(if selection == 0 {
            ReelFormat::Reel
        } else {
            ReelFormat::Landscape
        })
    }

    fn media_kind(&self) -> Result<MediaKind> {
        self.require_tty("--media")?;
        let options = ["video", "image"];
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Do you want a 'video' or 'image' theme?")
            .items(&options)
            .default(0)
            .interact()?;
        Ok(if selection == 0 {
            MediaKind::Video
        } else {
            MediaKind::Image
        })
    }

    fn landscape_theme(&self) -> Result<&'static str> {
        self.require_tty("--theme")?;
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Choose a theme")
            .items(&LANDSCAPE_THEMES)
            .default(0)
            .interact()?;
        Ok(LANDSCAPE_THEMES[selection])
    }

    fn reel_theme_choice(&self) -> Result<String> {
        self.require_tty("--theme")?;
        println!("\nSelect a theme for your video:");
        for (key, theme) in REEL_THEMES {
            println!("{}. {}", key, themes::display_name(theme));
        }
        println!();
        let value: String = Input::with_theme(&self.theme)
            .with_prompt("Enter the number of your chosen theme (or press Enter to use audio filename)")
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    }

    fn choose_media(&self, options: &[MediaOption]) -> Result<usize> {
        self.require_tty("--pick")?;
        let labels: Vec<String> = options.iter().map(MediaOption::label).collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Select the media you want to use")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(selection)
    }
}
