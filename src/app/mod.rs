//! Reel pipeline: search, choose, download, render.
//!
//! This module holds the business logic shared by every CLI entry point.
//! Prompts live in the `cli` module; the pipeline only asks a
//! [`MediaChooser`] to pick one of the options it found.

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{AssetCache, SearchCache};
use crate::config::Config;
use crate::download::download_to_file;
use crate::media::{Encoder, ReelFormat, RenderJob};
use crate::pexels::{MediaKind, MediaOption, MediaSearch, PexelsClient, PexelsError};

pub const LANDSCAPE_MIN_SECS: u32 = 5;
pub const LANDSCAPE_MAX_SECS: u32 = 60;
pub const REEL_MAX_SECS: f64 = 600.0;
/// Shortest reel ffmpeg's `-t` can express at millisecond precision.
pub const REEL_MIN_SECS: f64 = 0.001;

/// One render request, fully resolved.
#[derive(Debug, Clone)]
pub struct ReelRequest {
    pub audio: PathBuf,
    /// Seconds.
    pub duration: f64,
    pub format: ReelFormat,
    pub kind: MediaKind,
    pub query: String,
    pub cache_only: bool,
    pub output: PathBuf,
}

/// Picks one search result. Returns a zero-based index into `options`.
pub trait MediaChooser {
    fn choose(&mut self, options: &[MediaOption]) -> Result<usize>;
}

impl<F> MediaChooser for F
where
    F: FnMut(&[MediaOption]) -> Result<usize>,
{
    fn choose(&mut self, options: &[MediaOption]) -> Result<usize> {
        self(options)
    }
}

/// Results per page requested from the search backend.
#[derive(Debug, Clone, Copy)]
pub struct PageSizes {
    pub landscape: u32,
    pub reel: u32,
}

impl PageSizes {
    pub fn for_format(&self, format: ReelFormat) -> u32 {
        match format {
            ReelFormat::Landscape => self.landscape,
            ReelFormat::Reel => self.reel,
        }
    }
}

pub struct Pipeline {
    /// `None` when no API key is configured; cached results still work.
    search: Option<Box<dyn MediaSearch>>,
    cache: Option<SearchCache>,
    assets: Option<AssetCache>,
    http: reqwest::Client,
    page_sizes: PageSizes,
    show_progress: bool,
    scratch_root: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(
        search: Box<dyn MediaSearch>,
        cache: Option<SearchCache>,
        assets: Option<AssetCache>,
        page_sizes: PageSizes,
    ) -> Self {
        Self::with_backend(Some(search), cache, assets, page_sizes)
    }

    fn with_backend(
        search: Option<Box<dyn MediaSearch>>,
        cache: Option<SearchCache>,
        assets: Option<AssetCache>,
        page_sizes: PageSizes,
    ) -> Self {
        Self {
            search,
            cache,
            assets,
            http: reqwest::Client::new(),
            page_sizes,
            show_progress: false,
            scratch_root: None,
        }
    }

    /// Build from config. A missing API key is only an error once a search
    /// has to reach the API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let search: Option<Box<dyn MediaSearch>> = match PexelsClient::from_config(&config.pexels)
        {
            Ok(client) => Some(Box::new(client)),
            Err(PexelsError::MissingApiKey) => {
                debug!("No Pexels API key configured, only cached results are available");
                None
            }
            Err(err) => return Err(err.into()),
        };
        let cache = if config.cache.enabled {
            Some(SearchCache::load(config.cache.search_file_path()?)?)
        } else {
            None
        };
        let assets = if config.cache.keep_assets {
            Some(AssetCache::new(config.cache.asset_dir_path()?))
        } else {
            None
        };
        let mut pipeline = Self::with_backend(
            search,
            cache,
            assets,
            PageSizes {
                landscape: config.pexels.landscape_per_page,
                reel: config.pexels.reel_per_page,
            },
        );
        pipeline.http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.pexels.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(pipeline)
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Create per-run work directories under `root` instead of the system
    /// temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    fn backend(&self) -> Result<&dyn MediaSearch> {
        self.search
            .as_deref()
            .ok_or_else(|| PexelsError::MissingApiKey.into())
    }

    /// Search for assets, consulting the cache first for videos.
    pub async fn find_options(
        &mut self,
        query: &str,
        kind: MediaKind,
        format: ReelFormat,
        cache_only: bool,
    ) -> Result<Vec<MediaOption>> {
        let query = query.trim();
        if query.is_empty() {
            bail!("Search query is empty");
        }
        let per_page = self.page_sizes.for_format(format);

        match kind {
            MediaKind::Image => {
                if cache_only {
                    bail!("Cached results are only kept for video searches");
                }
                let photos = self.backend()?.search_photos(query, per_page).await?;
                Ok(MediaOption::from_photos(&photos))
            }
            MediaKind::Video => {
                if let Some(entry) = self.cache.as_ref().and_then(|c| c.get(query)) {
                    info!("Using cached results for '{}'", query);
                    return Ok(MediaOption::from_videos(&entry.videos));
                }

                if cache_only {
                    info!(
                        "No cached results found for '{}'. Skipping API call.",
                        query
                    );
                    return Ok(Vec::new());
                }

                let backend = self.backend()?;
                info!("Fetching new videos for '{}' from {}", query, backend.name());
                let videos = backend.search_videos(query, per_page).await?;

                if let Some(cache) = self.cache.as_mut() {
                    if let Err(err) = cache.insert(query, videos.clone()) {
                        warn!("Failed to update search cache: {err:#}");
                    }
                }

                Ok(MediaOption::from_videos(&videos))
            }
        }
    }

    /// Put the chosen asset in `workdir`, or reuse a cached copy.
    pub async fn fetch_asset(&self, option: &MediaOption, workdir: &Path) -> Result<PathBuf> {
        let extension = option.kind.extension();

        if let Some(assets) = &self.assets {
            if let Some(cached) = assets.lookup(&option.download_url, extension) {
                info!("Reusing cached asset {:?}", cached);
                return Ok(cached);
            }
        }

        let destination = workdir.join(format!("asset.{extension}"));
        download_to_file(
            &self.http,
            &option.download_url,
            &destination,
            self.show_progress,
        )
        .await?;

        if let Some(assets) = &self.assets {
            match assets.store(&option.download_url, extension, &destination) {
                Ok(stored) => info!("Stored asset in {:?}", stored),
                Err(err) => warn!("Failed to keep downloaded asset: {err:#}"),
            }
        }

        Ok(destination)
    }

    /// Full run: search, choose, download, render. Returns the output path.
    ///
    /// The downloaded asset lives in a temporary directory that is removed
    /// when this returns, whether rendering succeeded or not.
    pub async fn run(
        &mut self,
        encoder: &Encoder,
        request: &ReelRequest,
        chooser: &mut dyn MediaChooser,
    ) -> Result<PathBuf> {
        validate_audio(&request.audio)?;
        validate_duration(request.format, request.duration)?;

        info!("Searching for {}s related to: {}", request.kind, request.query);
        let options = self
            .find_options(
                &request.query,
                request.kind,
                request.format,
                request.cache_only,
            )
            .await?;

        if options.is_empty() {
            bail!("No media found for '{}'", request.query);
        }

        let index = chooser.choose(&options)?;
        let option = options
            .get(index)
            .ok_or_else(|| anyhow!("Invalid selection: {}", index.saturating_add(1)))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("reelgen-");
        let workdir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context("Failed to create temporary directory")?;

        let asset = self.fetch_asset(option, workdir.path()).await?;

        if let Some(parent) = request.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let job = RenderJob {
            asset,
            kind: option.kind,
            audio: request.audio.clone(),
            duration: request.duration,
            output: request.output.clone(),
            format: request.format,
        };
        let spinner = self.show_progress.then(encode_spinner);
        let rendered = encoder.render(&job).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        rendered?;

        Ok(request.output.clone())
    }
}

fn encode_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Encoding...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// The audio track must be an existing file.
pub fn validate_audio(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Audio file not found: {}", path.display());
    }
    Ok(())
}

/// Landscape takes whole seconds in 5..=60; reel takes any length from one
/// millisecond up to ten minutes.
pub fn validate_duration(format: ReelFormat, seconds: f64) -> Result<f64> {
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("Invalid duration: {seconds}. Enter a positive number of seconds.");
    }
    match format {
        ReelFormat::Landscape => {
            if seconds.fract() != 0.0 {
                bail!("Invalid duration: {seconds}. Enter a whole number of seconds.");
            }
            let whole = seconds as u32;
            if !(LANDSCAPE_MIN_SECS..=LANDSCAPE_MAX_SECS).contains(&whole) {
                bail!(
                    "Invalid duration. Please enter a value between {} and {}.",
                    LANDSCAPE_MIN_SECS,
                    LANDSCAPE_MAX_SECS
                );
            }
        }
        ReelFormat::Reel => {
            if seconds > REEL_MAX_SECS {
                bail!("Invalid duration: reels are limited to {REEL_MAX_SECS} seconds.");
            }
            if seconds < REEL_MIN_SECS {
                bail!("Invalid duration: reels must be at least {REEL_MIN_SECS} seconds.");
            }
        }
    }
    Ok(seconds)
}

/// Convert a 1-based menu choice into an index.
pub fn selection_index(choice: usize, len: usize) -> Result<usize> {
    if choice < 1 || choice > len {
        bail!("Invalid selection: {choice}. Choose a number between 1 and {len}.");
    }
    Ok(choice - 1)
}
