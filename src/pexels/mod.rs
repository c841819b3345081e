//! HTTP client for the Pexels stock media search API.

use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub mod error;
pub mod types;

pub use error::{PexelsError, PexelsResult};
pub use types::{
    MediaKind, MediaOption, Photo, PhotoSearchResponse, PhotoSource, Video, VideoFile,
    VideoSearchResponse,
};

use crate::config::PexelsConfig;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 500;
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Client for the Pexels video and photo search endpoints.
pub struct PexelsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PexelsClient {
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> PexelsResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        info!("Initialized Pexels client with base URL: {}", base_url);

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
        })
    }

    /// Build a client from config, failing when no API key is available.
    pub fn from_config(config: &PexelsConfig) -> PexelsResult<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or(PexelsError::MissingApiKey)?;
        Self::new(
            api_key,
            &config.api_base,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn videos_url(&self) -> String {
        format!("{}/videos/search", self.base_url)
    }

    pub fn photos_url(&self) -> String {
        format!("{}/v1/search", self.base_url)
    }

    pub async fn search_videos(&self, query: &str, per_page: u32) -> PexelsResult<Vec<Video>> {
        info!("Fetching videos for '{}' from Pexels", query);
        let response: VideoSearchResponse =
            self.get_json(&self.videos_url(), query, per_page).await?;
        debug!(
            "Pexels returned {} of {} videos",
            response.videos.len(),
            response.total_results
        );
        Ok(response.videos)
    }

    pub async fn search_photos(&self, query: &str, per_page: u32) -> PexelsResult<Vec<Photo>> {
        info!("Fetching photos for '{}' from Pexels", query);
        let response: PhotoSearchResponse =
            self.get_json(&self.photos_url(), query, per_page).await?;
        debug!(
            "Pexels returned {} of {} photos",
            response.photos.len(),
            response.total_results
        );
        Ok(response.photos)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &str,
        per_page: u32,
    ) -> PexelsResult<T> {
        let mut attempt = 1;
        loop {
            match self.get_once(url, query, per_page).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                    let delay = retry_delay(&err, attempt);
                    warn!(
                        "Pexels request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt, MAX_ATTEMPTS, err, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &str,
        per_page: u32,
    ) -> PexelsResult<T> {
        let per_page = per_page.to_string();
        let response = self
            .client
            .get(url)
            .header("Authorization", &self.api_key)
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PexelsError::from_status(status.as_u16(), body, retry_after));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// A stock media search backend.
pub trait MediaSearch: Send + Sync {
    fn name(&self) -> &'static str;

    fn search_videos<'a>(
        &'a self,
        query: &'a str,
        per_page: u32,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Video>>> + Send + 'a>>;

    fn search_photos<'a>(
        &'a self,
        query: &'a str,
        per_page: u32,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Photo>>> + Send + 'a>>;
}

impl MediaSearch for PexelsClient {
    fn name(&self) -> &'static str {
        "pexels"
    }

    fn search_videos<'a>(
        &'a self,
        query: &'a str,
        per_page: u32,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Video>>> + Send + 'a>> {
        Box::pin(async move { Ok(PexelsClient::search_videos(self, query, per_page).await?) })
    }

    fn search_photos<'a>(
        &'a self,
        query: &'a str,
        per_page: u32,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Photo>>> + Send + 'a>> {
        Box::pin(async move { Ok(PexelsClient::search_photos(self, query, per_page).await?) })
    }
}

/// Delay before the next attempt: the server's Retry-After when given
/// (capped), otherwise exponential from the base.
fn retry_delay(err: &PexelsError, attempt: u32) -> Duration {
    if let PexelsError::RateLimited {
        retry_after: Some(secs),
    } = err
    {
        if *secs > MAX_RETRY_AFTER_SECS {
            warn!(
                "Pexels asked to wait {} sec, waiting {} sec instead",
                secs, MAX_RETRY_AFTER_SECS
            );
            return Duration::from_secs(MAX_RETRY_AFTER_SECS);
        }
        return Duration::from_secs(*secs);
    }
    Duration::from_millis(BACKOFF_BASE_MS * 2u64.pow(attempt - 1))
}
