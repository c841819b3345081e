//! Streaming download of a selected stock asset.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Download `url` into `destination`, chunk by chunk.
///
/// Returns the number of bytes written. A progress bar is drawn on stderr
/// when `show_progress` is set.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    destination: &Path,
    show_progress: bool,
) -> Result<u64> {
    info!("Downloading {} to {:?}", url, destination);

    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to request {url}"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Download of {} failed with status {}", url, status);
    }

    let pb = show_progress.then(|| create_progress_bar(response.content_length()));

    let mut file = File::create(destination)
        .await
        .with_context(|| format!("Failed to create {}", destination.display()))?;

    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Download interrupted")?
    {
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        written += chunk.len() as u64;
        if let Some(pb) = &pb {
            pb.set_position(written);
        }
    }
    file.flush().await?;

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    if written == 0 {
        bail!("Download of {} returned an empty body", url);
    }

    debug!("Wrote {} bytes to {:?}", written, destination);
    Ok(written)
}

fn create_progress_bar(total: Option<u64>) -> ProgressBar {
    let pb = match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("━╸━"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    };
    pb.set_message("Downloading...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
