//! FFprobe wrappers for asset dimensions and duration.

use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use super::error::{MediaError, MediaResult};

/// What the encoder needs to know about an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    /// Seconds. Absent for still images.
    pub duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Run ffprobe on `path` and return its first video stream's geometry.
pub async fn probe(ffprobe: &Path, path: &Path) -> MediaResult<MediaInfo> {
    let output = Command::new(ffprobe)
        .args(["-v", "error"])
        .args(["-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height:format=duration"])
        .args(["-of", "json"])
        .arg(path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ProbeFailed {
            path: path.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let info = parse_probe_output(&output.stdout, path)?;
    debug!("Probed {:?}: {:?}", path, info);
    Ok(info)
}

/// Duration in seconds of any input, audio included.
pub async fn probe_duration(ffprobe: &Path, path: &Path) -> MediaResult<Option<f64>> {
    let output = Command::new(ffprobe)
        .args(["-v", "error"])
        .args(["-show_entries", "format=duration"])
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ProbeFailed {
            path: path.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(parse_seconds(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_probe_output(stdout: &[u8], path: &Path) -> MediaResult<MediaInfo> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout)?;
    let stream = parsed
        .streams
        .into_iter()
        .find(|s| s.width.is_some() && s.height.is_some())
        .ok_or_else(|| MediaError::MissingDimensions(path.to_path_buf()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(MediaError::MissingDimensions(path.to_path_buf())),
    };

    let duration = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| parse_seconds(&d));

    Ok(MediaInfo {
        width,
        height,
        duration,
    })
}

/// ffprobe prints "N/A" for inputs without a duration.
fn parse_seconds(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs > 0.0)
}
