//! Encoder invocation: merges a stock asset with an audio track via FFmpeg.

use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};
use which::which;

pub mod compose;
pub mod error;
pub mod probe;

pub use compose::{
    format_seconds, landscape_args, reel_args, Codecs, LengthPlan, ReelFormat, ReelGeometry,
    RenderJob, REEL_HEIGHT, REEL_WIDTH,
};
pub use error::{MediaError, MediaResult};
pub use probe::MediaInfo;

use crate::config::EncoderConfig;
use crate::pexels::MediaKind;

/// Resolved ffmpeg/ffprobe binaries plus codec choice.
#[derive(Debug, Clone)]
pub struct Encoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    codecs: Codecs,
}

impl Encoder {
    pub fn new(ffmpeg: PathBuf, ffprobe: PathBuf, codecs: Codecs) -> Self {
        Self {
            ffmpeg,
            ffprobe,
            codecs,
        }
    }

    /// Locate the binaries named in config, or on PATH.
    pub fn from_config(config: &EncoderConfig) -> MediaResult<Self> {
        let ffmpeg = locate_tool(config.ffmpeg.as_deref(), "ffmpeg")?;
        let ffprobe = locate_tool(config.ffprobe.as_deref(), "ffprobe")?;
        debug!("Using ffmpeg at {:?}, ffprobe at {:?}", ffmpeg, ffprobe);
        Ok(Self::new(
            ffmpeg,
            ffprobe,
            Codecs {
                video: config.video_codec.clone(),
                audio: config.audio_codec.clone(),
            },
        ))
    }

    pub async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        probe::probe(&self.ffprobe, path).await
    }

    pub async fn probe_duration(&self, path: &Path) -> MediaResult<Option<f64>> {
        probe::probe_duration(&self.ffprobe, path).await
    }

    /// Render `job` and verify the output file exists.
    pub async fn render(&self, job: &RenderJob) -> MediaResult<()> {
        let args = match job.format {
            ReelFormat::Landscape => landscape_args(job, &self.codecs),
            ReelFormat::Reel => {
                let source = self.probe(&job.asset).await?;
                log_length_plan(job, &source);
                if let Ok(Some(audio_len)) = self.probe_duration(&job.audio).await {
                    if audio_len < job.duration {
                        warn!(
                            "Audio is {:.2} sec, shorter than the {} sec reel; the end will be silent",
                            audio_len,
                            format_seconds(job.duration)
                        );
                    }
                }
                reel_args(job, &self.codecs, &source)
            }
        };

        debug!("Running {:?} {:?}", self.ffmpeg, args);
        let output = Command::new(&self.ffmpeg)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin"])
            .args(&args)
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::ffmpeg_failed(
                output.status.code(),
                &output.stderr,
            ));
        }

        if !job.output.exists() {
            return Err(MediaError::MissingOutput(job.output.clone()));
        }

        info!("Rendered {:?}", job.output);
        Ok(())
    }
}

fn log_length_plan(job: &RenderJob, source: &MediaInfo) {
    if job.kind == MediaKind::Image {
        info!(
            "Holding image for {} sec on a {}x{} canvas",
            format_seconds(job.duration),
            REEL_WIDTH,
            REEL_HEIGHT
        );
        return;
    }
    match LengthPlan::for_asset(source.duration, job.duration) {
        LengthPlan::Trim { from, to } => {
            info!("Trimming video from {:.2} sec to {:.2} sec", from, to)
        }
        LengthPlan::Loop { from, to } => {
            info!("Looping video to fill {:.2} sec (original {:.2} sec)", to, from)
        }
        LengthPlan::Exact => debug!("Video already matches the target duration"),
        LengthPlan::Unknown => info!(
            "Video length unknown, looping up to {} sec",
            format_seconds(job.duration)
        ),
    }
}

fn locate_tool(configured: Option<&str>, name: &str) -> MediaResult<PathBuf> {
    let candidate = configured.unwrap_or(name);
    which(candidate).map_err(|_| MediaError::ToolNotFound(candidate.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configured_tool() {
        let config = EncoderConfig {
            ffmpeg: Some("/nonexistent/bin/ffmpeg-reelgen".to_string()),
            ..Default::default()
        };
        match Encoder::from_config(&config) {
            Err(MediaError::ToolNotFound(name)) => {
                assert_eq!(name, "/nonexistent/bin/ffmpeg-reelgen")
            }
            other => panic!("expected ToolNotFound, got {other:?}"),
        }
    }
}
