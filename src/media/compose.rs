//! FFmpeg argument construction for the two output formats.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use super::probe::MediaInfo;
use crate::pexels::MediaKind;

pub const REEL_WIDTH: u32 = 1080;
pub const REEL_HEIGHT: u32 = 1920;
pub const LANDSCAPE_IMAGE_FILTER: &str = "scale=1280:720,format=yuv420p";

/// Output layout of the rendered video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReelFormat {
    /// Keep the asset's frame (images scaled to 1280x720), stop at the shorter input
    Landscape,
    /// Vertical 1080x1920 canvas, asset trimmed or looped to the exact duration
    Reel,
}

impl fmt::Display for ReelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landscape => f.write_str("landscape"),
            Self::Reel => f.write_str("reel"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Codecs {
    pub video: String,
    pub audio: String,
}

impl Default for Codecs {
    fn default() -> Self {
        Self {
            video: "libx264".to_string(),
            audio: "aac".to_string(),
        }
    }
}

/// Everything needed to render one output file.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub asset: PathBuf,
    pub kind: MediaKind,
    pub audio: PathBuf,
    /// Target length in seconds.
    pub duration: f64,
    pub output: PathBuf,
    pub format: ReelFormat,
}

/// How an asset's length relates to the target duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthPlan {
    Trim { from: f64, to: f64 },
    Loop { from: f64, to: f64 },
    Exact,
    /// Still images and inputs whose length could not be probed.
    Unknown,
}

impl LengthPlan {
    pub fn for_asset(asset_duration: Option<f64>, target: f64) -> Self {
        match asset_duration {
            Some(d) if d > target => Self::Trim { from: d, to: target },
            Some(d) if d < target => Self::Loop { from: d, to: target },
            Some(_) => Self::Exact,
            None => Self::Unknown,
        }
    }

    fn needs_loop(&self) -> bool {
        matches!(self, Self::Loop { .. } | Self::Unknown)
    }
}

/// Scaled size of a source frame on the vertical canvas.
///
/// Landscape sources are scaled to the canvas height, everything else to the
/// canvas width. Whatever then overflows the canvas is cropped around the
/// centre; whatever falls short is padded with black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReelGeometry {
    pub scaled_width: u32,
    pub scaled_height: u32,
}

impl ReelGeometry {
    pub fn for_source(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        if height < width {
            Self {
                scaled_width: round_even(w * REEL_HEIGHT as f64 / h),
                scaled_height: REEL_HEIGHT,
            }
        } else {
            Self {
                scaled_width: REEL_WIDTH,
                scaled_height: round_even(h * REEL_WIDTH as f64 / w),
            }
        }
    }

    pub fn filter(&self) -> String {
        let mut parts = vec![format!("scale={}:{}", self.scaled_width, self.scaled_height)];
        if self.scaled_width > REEL_WIDTH || self.scaled_height > REEL_HEIGHT {
            parts.push(format!(
                "crop={}:{}",
                self.scaled_width.min(REEL_WIDTH),
                self.scaled_height.min(REEL_HEIGHT)
            ));
        }
        parts.push(format!(
            "pad={REEL_WIDTH}:{REEL_HEIGHT}:(ow-iw)/2:(oh-ih)/2:color=black"
        ));
        parts.push("setsar=1".to_string());
        parts.push("format=yuv420p".to_string());
        parts.join(",")
    }
}

/// Libx264 with yuv420p needs even dimensions.
fn round_even(value: f64) -> u32 {
    let rounded = (value / 2.0).round() as u32 * 2;
    rounded.max(2)
}

/// Render seconds for ffmpeg's `-t`, without a trailing ".0" for whole values.
pub fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{}", seconds as u64)
    } else {
        let text = format!("{:.3}", seconds);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Arguments for the landscape format: asset and audio muxed, cut at the
/// shorter of the two or the requested duration.
pub fn landscape_args(job: &RenderJob, codecs: &Codecs) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into()];
    if job.kind == MediaKind::Image {
        push_flag(&mut args, "-loop", "1");
    }
    push_flag(&mut args, "-i", &job.asset);
    push_flag(&mut args, "-i", &job.audio);
    push_flag(&mut args, "-t", format_seconds(job.duration));
    if job.kind == MediaKind::Image {
        push_flag(&mut args, "-vf", LANDSCAPE_IMAGE_FILTER);
    }
    push_codecs_and_maps(&mut args, codecs);
    args.push("-shortest".into());
    args.push(job.output.clone().into_os_string());
    args
}

/// Arguments for the vertical reel format.
pub fn reel_args(job: &RenderJob, codecs: &Codecs, source: &MediaInfo) -> Vec<OsString> {
    let geometry = ReelGeometry::for_source(source.width, source.height);
    let plan = match job.kind {
        MediaKind::Video => LengthPlan::for_asset(source.duration, job.duration),
        MediaKind::Image => LengthPlan::Unknown,
    };

    let mut args: Vec<OsString> = vec!["-y".into()];
    match job.kind {
        MediaKind::Image => push_flag(&mut args, "-loop", "1"),
        MediaKind::Video if plan.needs_loop() => push_flag(&mut args, "-stream_loop", "-1"),
        MediaKind::Video => {}
    }
    push_flag(&mut args, "-i", &job.asset);
    push_flag(&mut args, "-i", &job.audio);
    push_flag(&mut args, "-t", format_seconds(job.duration));
    push_flag(&mut args, "-vf", geometry.filter());
    push_codecs_and_maps(&mut args, codecs);
    args.push(job.output.clone().into_os_string());
    args
}

fn push_flag(args: &mut Vec<OsString>, flag: &str, value: impl AsRef<OsStr>) {
    args.push(flag.into());
    args.push(value.as_ref().to_os_string());
}

fn push_codecs_and_maps(args: &mut Vec<OsString>, codecs: &Codecs) {
    push_flag(args, "-c:v", &codecs.video);
    push_flag(args, "-c:a", &codecs.audio);
    push_flag(args, "-map", "0:v:0");
    push_flag(args, "-map", "1:a:0");
}
