//! Error types for encoder invocation.

use std::path::PathBuf;
use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error(
        "{0} not found.\n\
         Install FFmpeg:\n\
         - macOS: brew install ffmpeg\n\
         - Ubuntu/Debian: sudo apt install ffmpeg\n\
         - Arch: sudo pacman -S ffmpeg\n\
         - Windows: winget install ffmpeg"
    )]
    ToolNotFound(String),

    #[error("FFmpeg failed (exit code {exit_code:?}): {stderr}")]
    FfmpegFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("FFprobe failed on {path:?}: {stderr}")]
    ProbeFailed { path: PathBuf, stderr: String },

    #[error("Could not read video dimensions from {0:?}")]
    MissingDimensions(PathBuf),

    #[error("FFmpeg did not produce output file {0:?}")]
    MissingOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Build an FFmpeg failure, keeping only the tail of stderr.
    pub fn ffmpeg_failed(exit_code: Option<i32>, stderr: &[u8]) -> Self {
        Self::FfmpegFailed {
            exit_code,
            stderr: stderr_tail(stderr, 15),
        }
    }
}

/// Last `lines` non-empty lines of a process' stderr.
pub fn stderr_tail(stderr: &[u8], lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let kept: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = kept.len().saturating_sub(lines);
    kept[start..].join("\n")
}
