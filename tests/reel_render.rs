//! Integration tests for rendering through FFmpeg.
//!
//! ## Prerequisites
//! - FFmpeg and FFprobe must be installed (tests skip otherwise)
//!
//! Source clips are generated with FFmpeg's lavfi test sources, so no
//! fixtures or network access are needed.

use reelgen::media::{Encoder, MediaInfo, ReelFormat, RenderJob};
use reelgen::pexels::MediaKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ffmpeg_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

fn encoder() -> Encoder {
    Encoder::new(
        PathBuf::from("ffmpeg"),
        PathBuf::from("ffprobe"),
        Default::default(),
    )
}

fn generate(args: &[&str], output: &Path) {
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y"])
        .args(args)
        .arg(output)
        .status()
        .unwrap();
    assert!(status.success(), "failed to generate {}", output.display());
}

fn test_video(dir: &TempDir, width: u32, height: u32, seconds: u32) -> PathBuf {
    let path = dir.path().join(format!("clip_{width}x{height}_{seconds}s.mp4"));
    let source = format!("testsrc=size={width}x{height}:rate=25:duration={seconds}");
    generate(
        &["-f", "lavfi", "-i", &source, "-pix_fmt", "yuv420p", "-c:v", "libx264"],
        &path,
    );
    path
}

fn test_image(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("still.jpg");
    generate(
        &["-f", "lavfi", "-i", "testsrc=size=800x600:duration=1", "-frames:v", "1"],
        &path,
    );
    path
}

fn test_audio(dir: &TempDir, seconds: u32) -> PathBuf {
    let path = dir.path().join(format!("tone_{seconds}s.m4a"));
    let source = format!("sine=frequency=440:duration={seconds}");
    generate(&["-f", "lavfi", "-i", &source, "-c:a", "aac"], &path);
    path
}

async fn probe(path: &Path) -> MediaInfo {
    encoder().probe(path).await.unwrap()
}

#[tokio::test]
async fn test_reel_loops_short_landscape_clip_to_vertical() {
    if !ffmpeg_available() {
        eprintln!("Skipping: FFmpeg not installed");
        return;
    }

    let dir = TempDir::new().unwrap();
    let job = RenderJob {
        asset: test_video(&dir, 640, 360, 2),
        kind: MediaKind::Video,
        audio: test_audio(&dir, 10),
        duration: 5.0,
        output: dir.path().join("reel.mp4"),
        format: ReelFormat::Reel,
    };

    encoder().render(&job).await.unwrap();

    let info = probe(&job.output).await;
    assert_eq!((info.width, info.height), (1080, 1920));
    let duration = info.duration.unwrap();
    assert!(
        (duration - 5.0).abs() < 0.5,
        "expected ~5s output, got {duration}"
    );
}

#[tokio::test]
async fn test_reel_trims_long_clip() {
    if !ffmpeg_available() {
        eprintln!("Skipping: FFmpeg not installed");
        return;
    }

    let dir = TempDir::new().unwrap();
    let job = RenderJob {
        asset: test_video(&dir, 360, 640, 6),
        kind: MediaKind::Video,
        audio: test_audio(&dir, 6),
        duration: 2.5,
        output: dir.path().join("reel.mp4"),
        format: ReelFormat::Reel,
    };

    encoder().render(&job).await.unwrap();

    let info = probe(&job.output).await;
    assert_eq!((info.width, info.height), (1080, 1920));
    assert!((info.duration.unwrap() - 2.5).abs() < 0.5);
}

#[tokio::test]
async fn test_landscape_image_is_scaled_to_720p() {
    if !ffmpeg_available() {
        eprintln!("Skipping: FFmpeg not installed");
        return;
    }

    let dir = TempDir::new().unwrap();
    let job = RenderJob {
        asset: test_image(&dir),
        kind: MediaKind::Image,
        audio: test_audio(&dir, 3),
        duration: 5.0,
        output: dir.path().join("final_reel.mp4"),
        format: ReelFormat::Landscape,
    };

    encoder().render(&job).await.unwrap();

    let info = probe(&job.output).await;
    assert_eq!((info.width, info.height), (1280, 720));
    // -shortest stops at the 3s audio track.
    assert!(info.duration.unwrap() < 4.0);
}

#[tokio::test]
async fn test_render_failure_surfaces_stderr() {
    if !ffmpeg_available() {
        eprintln!("Skipping: FFmpeg not installed");
        return;
    }

    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("not_a_video.mp4");
    std::fs::write(&bogus, b"definitely not a video").unwrap();

    let job = RenderJob {
        asset: bogus,
        kind: MediaKind::Video,
        audio: test_audio(&dir, 2),
        duration: 2.0,
        output: dir.path().join("out.mp4"),
        format: ReelFormat::Landscape,
    };

    let err = encoder().render(&job).await.unwrap_err();
    assert!(err.to_string().starts_with("FFmpeg failed"));
}
