//! Response types for the Pexels video and photo search endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which kind of asset to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }

    /// File extension used for the downloaded asset.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Image => "jpg",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "image" => Ok(Self::Image),
            other => Err(format!(
                "Invalid option '{other}'. Choose 'video' or 'image'."
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoSearchResponse {
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    /// Length in whole seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub video_files: Vec<VideoFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFile {
    pub id: u64,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub link: String,
}

impl Video {
    /// Download link of the first listed file.
    pub fn primary_link(&self) -> Option<&str> {
        self.video_files.first().map(|file| file.link.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoSearchResponse {
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub photographer: Option<String>,
    pub src: PhotoSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSource {
    pub original: String,
    #[serde(default)]
    pub large2x: Option<String>,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub landscape: Option<String>,
}

/// One selectable search result, normalised across videos and photos.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaOption {
    pub kind: MediaKind,
    pub id: u64,
    /// Pexels page for the asset.
    pub page_url: String,
    pub download_url: String,
    /// Seconds, only known for videos.
    pub duration: Option<u32>,
    pub width: u32,
    pub height: u32,
}

impl MediaOption {
    pub fn from_videos(videos: &[Video]) -> Vec<Self> {
        videos
            .iter()
            .filter_map(|video| {
                let link = video.primary_link()?;
                Some(Self {
                    kind: MediaKind::Video,
                    id: video.id,
                    page_url: video.url.clone(),
                    download_url: link.to_string(),
                    duration: Some(video.duration),
                    width: video.width,
                    height: video.height,
                })
            })
            .collect()
    }

    pub fn from_photos(photos: &[Photo]) -> Vec<Self> {
        photos
            .iter()
            .map(|photo| Self {
                kind: MediaKind::Image,
                id: photo.id,
                page_url: photo.url.clone(),
                download_url: photo.src.original.clone(),
                duration: None,
                width: photo.width,
                height: photo.height,
            })
            .collect()
    }

    /// One-line description for option menus.
    pub fn label(&self) -> String {
        let shown = if self.page_url.is_empty() {
            &self.download_url
        } else {
            &self.page_url
        };
        match self.duration {
            Some(secs) => format!("{shown} (Duration: {secs} sec)"),
            None => shown.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_JSON: &str = r#"{
        "page": 1,
        "per_page": 2,
        "total_results": 2,
        "videos": [
            {
                "id": 1,
                "url": "https://www.pexels.com/video/1/",
                "duration": 12,
                "width": 1920,
                "height": 1080,
                "image": "https://images.pexels.com/1.jpg",
                "video_files": [
                    {"id": 10, "quality": "hd", "file_type": "video/mp4", "width": 1920, "height": 1080, "fps": 25.0, "link": "https://player.vimeo.com/1.mp4"},
                    {"id": 11, "quality": "sd", "file_type": "video/mp4", "width": 640, "height": 360, "link": "https://player.vimeo.com/1-sd.mp4"}
                ]
            },
            {
                "id": 2,
                "url": "https://www.pexels.com/video/2/",
                "duration": 7,
                "width": 1080,
                "height": 1920,
                "video_files": []
            }
        ]
    }"#;

    const PHOTO_JSON: &str = r#"{
        "photos": [
            {
                "id": 5,
                "url": "https://www.pexels.com/photo/5/",
                "width": 4000,
                "height": 3000,
                "photographer": "Jo",
                "src": {"original": "https://images.pexels.com/5.jpeg", "large2x": "https://images.pexels.com/5-l.jpeg"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_video_response_takes_first_file() {
        let response: VideoSearchResponse = serde_json::from_str(VIDEO_JSON).unwrap();
        assert_eq!(response.videos.len(), 2);
        assert_eq!(
            response.videos[0].primary_link(),
            Some("https://player.vimeo.com/1.mp4")
        );
        assert_eq!(response.videos[1].primary_link(), None);
    }

    #[test]
    fn test_options_skip_videos_without_files() {
        let response: VideoSearchResponse = serde_json::from_str(VIDEO_JSON).unwrap();
        let options = MediaOption::from_videos(&response.videos);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].duration, Some(12));
        assert_eq!(
            options[0].label(),
            "https://www.pexels.com/video/1/ (Duration: 12 sec)"
        );
    }

    #[test]
    fn test_photo_options_use_original_source() {
        let response: PhotoSearchResponse = serde_json::from_str(PHOTO_JSON).unwrap();
        let options = MediaOption::from_photos(&response.photos);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].download_url, "https://images.pexels.com/5.jpeg");
        assert_eq!(options[0].kind, MediaKind::Image);
        assert_eq!(options[0].label(), "https://www.pexels.com/photo/5/");
    }

    #[test]
    fn test_missing_arrays_are_empty() {
        let videos: VideoSearchResponse = serde_json::from_str("{}").unwrap();
        let photos: PhotoSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(videos.videos.is_empty());
        assert!(photos.photos.is_empty());
    }

    #[test]
    fn test_media_kind_from_str() {
        assert_eq!("Video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert_eq!(" image ".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert!("gif".parse::<MediaKind>().is_err());
    }
}
