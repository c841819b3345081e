//! On-disk cache of Pexels video search results.
//!
//! The cache is a single JSON object mapping a search query to the videos
//! Pexels returned for it. There is no eviction; `reelgen cache clear`
//! removes the whole file.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::pexels::Video;

pub mod assets;

pub use assets::AssetCache;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// RFC 3339 timestamp of the API call that produced the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    pub videos: Vec<Video>,
}

impl CacheEntry {
    pub fn new(videos: Vec<Video>) -> Self {
        Self {
            fetched_at: Some(Utc::now().to_rfc3339()),
            videos,
        }
    }

    /// Local-time rendering of `fetched_at`, or "unknown".
    pub fn fetched_display(&self) -> String {
        self.fetched_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| {
                ts.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Files written before timestamps were recorded map queries to bare arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Entry(CacheEntry),
    Legacy(Vec<Video>),
}

impl From<StoredEntry> for CacheEntry {
    fn from(stored: StoredEntry) -> Self {
        match stored {
            StoredEntry::Entry(entry) => entry,
            StoredEntry::Legacy(videos) => Self {
                fetched_at: None,
                videos,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl SearchCache {
    /// Load the cache file. A missing file is an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = read_entries(&path)?;
        debug!("Loaded {} cached queries from {:?}", entries.len(), path);
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, query: &str) -> Option<&CacheEntry> {
        self.entries.get(query)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store results for a query and rewrite the file.
    ///
    /// The file is re-read under an exclusive lock first so entries written
    /// by another process since `load` are kept.
    pub fn insert(&mut self, query: &str, videos: Vec<Video>) -> Result<()> {
        let _lock = CacheLock::acquire(&self.path)?;
        let mut entries = read_entries(&self.path)?;
        entries.insert(query.to_string(), CacheEntry::new(videos));
        write_entries(&self.path, &entries)?;
        info!("Cached {} result set(s) in {:?}", entries.len(), self.path);
        self.entries = entries;
        Ok(())
    }

    /// Delete the cache file. Returns false when there was nothing to remove.
    pub fn clear(&mut self) -> Result<bool> {
        let _lock = CacheLock::acquire(&self.path)?;
        self.entries.clear();
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove cache file {:?}", self.path))?;
        Ok(true)
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, CacheEntry>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cache file {:?}", path))?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let stored: BTreeMap<String, StoredEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Cache file {:?} is corrupt; run `reelgen cache clear`", path))?;
    Ok(stored
        .into_iter()
        .map(|(query, entry)| (query, entry.into()))
        .collect())
}

fn write_entries(path: &Path, entries: &BTreeMap<String, CacheEntry>) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create cache directory {:?}", parent))?;

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    entries
        .serialize(&mut serializer)
        .context("Failed to serialize cache")?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .context("Failed to create temporary cache file")?;
    tmp.write_all(&buffer)
        .context("Failed to write temporary cache file")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace cache file {:?}", path))?;
    Ok(())
}

/// Advisory lock on a sidecar file next to the cache.
struct CacheLock {
    file: File,
}

impl CacheLock {
    fn acquire(cache_path: &Path) -> Result<Self> {
        let mut lock_path = cache_path.as_os_str().to_owned();
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;
        file.lock_exclusive()
            .with_context(|| "Failed to acquire cache lock")?;
        Ok(Self { file })
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            debug!("Failed to release cache lock: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pexels::VideoFile;
    use tempfile::TempDir;

    fn video(id: u64) -> Video {
        Video {
            id,
            url: format!("https://www.pexels.com/video/{id}/"),
            duration: 10,
            width: 1920,
            height: 1080,
            video_files: vec![VideoFile {
                id: id * 10,
                quality: Some("hd".to_string()),
                file_type: Some("video/mp4".to_string()),
                width: Some(1920),
                height: Some(1080),
                link: format!("https://cdn.example.com/{id}.mp4"),
            }],
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = SearchCache::load(dir.path().join("cached_videos.json")).unwrap();
        assert!(cache.is_empty());
        assert!(cache.get("nature").is_none());
    }

    #[test]
    fn test_insert_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache").join("cached_videos.json");

        let mut cache = SearchCache::load(&path).unwrap();
        cache.insert("nature", vec![video(1), video(2)]).unwrap();

        let reloaded = SearchCache::load(&path).unwrap();
        let entry = reloaded.get("nature").unwrap();
        assert_eq!(entry.videos.len(), 2);
        assert!(entry.fetched_at.is_some());
        assert!(reloaded.get("Nature").is_none());
    }

    #[test]
    fn test_file_uses_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_videos.json");
        let mut cache = SearchCache::load(&path).unwrap();
        cache.insert("art", vec![video(3)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n    \"art\""));
    }

    #[test]
    fn test_insert_keeps_entries_written_by_others() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_videos.json");

        let mut first = SearchCache::load(&path).unwrap();
        let mut second = SearchCache::load(&path).unwrap();
        first.insert("music", vec![video(1)]).unwrap();
        second.insert("sports", vec![video(2)]).unwrap();

        let reloaded = SearchCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_loads_legacy_bare_arrays() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_videos.json");
        let legacy = serde_json::json!({ "travel": [video(4)] });
        fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

        let cache = SearchCache::load(&path).unwrap();
        let entry = cache.get("travel").unwrap();
        assert_eq!(entry.videos[0].id, 4);
        assert!(entry.fetched_at.is_none());
        assert_eq!(entry.fetched_display(), "unknown");
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_videos.json");
        fs::write(&path, "{not json").unwrap();
        assert!(SearchCache::load(&path).is_err());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_videos.json");
        let mut cache = SearchCache::load(&path).unwrap();
        assert!(!cache.clear().unwrap());

        cache.insert("history", vec![video(5)]).unwrap();
        assert!(cache.clear().unwrap());
        assert!(!path.exists());
        assert!(cache.is_empty());
    }
}
