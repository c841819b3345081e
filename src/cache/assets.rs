//! Content-addressed store for downloaded stock assets.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keeps downloaded assets keyed by the SHA-256 of their source URL.
#[derive(Debug, Clone)]
pub struct AssetCache {
    dir: PathBuf,
}

impl AssetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", url_digest(url), extension))
    }

    /// Cached copy of `url`, if one exists and is non-empty.
    pub fn lookup(&self, url: &str, extension: &str) -> Option<PathBuf> {
        let path = self.path_for(url, extension);
        let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if len > 0 {
            debug!("Asset cache hit for {} at {:?}", url, path);
            Some(path)
        } else {
            None
        }
    }

    /// Copy a downloaded file into the store and return its cached path.
    ///
    /// The copy goes to a temp file in the store first, so the hashed path
    /// only ever holds a complete asset.
    pub fn store(&self, url: &str, extension: &str, source: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create asset cache {:?}", self.dir))?;
        let dest = self.path_for(url, extension);

        let mut input =
            File::open(source).with_context(|| format!("Failed to open {:?}", source))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .context("Failed to create temporary asset file")?;
        io::copy(&mut input, &mut tmp)
            .with_context(|| format!("Failed to copy asset into {:?}", self.dir))?;
        tmp.as_file()
            .sync_all()
            .context("Failed to flush temporary asset file")?;
        tmp.persist(&dest)
            .with_context(|| format!("Failed to store asset in {:?}", dest))?;

        debug!("Stored {} at {:?}", url, dest);
        Ok(dest)
    }

    /// Remove every cached asset, returning how many files were deleted.
    pub fn clear(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove cached asset {:?}", path))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn url_digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_is_stable_per_url() {
        let cache = AssetCache::new("/tmp/assets");
        let a = cache.path_for("https://cdn.example.com/1.mp4", "mp4");
        let b = cache.path_for("https://cdn.example.com/1.mp4", "mp4");
        let c = cache.path_for("https://cdn.example.com/2.mp4", "mp4");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.extension().unwrap(), "mp4");
    }

    #[test]
    fn test_store_then_lookup() {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::new(dir.path().join("assets"));
        let url = "https://images.example.com/5.jpeg";
        assert!(cache.lookup(url, "jpg").is_none());

        let source = dir.path().join("download.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let stored = cache.store(url, "jpg", &source).unwrap();

        assert_eq!(cache.lookup(url, "jpg"), Some(stored));
        assert_eq!(cache.clear().unwrap(), 1);
        assert!(cache.lookup(url, "jpg").is_none());
    }

    #[test]
    fn test_store_replaces_whole_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        let cache = AssetCache::new(&assets);
        let url = "https://cdn.example.com/7.mp4";

        let first = dir.path().join("first.mp4");
        fs::write(&first, vec![1u8; 4096]).unwrap();
        cache.store(url, "mp4", &first).unwrap();

        let second = dir.path().join("second.mp4");
        fs::write(&second, b"short").unwrap();
        let stored = cache.store(url, "mp4", &second).unwrap();

        assert_eq!(fs::read(&stored).unwrap(), b"short");
        assert_eq!(fs::read_dir(&assets).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_store_leaves_no_entry() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        let cache = AssetCache::new(&assets);
        let url = "https://cdn.example.com/8.mp4";

        assert!(cache
            .store(url, "mp4", &dir.path().join("never-downloaded.mp4"))
            .is_err());
        assert!(cache.lookup(url, "mp4").is_none());
        assert_eq!(fs::read_dir(&assets).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = AssetCache::new(dir.path());
        let url = "https://cdn.example.com/empty.mp4";
        fs::write(cache.path_for(url, "mp4"), b"").unwrap();
        assert!(cache.lookup(url, "mp4").is_none());
    }
}
