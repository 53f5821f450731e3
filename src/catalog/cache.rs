//! NeoWs disk caching module
//!
//! Keeps raw browse pages on disk so restarts and reloads within the
//! expiration window do not hit the (rate-limited) NASA API again.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Serialized cache entry stored as JSON on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPage {
    pub page: u32,
    /// Response body exactly as received
    pub body: String,
    pub cached_at: DateTime<Utc>,
}

/// NeoWs page cache manager
pub struct NeoCache {
    cache_dir: PathBuf,
    expiration_hours: i64,
}

impl NeoCache {
    /// Create a cache in the platform cache directory:
    /// - macOS: ~/Library/Caches/bevyorrery/neows/
    /// - Linux: ~/.cache/bevyorrery/neows/
    /// - Windows: %LOCALAPPDATA%\bevyorrery\neows\
    pub fn new(expiration_hours: i64) -> Result<Self, anyhow::Error> {
        let proj_dirs = ProjectDirs::from("", "", "bevyorrery")
            .ok_or_else(|| anyhow::anyhow!("Failed to resolve cache directory"))?;

        let cache_dir = proj_dirs.cache_dir().join("neows");
        Self::new_in_dir(cache_dir, expiration_hours)
    }

    /// Create a cache rooted at a specific directory
    pub fn new_in_dir(cache_dir: PathBuf, expiration_hours: i64) -> Result<Self, anyhow::Error> {
        fs::create_dir_all(&cache_dir)?;

        Ok(Self {
            cache_dir,
            expiration_hours,
        })
    }

    /// Ok(None) on a cache miss; Err when the file exists but cannot be read.
    pub fn read(&self, page: u32) -> Result<Option<CachedPage>, anyhow::Error> {
        let path = self.cache_path(page);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let cached: CachedPage = serde_json::from_str(&contents)?;

        Ok(Some(cached))
    }

    pub fn write(&self, entry: &CachedPage) -> Result<(), anyhow::Error> {
        let path = self.cache_path(entry.page);
        let contents = serde_json::to_string(entry)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// A page is fresh while it is younger than the expiration window.
    pub fn is_valid(&self, entry: &CachedPage) -> bool {
        let age = Utc::now().signed_duration_since(entry.cached_at);
        age < Duration::hours(self.expiration_hours)
    }

    /// Fresh cached body for `page`, if any. Read errors count as a miss.
    pub fn fresh_body(&self, page: u32) -> Option<String> {
        match self.read(page) {
            Ok(Some(entry)) if self.is_valid(&entry) => Some(entry.body),
            _ => None,
        }
    }

    fn cache_path(&self, page: u32) -> PathBuf {
        self.cache_dir.join(format!("browse-{}.json", page))
    }
}
