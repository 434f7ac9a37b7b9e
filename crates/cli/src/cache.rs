//! Local result cache, one JSON file per canonical URL.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O failed for {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("cache entry encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A previously generated parody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedParody {
    pub url: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub html: String,
}

/// Cache key for a canonical URL.
pub fn cache_key(canonical_url: &str) -> String {
    hex::encode(Sha256::digest(canonical_url.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, canonical_url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(canonical_url)))
    }

    /// Cached entry for `canonical_url`; unreadable or corrupt entries count as misses.
    pub async fn get(&self, canonical_url: &str) -> Option<CachedParody> {
        let path = self.entry_path(canonical_url);
        let data = tokio::fs::read(&path).await.ok()?;

        match serde_json::from_slice::<CachedParody>(&data) {
            Ok(entry) if entry.url == canonical_url => Some(entry),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                None
            }
        }
    }

    pub async fn put(&self, entry: &CachedParody) -> Result<PathBuf, CacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| CacheError::Io { path: self.dir.clone(), source })?;

        let path = self.entry_path(&entry.url);
        let data = serde_json::to_vec_pretty(entry)?;
        write_file(&path, &data).await?;
        Ok(path)
    }
}

pub async fn write_file(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    tokio::fs::write(path, data)
        .await
        .map_err(|source| CacheError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache(name: &str) -> ResultCache {
        let dir = std::env::temp_dir().join(format!("parodist-cache-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        ResultCache::new(dir)
    }

    fn entry(url: &str) -> CachedParody {
        CachedParody {
            url: url.into(),
            model: "claude-sonnet-4-5".into(),
            generated_at: Utc::now(),
            html: "<html>parody</html>".into(),
        }
    }

    #[test]
    fn test_cache_key_format() {
        let key = cache_key("https://example.com/");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, cache_key("https://example.com/"));
        assert_ne!(key, cache_key("https://example.com/other"));
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = temp_cache("roundtrip");
        let stored = entry("https://example.com/");

        cache.put(&stored).await.unwrap();
        assert_eq!(cache.get("https://example.com/").await, Some(stored));
        assert_eq!(cache.get("https://example.org/").await, None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_miss() {
        let cache = temp_cache("corrupt");
        let path = cache.put(&entry("https://example.com/")).await.unwrap();
        std::fs::write(&path, b"{not json").unwrap();

        assert_eq!(cache.get("https://example.com/").await, None);
    }
}
