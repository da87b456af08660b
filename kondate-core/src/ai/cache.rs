//! Disk-based cache of parsed generation payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::{GenerationRequest, Tier};

/// Disk-based payload cache. A cache without a directory is disabled: every
/// lookup misses and every write is dropped.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    cache_dir: Option<PathBuf>,
}

/// A cached payload with its write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPayload {
    pub payload: serde_json::Value,
    pub cached_at: DateTime<Utc>,
    pub model: String,
}

impl CachedPayload {
    /// Whether the entry is still within `ttl`. Entries stamped in the future
    /// (clock skew) count as fresh.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        (Utc::now() - self.cached_at)
            .to_std()
            .map(|age| age <= ttl)
            .unwrap_or(true)
    }
}

/// Cache key components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub mode: &'static str,
    pub tier: Tier,
    pub model: String,
    pub input_hash: String,
}

impl CacheKey {
    /// Key for a generation request.
    ///
    /// Basic requests key on the category (or `general`), ingredient requests
    /// on the sorted, comma-joined ingredient list, constraint requests on the
    /// JSON form of the constraints.
    pub fn for_request(request: &GenerationRequest, tier: Tier, model: &str) -> Self {
        let input = match request {
            GenerationRequest::Basic { category } => category
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or("general")
                .to_string(),
            GenerationRequest::ByIngredients { ingredients } => {
                let mut sorted = ingredients.clone();
                sorted.sort();
                sorted.join(",")
            }
            GenerationRequest::WithConstraints(constraints) => {
                serde_json::to_string(constraints).unwrap_or_default()
            }
        };

        Self {
            mode: request.mode_name(),
            tier,
            model: model.to_string(),
            input_hash: sha256_hex(&input),
        }
    }

    /// Convert to a filesystem path relative to the cache directory.
    ///
    /// Format: {mode}/{tier}/{model_safe}/{hash[0:2]}/{hash}.json
    pub fn to_path(&self) -> PathBuf {
        let model_safe = self.model.replace(['/', ':'], "--");

        PathBuf::new()
            .join(self.mode)
            .join(self.tier.as_str())
            .join(model_safe)
            .join(&self.input_hash[..2])
            .join(format!("{}.json", self.input_hash))
    }
}

impl ResponseCache {
    /// Create a cache rooted at `cache_dir`.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir: Some(cache_dir),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self { cache_dir: None }
    }

    /// Get a cached payload if one exists and is younger than `ttl`.
    pub fn get(&self, key: &CacheKey, ttl: Duration) -> Option<CachedPayload> {
        let path = self.cache_dir.as_ref()?.join(key.to_path());
        let content = fs::read_to_string(&path).ok()?;
        let cached: CachedPayload = match serde_json::from_str(&content) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable cache entry");
                return None;
            }
        };

        if cached.is_fresh(ttl) {
            Some(cached)
        } else {
            tracing::debug!(mode = key.mode, hash = %key.input_hash, "cache entry expired");
            None
        }
    }

    /// Store a payload in the cache.
    pub fn put(
        &self,
        key: &CacheKey,
        payload: &serde_json::Value,
        model: &str,
    ) -> std::io::Result<()> {
        self.put_at(key, payload, model, Utc::now())
    }

    fn put_at(
        &self,
        key: &CacheKey,
        payload: &serde_json::Value,
        model: &str,
        cached_at: DateTime<Utc>,
    ) -> std::io::Result<()> {
        let Some(cache_dir) = &self.cache_dir else {
            return Ok(());
        };
        let path = cache_dir.join(key.to_path());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let cached = CachedPayload {
            payload: payload.clone(),
            cached_at,
            model: model.to_string(),
        };

        let json = serde_json::to_string_pretty(&cached)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&path, json)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();

        let Some(cache_dir) = self.cache_dir.as_deref().filter(|d| d.exists()) else {
            return stats;
        };

        fn count_json_files(dir: &Path, count: &mut usize) {
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.filter_map(|e| e.ok()) {
                    let path = entry.path();
                    if path.is_dir() {
                        count_json_files(&path, count);
                    } else if path.extension().is_some_and(|ext| ext == "json") {
                        *count += 1;
                    }
                }
            }
        }

        count_json_files(cache_dir, &mut stats.cached_payloads);
        stats
    }

    /// Clear all cached payloads.
    pub fn clear(&self) -> std::io::Result<()> {
        match &self.cache_dir {
            Some(dir) if dir.exists() => fs::remove_dir_all(dir),
            _ => Ok(()),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub cached_payloads: usize,
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
