// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Layout Result Caching
//!
//! Caller-owned cache of pipeline outputs. Identical input with identical
//! effective configuration yields the same output, so repeated layout
//! requests skip the whole pipeline.
//!
//! ## Cache Key Generation
//!
//! ```text
//! key = BLAKE3(json(nodes) || json(edges) || json(effective config))
//! ```
//!
//! Unseeded label propagation is randomized; a cached result is one valid
//! sample and is returned as-is until it expires.

use crate::config::{CacheConfig, EngineConfig};
use crate::input::GraphInput;
use crate::pipeline::{PipelineOutput, TopicGraphEngine};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use topicgraph_core::GraphResult;

/// Cache key for pipeline outputs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutCacheKey {
    hash: [u8; 32],
}

impl LayoutCacheKey {
    pub fn new(input: &GraphInput, config: &EngineConfig) -> GraphResult<Self> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&serde_json::to_vec(&input.nodes)?);
        hasher.update(b"|");
        hasher.update(&serde_json::to_vec(&input.edges)?);
        hasher.update(b"|");
        hasher.update(&serde_json::to_vec(config)?);
        Ok(Self {
            hash: *hasher.finalize().as_bytes(),
        })
    }

    /// Get the hash as hex string (for debugging)
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Cache hit rate (0.0 - 1.0)
    pub hit_rate: f64,
    pub entry_count: u64,
}

/// Pipeline output cache
pub struct LayoutCache {
    cache: Cache<LayoutCacheKey, Arc<PipelineOutput>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LayoutCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl())
            .build();

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &LayoutCacheKey) -> Option<Arc<PipelineOutput>> {
        match self.cache.get(key) {
            Some(output) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(output)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: LayoutCacheKey, output: Arc<PipelineOutput>) {
        self.cache.insert(key, output);
    }

    /// Clear all cached results
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            entry_count: self.cache.entry_count(),
        }
    }

    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.entry_count() == 0
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl TopicGraphEngine {
    /// [`run`](TopicGraphEngine::run), consulting `cache` first
    pub fn run_cached(
        &self,
        input: &GraphInput,
        cache: &LayoutCache,
    ) -> GraphResult<Arc<PipelineOutput>> {
        let config = self.effective_config(input)?;
        let key = LayoutCacheKey::new(input, &config)?;

        if let Some(output) = cache.get(&key) {
            tracing::debug!("Layout cache hit {}", key.to_hex());
            return Ok(output);
        }

        let output = Arc::new(self.run(input)?);
        cache.insert(key, Arc::clone(&output));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicgraph_core::{EdgeInput, NodeInput};

    fn input() -> GraphInput {
        GraphInput::new(
            vec![NodeInput::new("a"), NodeInput::new("b")],
            vec![EdgeInput::new("a", "b").confidence(0.8)],
        )
    }

    #[test]
    fn test_key_deterministic() {
        let config = EngineConfig::default();
        let key1 = LayoutCacheKey::new(&input(), &config).unwrap();
        let key2 = LayoutCacheKey::new(&input(), &config).unwrap();
        assert_eq!(key1, key2);
        assert_eq!(key1.to_hex().len(), 64);
    }

    #[test]
    fn test_key_depends_on_config() {
        let mut other = EngineConfig::default();
        other.layout.force_iterations = 10;
        let key1 = LayoutCacheKey::new(&input(), &EngineConfig::default()).unwrap();
        let key2 = LayoutCacheKey::new(&input(), &other).unwrap();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_run_cached_hits_second_time() {
        let engine = TopicGraphEngine::default();
        let cache = LayoutCache::default();

        let first = engine.run_cached(&input(), &cache).unwrap();
        let second = engine.run_cached(&input(), &cache).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[test]
    fn test_clear_resets_counters() {
        let cache = LayoutCache::default();
        let key = LayoutCacheKey::new(&input(), &EngineConfig::default()).unwrap();
        assert!(cache.get(&key).is_none());
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
