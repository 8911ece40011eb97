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


//! Engine configuration
//!
//! Loaded with priority: environment > file > defaults. Per-request
//! [`RequestOptions`] are overlaid on top for a single run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use topicgraph_community::{Algorithm, DetectOptions};
use topicgraph_core::{BuildOptions, GraphError, GraphResult};
use topicgraph_layout::LayoutOptions;

/// Topicgraph engine configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub graph: BuildOptions,
    #[serde(default)]
    pub community: DetectOptions,
    #[serde(default)]
    pub layout: LayoutOptions,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Output coordinates land in [-viewport, viewport]
    #[serde(default = "default_viewport")]
    pub viewport: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum number of cached pipeline results
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
    /// Time-to-live for cached results in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

// Default values
fn default_viewport() -> f64 {
    1000.0
}

fn default_cache_max_entries() -> u64 {
    256
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_max_entries(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

const ENV_NODE_LIMIT: &str = "TOPICGRAPH_NODE_LIMIT";
const ENV_MIN_EDGE_CONFIDENCE: &str = "TOPICGRAPH_MIN_EDGE_CONFIDENCE";
const ENV_ALGORITHM: &str = "TOPICGRAPH_ALGORITHM";
const ENV_RESOLUTION: &str = "TOPICGRAPH_RESOLUTION";
const ENV_SEED: &str = "TOPICGRAPH_SEED";
const ENV_FORCE_ITERATIONS: &str = "TOPICGRAPH_FORCE_ITERATIONS";
const ENV_OVERLAP_ITERATIONS: &str = "TOPICGRAPH_OVERLAP_ITERATIONS";
const ENV_DENSE_CLUSTER_THRESHOLD: &str = "TOPICGRAPH_DENSE_CLUSTER_THRESHOLD";
const ENV_VIEWPORT: &str = "TOPICGRAPH_VIEWPORT";

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - TOPICGRAPH_NODE_LIMIT: Maximum input nodes (default: 2000)
    /// - TOPICGRAPH_MIN_EDGE_CONFIDENCE: Edge confidence floor (default: 0.25)
    /// - TOPICGRAPH_ALGORITHM: louvain, leiden or label-propagation (default: louvain)
    /// - TOPICGRAPH_RESOLUTION: Modularity resolution (default: 1.0)
    /// - TOPICGRAPH_SEED: Random seed for community detection (default: unseeded)
    /// - TOPICGRAPH_FORCE_ITERATIONS: Force pass iterations (default: 150)
    /// - TOPICGRAPH_OVERLAP_ITERATIONS: Overlap removal passes (default: 300)
    /// - TOPICGRAPH_DENSE_CLUSTER_THRESHOLD: Refinement threshold (default: 100)
    /// - TOPICGRAPH_VIEWPORT: Export viewport half-size (default: 1000)
    pub fn from_env() -> Self {
        Self::merge_with_env(Self::default())
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        let config = Self::merge_with_env(config);
        config.validate()?;
        Ok(config)
    }

    /// Merge config with environment variables (env takes priority)
    fn merge_with_env(config: Self) -> Self {
        Self::merge_with(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`; only variables it returns are applied
    pub fn merge_with<F>(mut config: Self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_NODE_LIMIT).and_then(|raw| parse_env(ENV_NODE_LIMIT, &raw)) {
            config.graph.node_limit = v;
        }
        if let Some(v) = lookup(ENV_MIN_EDGE_CONFIDENCE)
            .and_then(|raw| parse_env(ENV_MIN_EDGE_CONFIDENCE, &raw))
        {
            config.graph.min_edge_confidence = v;
        }
        if let Some(v) =
            lookup(ENV_ALGORITHM).and_then(|raw| parse_env::<Algorithm>(ENV_ALGORITHM, &raw))
        {
            config.community.algorithm = v;
        }
        if let Some(v) = lookup(ENV_RESOLUTION).and_then(|raw| parse_env(ENV_RESOLUTION, &raw)) {
            config.community.resolution = v;
        }
        if let Some(v) = lookup(ENV_SEED).and_then(|raw| parse_env(ENV_SEED, &raw)) {
            config.community.seed = Some(v);
        }
        if let Some(v) =
            lookup(ENV_FORCE_ITERATIONS).and_then(|raw| parse_env(ENV_FORCE_ITERATIONS, &raw))
        {
            config.layout.force_iterations = v;
        }
        if let Some(v) =
            lookup(ENV_OVERLAP_ITERATIONS).and_then(|raw| parse_env(ENV_OVERLAP_ITERATIONS, &raw))
        {
            config.layout.overlap_iterations = v;
        }
        if let Some(v) = lookup(ENV_DENSE_CLUSTER_THRESHOLD)
            .and_then(|raw| parse_env(ENV_DENSE_CLUSTER_THRESHOLD, &raw))
        {
            config.layout.dense_cluster_threshold = v;
        }
        if let Some(v) = lookup(ENV_VIEWPORT).and_then(|raw| parse_env(ENV_VIEWPORT, &raw)) {
            config.export.viewport = v;
        }
        config
    }

    /// Validate configuration
    pub fn validate(&self) -> GraphResult<()> {
        if self.graph.node_limit == 0 {
            return Err(GraphError::Config("graph.node_limit must be at least 1".into()));
        }
        let confidence = self.graph.min_edge_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(GraphError::Config(format!(
                "graph.min_edge_confidence must be within [0, 1], got {}",
                confidence
            )));
        }
        self.community
            .validate()
            .map_err(|e| GraphError::Config(format!("community: {}", e)))?;
        self.layout
            .validate()
            .map_err(|e| GraphError::Config(format!("layout: {}", e)))?;
        if !self.export.viewport.is_finite() || self.export.viewport <= 0.0 {
            return Err(GraphError::Config(format!(
                "export.viewport must be a positive number, got {}",
                self.export.viewport
            )));
        }
        if self.cache.max_entries == 0 {
            return Err(GraphError::Config("cache.max_entries must be at least 1".into()));
        }
        Ok(())
    }
}

/// Per-request overrides, as sent alongside the node and edge lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_edge_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dense_cluster_threshold: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_viewport_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_community_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchical: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl RequestOptions {
    /// `base` with every set field of `self` applied
    pub fn overlay(&self, base: &EngineConfig) -> EngineConfig {
        let mut config = base.clone();
        if let Some(v) = self.node_limit {
            config.graph.node_limit = v;
        }
        if let Some(v) = self.min_edge_confidence {
            config.graph.min_edge_confidence = v;
        }
        if let Some(v) = self.dense_cluster_threshold {
            config.layout.dense_cluster_threshold = v;
        }
        if let Some(v) = self.force_iterations {
            config.layout.force_iterations = v;
        }
        if let Some(v) = self.overlap_iterations {
            config.layout.overlap_iterations = v;
        }
        if let Some(v) = self.target_viewport_size {
            config.export.viewport = v;
        }
        if let Some(v) = self.algorithm {
            config.community.algorithm = v;
        }
        if let Some(v) = self.resolution {
            config.community.resolution = v;
        }
        if self.max_iterations.is_some() {
            config.community.max_iterations = self.max_iterations;
        }
        if let Some(v) = self.min_community_size {
            config.community.min_community_size = v;
        }
        if let Some(v) = self.hierarchical {
            config.community.hierarchical = v;
        }
        if self.seed.is_some() {
            config.community.seed = self.seed;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.graph.node_limit, 2000);
        assert_eq!(config.layout.force_iterations, 150);
        assert_eq!(config.export.viewport, 1000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_with_lookup() {
        let vars: HashMap<&str, &str> = [
            ("TOPICGRAPH_NODE_LIMIT", "50"),
            ("TOPICGRAPH_ALGORITHM", "lpa"),
            ("TOPICGRAPH_SEED", "7"),
            ("TOPICGRAPH_VIEWPORT", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::merge_with(EngineConfig::default(), |name| {
            vars.get(name).map(|v| v.to_string())
        });
        assert_eq!(config.graph.node_limit, 50);
        assert_eq!(config.community.algorithm, Algorithm::LabelPropagation);
        assert_eq!(config.community.seed, Some(7));
        // unparseable values are ignored
        assert_eq!(config.export.viewport, 1000.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.graph.min_edge_confidence = 1.5;
        assert!(matches!(config.validate(), Err(GraphError::Config(_))));

        let mut config = EngineConfig::default();
        config.community.resolution = -1.0;
        assert!(matches!(config.validate(), Err(GraphError::Config(_))));

        let mut config = EngineConfig::default();
        config.export.viewport = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_overlay() {
        let options: RequestOptions = serde_json::from_value(serde_json::json!({
            "nodeLimit": 10,
            "targetViewportSize": 250.0,
            "algorithm": "leiden",
            "forceIterations": 5
        }))
        .unwrap();
        let config = options.overlay(&EngineConfig::default());
        assert_eq!(config.graph.node_limit, 10);
        assert_eq!(config.export.viewport, 250.0);
        assert_eq!(config.community.algorithm, Algorithm::Leiden);
        assert_eq!(config.layout.force_iterations, 5);
        assert_eq!(config.layout.overlap_iterations, 300);
    }
}
