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

//! Community Detector
//!
//! Front door for the clustering algorithms. Picks the algorithm, runs it
//! against a [`GraphStore`], and turns the raw labelling into scored
//! [`Community`] records (optionally rolled up one level).

use crate::hierarchy;
use crate::label_propagation::{self, LabelPropagation};
use crate::leiden::LeidenRefinement;
use crate::louvain::{self, LouvainClustering, LouvainConfig};
use crate::partition::Partition;
use crate::scoring;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use topicgraph_core::{palette, Community, GraphError, GraphResult, GraphStore};

pub const SUPPORTED_ALGORITHMS: &str = "louvain, leiden, label-propagation";

/// Clustering algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    /// Louvain-style modularity optimization
    #[default]
    Louvain,
    /// Modularity optimization followed by connectivity refinement
    Leiden,
    /// Majority-label propagation
    LabelPropagation,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Louvain => "louvain",
            Algorithm::Leiden => "leiden",
            Algorithm::LabelPropagation => "label-propagation",
        }
    }

    /// Pass budget used when none is configured
    pub fn default_max_iterations(&self) -> usize {
        match self {
            Algorithm::Louvain | Algorithm::Leiden => louvain::DEFAULT_MAX_ITERATIONS,
            Algorithm::LabelPropagation => label_propagation::DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl FromStr for Algorithm {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "louvain" | "modularity" => Ok(Algorithm::Louvain),
            "leiden" => Ok(Algorithm::Leiden),
            "label-propagation" | "labelpropagation" | "lpa" => Ok(Algorithm::LabelPropagation),
            other => Err(GraphError::invalid(format!(
                "unknown algorithm '{}'; supported: {}",
                other, SUPPORTED_ALGORITHMS
            ))),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Community detection options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectOptions {
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Scales the Louvain gain proxy
    #[serde(default = "default_resolution")]
    pub resolution: f64,

    /// Pass budget; `None` uses the algorithm default
    #[serde(default)]
    pub max_iterations: Option<usize>,

    /// Smaller communities are dropped from the result
    #[serde(default = "default_min_community_size")]
    pub min_community_size: usize,

    /// Roll base communities up into one super-community level
    #[serde(default)]
    pub hierarchical: bool,

    /// Seed for the random source; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Leiden only: split communities into connected components
    #[serde(default)]
    pub split_disconnected: bool,
}

fn default_resolution() -> f64 {
    1.0
}

fn default_min_community_size() -> usize {
    1
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            resolution: default_resolution(),
            max_iterations: None,
            min_community_size: default_min_community_size(),
            hierarchical: false,
            seed: None,
            split_disconnected: false,
        }
    }
}

impl DetectOptions {
    pub fn with_algorithm(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> GraphResult<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(GraphError::invalid(format!(
                "resolution must be a positive number, got {}",
                self.resolution
            )));
        }
        if self.min_community_size == 0 {
            return Err(GraphError::invalid("min_community_size must be at least 1"));
        }
        Ok(())
    }
}

/// Output of community detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub algorithm: Algorithm,
    /// Level-0 communities first, then any level-1 roll-ups
    pub communities: Vec<Community>,
    /// Modularity of the full base partition
    pub modularity: f64,
    pub hierarchy_levels: u8,
    pub iterations: usize,
    pub converged: bool,
}

impl DetectionResult {
    fn empty(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            communities: Vec::new(),
            modularity: 0.0,
            hierarchy_levels: 0,
            iterations: 0,
            converged: true,
        }
    }

    /// Level-0 communities
    pub fn base_communities(&self) -> impl Iterator<Item = &Community> {
        self.communities.iter().filter(|c| c.level == 0)
    }

    /// Level-0 community containing a node
    pub fn community_of(&self, node_id: &str) -> Option<&Community> {
        self.base_communities()
            .find(|c| c.members.node_ids().iter().any(|id| id == node_id))
    }
}

/// Runs community detection over graph stores
#[derive(Debug, Clone, Default)]
pub struct CommunityDetector {
    options: DetectOptions,
}

impl CommunityDetector {
    pub fn new(options: DetectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DetectOptions {
        &self.options
    }

    /// Detect communities using a random source seeded from the options
    pub fn detect(&self, graph: &GraphStore) -> GraphResult<DetectionResult> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.detect_with_rng(graph, &mut rng)
    }

    /// Detect communities with an injected random source
    pub fn detect_with_rng<R: Rng + ?Sized>(
        &self,
        graph: &GraphStore,
        rng: &mut R,
    ) -> GraphResult<DetectionResult> {
        self.options.validate()?;

        let algorithm = self.options.algorithm;
        let _span = tracing::debug_span!(
            "detect_communities",
            %algorithm,
            nodes = graph.node_count(),
            edges = graph.edge_count()
        )
        .entered();

        if graph.is_empty() {
            return Ok(DetectionResult::empty(algorithm));
        }

        let max_iterations = self
            .options
            .max_iterations
            .unwrap_or_else(|| algorithm.default_max_iterations());

        let mut partition = match algorithm {
            Algorithm::LabelPropagation => LabelPropagation::new(max_iterations).detect(graph, rng),
            Algorithm::Louvain | Algorithm::Leiden => {
                LouvainClustering::with_config(LouvainConfig {
                    resolution: self.options.resolution,
                    max_iterations,
                    ..Default::default()
                })
                .detect(graph)
            }
        };

        let refinement = LeidenRefinement::new(self.options.split_disconnected);
        if algorithm == Algorithm::Leiden {
            refinement.refine_partition(graph, &mut partition);
        }

        partition.renumber();
        let modularity = scoring::modularity(graph, &partition.labels);
        let mut communities = self.build_communities(graph, &partition);

        if algorithm == Algorithm::Leiden {
            refinement.flag_poorly_connected(&mut communities);
        }

        let mut hierarchy_levels = if communities.is_empty() { 0 } else { 1 };
        if self.options.hierarchical && hierarchy::roll_up(graph, &mut communities) {
            hierarchy_levels = 2;
        }

        tracing::debug!(
            communities = communities.len(),
            modularity,
            iterations = partition.iterations,
            converged = partition.converged,
            "Community detection finished"
        );

        Ok(DetectionResult {
            algorithm,
            communities,
            modularity,
            hierarchy_levels,
            iterations: partition.iterations,
            converged: partition.converged,
        })
    }

    /// Scored level-0 communities, small groups filtered, ids contiguous
    fn build_communities(&self, graph: &GraphStore, partition: &Partition) -> Vec<Community> {
        let mut communities = Vec::new();
        let mut dropped = 0;

        for (_, nodes) in partition.groups() {
            if nodes.len() < self.options.min_community_size {
                dropped += 1;
                continue;
            }
            let member_set: HashSet<usize> = nodes.iter().copied().collect();
            let ids = nodes.iter().map(|&i| graph.node_at(i).id.clone()).collect();

            let mut community = Community::new(communities.len() as u32, ids);
            community.cohesion_score = scoring::cohesion(graph, &member_set);
            communities.push(community);
        }

        if dropped > 0 {
            tracing::debug!(
                "Dropped {} communities smaller than {}",
                dropped,
                self.options.min_community_size
            );
        }
        communities
    }

    /// Write community ids and palette colors onto the graph's nodes.
    ///
    /// Nodes outside every level-0 community are reset to unassigned.
    pub fn apply(&self, graph: &mut GraphStore, result: &DetectionResult) {
        for node in graph.nodes_mut() {
            node.community = None;
            node.color = palette::UNASSIGNED_COLOR.to_string();
        }
        for community in result.base_communities() {
            for id in community.members.node_ids() {
                if let Some(node) = graph.node_mut(id) {
                    node.community = Some(community.id);
                    node.color = palette::color_for(Some(community.id)).to_string();
                }
            }
        }
    }
}
