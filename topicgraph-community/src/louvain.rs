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

//! Louvain-style Modularity Optimization
//!
//! ## Algorithm Overview
//!
//! 1. **Initialize**: every node in its own community
//! 2. **Local Moving Pass**: visit nodes in insertion order and move each to
//!    the neighboring community with the best strictly positive gain
//! 3. **Score**: recompute global modularity after the pass
//! 4. **Repeat**: until no node moves, the improvement is ≤ `min_improvement`,
//!    or `max_iterations` passes have run
//!
//! ## Gain Proxy
//!
//! gain(c) = resolution × (links(node, c) − links(node, current))
//!
//! This is a local approximation of the modularity delta: it ignores the
//! degree-product term, so it can accept a move that lowers global
//! modularity. A pass that does so is rolled back and ends the run, which
//! keeps the result at least as good as the singleton partition.

use crate::partition::Partition;
use crate::scoring;
use std::collections::BTreeMap;
use topicgraph_core::GraphStore;

pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_MIN_IMPROVEMENT: f64 = 1e-4;

/// Modularity optimization configuration
#[derive(Debug, Clone)]
pub struct LouvainConfig {
    /// Scales the gain proxy
    pub resolution: f64,
    /// Maximum local moving passes
    pub max_iterations: usize,
    /// Minimum modularity improvement to continue
    pub min_improvement: f64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            min_improvement: DEFAULT_MIN_IMPROVEMENT,
        }
    }
}

/// Louvain-style community detection
pub struct LouvainClustering {
    config: LouvainConfig,
}

impl LouvainClustering {
    pub fn new() -> Self {
        Self {
            config: LouvainConfig::default(),
        }
    }

    pub fn with_config(config: LouvainConfig) -> Self {
        Self { config }
    }

    /// Run modularity optimization; labels are indexed like the store's nodes
    pub fn detect(&self, graph: &GraphStore) -> Partition {
        let n = graph.node_count();
        let mut partition = Partition::singletons(n);

        if n == 0 || graph.edge_count() == 0 {
            partition.converged = true;
            return partition;
        }

        let mut current_q = scoring::modularity(graph, &partition.labels);

        for iteration in 0..self.config.max_iterations {
            let snapshot = partition.labels.clone();
            let moves = self.local_moving_pass(graph, &mut partition.labels);
            partition.iterations = iteration + 1;

            if moves == 0 {
                partition.converged = true;
                break;
            }

            let new_q = scoring::modularity(graph, &partition.labels);
            if new_q < current_q {
                tracing::debug!(
                    "Pass {} lowered modularity {:.4} -> {:.4}, rolling back",
                    iteration + 1,
                    current_q,
                    new_q
                );
                partition.labels = snapshot;
                partition.converged = true;
                break;
            }

            let improvement = new_q - current_q;
            current_q = new_q;
            tracing::trace!(pass = iteration + 1, moves, modularity = new_q, "Louvain pass");

            if improvement <= self.config.min_improvement {
                partition.converged = true;
                break;
            }
        }

        partition
    }

    /// Move nodes to their best neighboring community; returns the number of moves
    fn local_moving_pass(&self, graph: &GraphStore, labels: &mut [usize]) -> usize {
        let mut moves = 0;

        for node in 0..labels.len() {
            let current = labels[node];

            // Ascending community order makes tie handling deterministic
            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for adj in graph.neighbors_at(node) {
                *links.entry(labels[adj.node]).or_default() += 1.0;
            }
            let links_to_current = links.get(&current).copied().unwrap_or(0.0);

            let mut best_community = current;
            let mut best_gain = 0.0;
            for (&community, &links_to_target) in &links {
                if community == current {
                    continue;
                }
                let gain = self.config.resolution * (links_to_target - links_to_current);
                if gain > best_gain {
                    best_gain = gain;
                    best_community = community;
                }
            }

            if best_community != current {
                labels[node] = best_community;
                moves += 1;
            }
        }

        moves
    }
}

impl Default for LouvainClustering {
    fn default() -> Self {
        Self::new()
    }
}
