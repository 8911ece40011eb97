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

//! Label Propagation
//!
//! Each node starts with a unique label and repeatedly adopts the most
//! common label among its neighbors, visiting nodes in a freshly shuffled
//! order every pass. Ties are broken by a random draw, so results differ
//! across runs unless the random source is seeded. A pass with zero label
//! changes ends the run early.

use crate::partition::Partition;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use topicgraph_core::GraphStore;

pub const DEFAULT_MAX_ITERATIONS: usize = 30;

/// Label propagation community detection
pub struct LabelPropagation {
    max_iterations: usize,
}

impl LabelPropagation {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Run label propagation with the given random source
    pub fn detect<R: Rng + ?Sized>(&self, graph: &GraphStore, rng: &mut R) -> Partition {
        let n = graph.node_count();
        let mut partition = Partition::singletons(n);
        let mut order: Vec<usize> = (0..n).collect();

        for iteration in 0..self.max_iterations {
            order.shuffle(rng);
            let mut changes = 0;

            for &node in &order {
                if let Some(label) = self.majority_label(graph, &partition.labels, node, rng) {
                    if label != partition.labels[node] {
                        partition.labels[node] = label;
                        changes += 1;
                    }
                }
            }

            partition.iterations = iteration + 1;
            if changes == 0 {
                partition.converged = true;
                break;
            }
        }

        if !partition.converged {
            tracing::debug!(
                "Label propagation stopped after {} passes without converging",
                partition.iterations
            );
        }
        partition
    }

    /// Most frequent neighbor label, random among ties; `None` without neighbors
    fn majority_label<R: Rng + ?Sized>(
        &self,
        graph: &GraphStore,
        labels: &[usize],
        node: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for adj in graph.neighbors_at(node) {
            *counts.entry(labels[adj.node]).or_default() += 1;
        }

        let max = counts.values().copied().max()?;
        let tied: Vec<usize> = counts
            .into_iter()
            .filter(|&(_, count)| count == max)
            .map(|(label, _)| label)
            .collect();

        if tied.len() == 1 {
            Some(tied[0])
        } else {
            tied.choose(rng).copied()
        }
    }
}

impl Default for LabelPropagation {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}
