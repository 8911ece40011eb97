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

//! Partition quality scores
//!
//! ## Modularity
//!
//! Q = Σc [ Lc / 2m − (dc / 2m)² ]
//!
//! Where:
//! - Lc = sum of adjacency entries inside community c (each internal edge counted twice)
//! - dc = total degree of the members of c
//! - m = number of edges
//!
//! ## Cohesion
//!
//! internal / (internal + external) edges of a member set; 1.0 for a
//! singleton, 0.0 for a multi-node set with no edges at all.

use std::collections::{BTreeMap, HashSet};
use topicgraph_core::GraphStore;

/// Global modularity of a labelling (one label per node index)
pub fn modularity(graph: &GraphStore, labels: &[usize]) -> f64 {
    let m = graph.edge_count();
    if m == 0 {
        return 0.0;
    }
    let two_m = 2.0 * m as f64;

    // Ordered by label so the sum is reproducible to the bit
    let mut internal: BTreeMap<usize, f64> = BTreeMap::new();
    let mut degree: BTreeMap<usize, f64> = BTreeMap::new();

    for (_, a, b) in graph.indexed_edges() {
        *degree.entry(labels[a]).or_default() += 1.0;
        *degree.entry(labels[b]).or_default() += 1.0;
        if labels[a] == labels[b] {
            *internal.entry(labels[a]).or_default() += 2.0;
        }
    }

    degree
        .iter()
        .map(|(label, &d)| {
            let l = internal.get(label).copied().unwrap_or(0.0);
            l / two_m - (d / two_m).powi(2)
        })
        .sum()
}

/// Cohesion of a set of node indices
pub fn cohesion(graph: &GraphStore, members: &HashSet<usize>) -> f64 {
    if members.len() == 1 {
        return 1.0;
    }

    let mut internal_endpoints = 0usize;
    let mut external = 0usize;
    for &i in members {
        for adj in graph.neighbors_at(i) {
            if members.contains(&adj.node) {
                internal_endpoints += 1;
            } else {
                external += 1;
            }
        }
    }

    let internal = internal_endpoints / 2;
    let total = internal + external;
    if total == 0 {
        0.0
    } else {
        internal as f64 / total as f64
    }
}
