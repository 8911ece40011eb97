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

//! Graph Store
//!
//! In-memory undirected graph holding attributed nodes and edges.
//! Uses adjacency lists keyed by dense node indices and supports:
//! - Node lookup by id or index (insertion order is preserved)
//! - At most one edge per unordered node pair
//! - Isolated-node pruning and induced subgraphs
//!
//! The store is built fresh per request and owned by a single pipeline run,
//! so it uses plain collections rather than concurrent maps.

use crate::entities::{Edge, GraphStats, Node, NodeId};
use std::collections::{HashMap, HashSet};

/// Entry in a node's adjacency list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacent {
    /// Neighbor node index
    pub node: usize,
    /// Index of the connecting edge
    pub edge: usize,
}

/// Outcome of an edge insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    Inserted,
    SelfLoop,
    UnknownEndpoint,
    Duplicate,
}

/// Undirected, attributed graph
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    endpoints: Vec<(usize, usize)>,
    pair_index: HashMap<(usize, usize), usize>,
    adjacency: Vec<Vec<Adjacent>>,
}

impl GraphStore {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node unless its id is already present.
    ///
    /// Returns `false` when the id exists; the first occurrence wins.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        true
    }

    /// Add an undirected edge between two existing, distinct nodes
    pub fn add_edge(&mut self, edge: Edge) -> EdgeInsert {
        if edge.source == edge.target {
            return EdgeInsert::SelfLoop;
        }
        let (Some(&a), Some(&b)) = (self.index.get(&edge.source), self.index.get(&edge.target))
        else {
            return EdgeInsert::UnknownEndpoint;
        };

        let key = pair_key(a, b);
        if self.pair_index.contains_key(&key) {
            return EdgeInsert::Duplicate;
        }

        let edge_idx = self.edges.len();
        self.pair_index.insert(key, edge_idx);
        self.edges.push(edge);
        self.endpoints.push((a, b));
        self.adjacency[a].push(Adjacent { node: b, edge: edge_idx });
        self.adjacency[b].push(Adjacent { node: a, edge: edge_idx });
        EdgeInsert::Inserted
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Dense index of a node id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    /// Node at a dense index. Panics when out of range.
    pub fn node_at(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn node_at_mut(&mut self, idx: usize) -> &mut Node {
        &mut self.nodes[idx]
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node indices of an edge's endpoints
    pub fn endpoints(&self, edge_idx: usize) -> (usize, usize) {
        self.endpoints[edge_idx]
    }

    /// Edges paired with their endpoint indices
    pub fn indexed_edges(&self) -> impl Iterator<Item = (&Edge, usize, usize)> {
        self.edges
            .iter()
            .zip(self.endpoints.iter())
            .map(|(e, &(a, b))| (e, a, b))
    }

    /// Adjacency list of the node at `idx`
    pub fn neighbors_at(&self, idx: usize) -> &[Adjacent] {
        &self.adjacency[idx]
    }

    /// Neighbor nodes of `id`, in edge insertion order
    pub fn neighbors(&self, id: &str) -> Vec<&Node> {
        self.index_of(id)
            .map(|i| {
                self.adjacency[i]
                    .iter()
                    .map(|adj| &self.nodes[adj.node])
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn degree_at(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    pub fn degree(&self, id: &str) -> Option<usize> {
        self.index_of(id).map(|i| self.degree_at(i))
    }

    /// The edge between two nodes, regardless of direction
    pub fn edge_between(&self, a: &str, b: &str) -> Option<&Edge> {
        let (a, b) = (self.index_of(a)?, self.index_of(b)?);
        self.pair_index
            .get(&pair_key(a, b))
            .map(|&e| &self.edges[e])
    }

    /// Remove every node with degree 0, returning how many were removed
    pub fn remove_isolated(&mut self) -> usize {
        let keep: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| !self.adjacency[i].is_empty())
            .collect();
        let removed = self.nodes.len() - keep.len();
        if removed > 0 {
            *self = self.induced_subgraph(&keep);
        }
        removed
    }

    /// Graph over the given node indices and the edges between them.
    ///
    /// Node and edge order follows the parent graph.
    pub fn induced_subgraph(&self, indices: &[usize]) -> GraphStore {
        let members: HashSet<usize> = indices.iter().copied().collect();
        let mut sub = GraphStore::new();

        let mut ordered: Vec<usize> = members.iter().copied().collect();
        ordered.sort_unstable();
        for &i in &ordered {
            sub.add_node(self.nodes[i].clone());
        }
        for (edge, a, b) in self.indexed_edges() {
            if members.contains(&a) && members.contains(&b) {
                sub.add_edge(edge.clone());
            }
        }
        sub
    }

    /// Get graph statistics
    pub fn stats(&self) -> GraphStats {
        let node_count = self.nodes.len();
        let edge_count = self.edges.len();

        let avg_degree = if node_count > 0 {
            2.0 * edge_count as f64 / node_count as f64
        } else {
            0.0
        };

        let density = if node_count > 1 {
            2.0 * edge_count as f64 / (node_count * (node_count - 1)) as f64
        } else {
            0.0
        };

        let mut node_type_distribution: HashMap<String, usize> = HashMap::new();
        let mut communities = HashSet::new();
        for node in &self.nodes {
            *node_type_distribution
                .entry(node.node_type.clone())
                .or_default() += 1;
            if let Some(c) = node.community {
                communities.insert(c);
            }
        }

        let mut edge_type_distribution: HashMap<String, usize> = HashMap::new();
        for edge in &self.edges {
            *edge_type_distribution
                .entry(edge.edge_type.clone())
                .or_default() += 1;
        }

        GraphStats {
            node_count,
            edge_count,
            community_count: communities.len(),
            avg_degree,
            density,
            node_type_distribution,
            edge_type_distribution,
        }
    }
}

/// Direction-agnostic key for a node pair
pub fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
