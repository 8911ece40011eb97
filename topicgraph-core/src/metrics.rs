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

//! Metric Calculator
//!
//! Degree-based node metrics and bounded neighborhood queries.
//!
//! Importance is plain degree centrality, not a weighted PageRank: it is
//! cheap, stable across runs and good enough to rank nodes for sizing.
//!
//! Neighborhood queries cap the number of adjacency entries examined per
//! expanded node (`max_fanout`). On dense hubs the result is "up to N
//! neighbors" rather than all of them; `Neighborhood::truncated` says when
//! that happened.

use crate::entities::NodeId;
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

pub const MIN_NODE_SIZE: f64 = 25.0;
pub const MAX_NODE_SIZE: f64 = 60.0;

/// Size assigned when every node has the same importance
pub fn size_midpoint() -> f64 {
    MIN_NODE_SIZE + 0.5 * (MAX_NODE_SIZE - MIN_NODE_SIZE)
}

/// Result of a bounded breadth-first traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighborhood {
    pub center: NodeId,
    /// Reached nodes, centre first, in visit order
    pub nodes: Vec<NodeId>,
    /// Traversed edges as (source, target) pairs
    pub edges: Vec<(NodeId, NodeId)>,
    /// Deepest hop count actually reached
    pub depth_reached: usize,
    /// Whether any expansion hit the fanout cap
    pub truncated: bool,
}

/// Computes degree metrics and neighborhood queries over a graph store
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricCalculator;

impl MetricCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Set `importance` to the node degree
    pub fn compute_importance(&self, graph: &mut GraphStore) {
        let degrees: Vec<usize> = (0..graph.node_count()).map(|i| graph.degree_at(i)).collect();
        for (node, degree) in graph.nodes_mut().zip(degrees) {
            node.importance = u32::try_from(degree).unwrap_or(u32::MAX);
        }
    }

    /// Map importance linearly into [MIN_NODE_SIZE, MAX_NODE_SIZE]
    pub fn compute_sizes(&self, graph: &mut GraphStore) {
        let (min, max) = graph
            .nodes()
            .iter()
            .map(|n| n.importance)
            .fold((u32::MAX, 0), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let span = max.saturating_sub(min);
        for node in graph.nodes_mut() {
            let normalized = if span == 0 {
                0.5
            } else {
                (node.importance - min) as f64 / span as f64
            };
            node.size = (MIN_NODE_SIZE + normalized * (MAX_NODE_SIZE - MIN_NODE_SIZE))
                .clamp(MIN_NODE_SIZE, MAX_NODE_SIZE);
        }
    }

    /// Compute importance then size
    pub fn annotate(&self, graph: &mut GraphStore) {
        self.compute_importance(graph);
        self.compute_sizes(graph);
    }

    /// Breadth-first traversal up to `depth` hops from `center`.
    ///
    /// Each expanded node examines at most `max_fanout` adjacency entries,
    /// so hub-heavy neighborhoods are sampled, not enumerated.
    pub fn neighborhood(
        &self,
        graph: &GraphStore,
        center: &str,
        depth: usize,
        max_fanout: usize,
    ) -> GraphResult<Neighborhood> {
        let start = graph
            .index_of(center)
            .ok_or_else(|| GraphError::NodeNotFound(center.to_string()))?;

        let mut visited: HashSet<usize> = HashSet::new();
        let mut seen_edges: HashSet<usize> = HashSet::new();
        let mut queue = VecDeque::new();
        let mut result = Neighborhood {
            center: center.to_string(),
            nodes: vec![center.to_string()],
            edges: Vec::new(),
            depth_reached: 0,
            truncated: false,
        };

        visited.insert(start);
        queue.push_back((start, 0usize));

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= depth {
                continue;
            }
            let adjacency = graph.neighbors_at(current);
            if adjacency.len() > max_fanout {
                result.truncated = true;
            }

            for adj in adjacency.iter().take(max_fanout) {
                if seen_edges.insert(adj.edge) {
                    let edge = &graph.edges()[adj.edge];
                    result.edges.push((edge.source.clone(), edge.target.clone()));
                }
                if visited.insert(adj.node) {
                    result.nodes.push(graph.node_at(adj.node).id.clone());
                    result.depth_reached = result.depth_reached.max(hops + 1);
                    queue.push_back((adj.node, hops + 1));
                }
            }
        }

        Ok(result)
    }

    /// The `k` most important node ids; ties keep insertion order
    pub fn top_by_importance(&self, graph: &GraphStore, k: usize) -> Vec<NodeId> {
        let mut ranked: Vec<(usize, u32)> = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, n)| (i, n.importance))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(k)
            .map(|(i, _)| graph.node_at(i).id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Edge, Node};

    fn star(leaves: usize) -> GraphStore {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("hub"));
        for i in 0..leaves {
            let id = format!("leaf{i}");
            graph.add_node(Node::new(id.clone()));
            graph.add_edge(Edge::new("hub", id));
        }
        graph
    }

    #[test]
    fn test_importance_is_degree() {
        let mut graph = star(4);
        let metrics = MetricCalculator::new();
        metrics.annotate(&mut graph);
        assert_eq!(graph.node("hub").unwrap().importance, 4);
        assert_eq!(graph.node("leaf0").unwrap().importance, 1);
        assert_eq!(graph.node("hub").unwrap().size, MAX_NODE_SIZE);
        assert_eq!(graph.node("leaf3").unwrap().size, MIN_NODE_SIZE);
    }

    #[test]
    fn test_equal_importance_gets_midpoint() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b"));
        graph.add_edge(Edge::new("a", "b"));
        MetricCalculator::new().annotate(&mut graph);
        for node in graph.nodes() {
            assert_eq!(node.size, size_midpoint());
        }
    }

    #[test]
    fn test_neighborhood_depth_limit() {
        let mut graph = GraphStore::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(Node::new(id));
        }
        graph.add_edge(Edge::new("a", "b"));
        graph.add_edge(Edge::new("b", "c"));
        graph.add_edge(Edge::new("c", "d"));

        let hood = MetricCalculator::new()
            .neighborhood(&graph, "a", 2, 10)
            .unwrap();
        assert_eq!(hood.nodes, vec!["a", "b", "c"]);
        assert_eq!(hood.depth_reached, 2);
        assert!(!hood.truncated);
    }

    #[test]
    fn test_neighborhood_fanout_cap() {
        let graph = star(10);
        let hood = MetricCalculator::new()
            .neighborhood(&graph, "hub", 1, 3)
            .unwrap();
        assert_eq!(hood.nodes.len(), 4);
        assert_eq!(hood.edges.len(), 3);
        assert!(hood.truncated);
    }

    #[test]
    fn test_neighborhood_unknown_center() {
        let err = MetricCalculator::new()
            .neighborhood(&GraphStore::new(), "ghost", 1, 1)
            .unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(_)));
    }

    #[test]
    fn test_top_by_importance() {
        let mut graph = star(3);
        MetricCalculator::new().annotate(&mut graph);
        let top = MetricCalculator::new().top_by_importance(&graph, 2);
        assert_eq!(top, vec!["hub", "leaf0"]);
    }
}
