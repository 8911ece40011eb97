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

//! Graph Builder
//!
//! Turns raw extraction records into a [`GraphStore`]:
//!
//! ```text
//! nodes ──► truncate to node_limit ──► add-if-absent
//! edges ──► self-loop? ──► unknown endpoint? ──► low confidence (non-structural)? ──► duplicate pair?
//!                                                                                        │
//!                                                        prune degree-0 nodes ◄──────────┘
//! ```
//!
//! The confidence filter runs before deduplication, so a low-confidence
//! occurrence of a pair does not shadow a later accepted one.

use crate::entities::{Edge, EdgeInput, Node, NodeInput};
use crate::graph::{EdgeInsert, GraphStore};
use serde::{Deserialize, Serialize};

/// Graph construction options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Maximum number of input nodes considered (first N)
    #[serde(default = "default_node_limit")]
    pub node_limit: usize,

    /// Edges below this confidence are dropped unless structural
    #[serde(default = "default_min_edge_confidence")]
    pub min_edge_confidence: f64,

    /// Edge types exempt from confidence filtering (case-insensitive)
    #[serde(default = "default_structural_edge_types")]
    pub structural_edge_types: Vec<String>,
}

fn default_node_limit() -> usize {
    2000
}

fn default_min_edge_confidence() -> f64 {
    0.25
}

fn default_structural_edge_types() -> Vec<String> {
    ["parent", "parent-child", "child", "contains", "part-of"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            node_limit: default_node_limit(),
            min_edge_confidence: default_min_edge_confidence(),
            structural_edge_types: default_structural_edge_types(),
        }
    }
}

impl BuildOptions {
    /// Whether an edge type bypasses confidence filtering
    pub fn is_structural(&self, edge_type: &str) -> bool {
        self.structural_edge_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(edge_type))
    }
}

/// Counts of everything the builder discarded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub nodes_truncated: usize,
    pub duplicate_nodes: usize,
    pub self_loops: usize,
    pub unknown_endpoints: usize,
    pub low_confidence_edges: usize,
    pub duplicate_edges: usize,
    pub isolated_pruned: usize,
}

/// Constructs graph stores from extraction records
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    options: BuildOptions,
}

impl GraphBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a graph, discarding the report
    pub fn build(&self, nodes: &[NodeInput], edges: &[EdgeInput]) -> GraphStore {
        self.build_with_report(nodes, edges).0
    }

    /// Build a graph and report what was filtered.
    ///
    /// Deterministic for identical ordered input and options.
    pub fn build_with_report(
        &self,
        nodes: &[NodeInput],
        edges: &[EdgeInput],
    ) -> (GraphStore, BuildReport) {
        let _span = tracing::debug_span!(
            "build_graph",
            nodes = nodes.len(),
            edges = edges.len()
        )
        .entered();

        let mut report = BuildReport::default();
        let mut graph = GraphStore::new();

        let accepted = nodes.len().min(self.options.node_limit);
        report.nodes_truncated = nodes.len() - accepted;

        for input in &nodes[..accepted] {
            if !graph.add_node(Node::from_input(input)) {
                report.duplicate_nodes += 1;
            }
        }

        for input in edges {
            let edge = Edge::from_input(input);

            if edge.source == edge.target {
                report.self_loops += 1;
                continue;
            }
            if !graph.contains(&edge.source) || !graph.contains(&edge.target) {
                report.unknown_endpoints += 1;
                continue;
            }
            if edge.confidence < self.options.min_edge_confidence
                && !self.options.is_structural(&edge.edge_type)
            {
                report.low_confidence_edges += 1;
                continue;
            }

            match graph.add_edge(edge) {
                EdgeInsert::Inserted => {}
                EdgeInsert::Duplicate => report.duplicate_edges += 1,
                EdgeInsert::SelfLoop => report.self_loops += 1,
                EdgeInsert::UnknownEndpoint => report.unknown_endpoints += 1,
            }
        }

        report.isolated_pruned = graph.remove_isolated();

        if report.nodes_truncated > 0 {
            tracing::warn!(
                "Node limit {} reached, {} nodes ignored",
                self.options.node_limit,
                report.nodes_truncated
            );
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            ?report,
            "Graph built"
        );

        (graph, report)
    }
}
