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


//! Layout Engine
//!
//! Runs the layout stages in order over a [`GraphStore`] and writes the
//! final position onto every node:
//!
//! 1. circular seed
//! 2. global force pass
//! 3. global overlap removal
//! 4. dense-cluster refinement
//!
//! Non-finite coordinates never reach the store; each substitution is
//! counted in the returned [`LayoutReport`].

use crate::force::{self, ForceMode, ForceParams};
use crate::overlap;
use crate::refine::{self, RefinedCluster};
use crate::seed;
use serde::{Deserialize, Serialize};
use topicgraph_core::{GraphError, GraphResult, GraphStore, Position};

/// Layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Radius of the seed circle and reference length of the force model
    #[serde(default = "default_scale")]
    pub scale: f64,

    #[serde(default = "default_force_iterations")]
    pub force_iterations: usize,

    #[serde(default = "default_overlap_iterations")]
    pub overlap_iterations: usize,

    /// Collision radius is size / 2 times this
    #[serde(default = "default_overlap_margin")]
    pub overlap_margin: f64,

    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Node count above which repulsion uses Barnes-Hut
    #[serde(default = "default_barnes_hut_threshold")]
    pub barnes_hut_threshold: usize,

    #[serde(default = "default_barnes_hut_theta")]
    pub barnes_hut_theta: f64,

    /// Communities with more members than this are refined on their own
    #[serde(default = "default_dense_cluster_threshold")]
    pub dense_cluster_threshold: usize,

    /// Scale of a refined cluster relative to `scale`
    #[serde(default = "default_refine_scale")]
    pub refine_scale: f64,
}

fn default_scale() -> f64 {
    1000.0
}

fn default_force_iterations() -> usize {
    150
}

fn default_overlap_iterations() -> usize {
    300
}

fn default_overlap_margin() -> f64 {
    1.15
}

fn default_gravity() -> f64 {
    0.05
}

fn default_barnes_hut_threshold() -> usize {
    300
}

fn default_barnes_hut_theta() -> f64 {
    0.8
}

fn default_dense_cluster_threshold() -> usize {
    100
}

fn default_refine_scale() -> f64 {
    0.35
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            force_iterations: default_force_iterations(),
            overlap_iterations: default_overlap_iterations(),
            overlap_margin: default_overlap_margin(),
            gravity: default_gravity(),
            barnes_hut_threshold: default_barnes_hut_threshold(),
            barnes_hut_theta: default_barnes_hut_theta(),
            dense_cluster_threshold: default_dense_cluster_threshold(),
            refine_scale: default_refine_scale(),
        }
    }
}

impl LayoutOptions {
    pub fn validate(&self) -> GraphResult<()> {
        let positive = [
            ("scale", self.scale),
            ("overlap_margin", self.overlap_margin),
            ("barnes_hut_theta", self.barnes_hut_theta),
            ("refine_scale", self.refine_scale),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GraphError::invalid(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(GraphError::invalid(format!(
                "gravity must be zero or positive, got {}",
                self.gravity
            )));
        }
        Ok(())
    }

    fn force_params(&self) -> ForceParams {
        ForceParams {
            scale: self.scale,
            iterations: self.force_iterations,
            gravity: self.gravity,
            barnes_hut_threshold: self.barnes_hut_threshold,
            theta: self.barnes_hut_theta,
        }
    }
}

/// Diagnostics from one layout run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    /// Nodes the seed stage put at the origin
    pub seed_fallbacks: usize,
    /// Non-finite values discarded during force passes and write-back
    pub numeric_fallbacks: usize,
    pub force_mode: ForceMode,
    pub overlap_passes: usize,
    /// Intersecting pairs left after every stage
    pub remaining_overlaps: usize,
    pub refined_clusters: Vec<RefinedCluster>,
}

/// Positions the nodes of a graph store
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out `graph` in place.
    ///
    /// Expects sizes and communities to be annotated already; an empty graph
    /// yields an empty report.
    pub fn layout(&self, graph: &mut GraphStore) -> GraphResult<LayoutReport> {
        self.options.validate()?;

        let n = graph.node_count();
        let mut report = LayoutReport::default();
        if n == 0 {
            return Ok(report);
        }

        let _span = tracing::info_span!("layout", nodes = n, edges = graph.edge_count()).entered();

        let (mut positions, seed_fallbacks) = seed::circular(n, self.options.scale);
        report.seed_fallbacks = seed_fallbacks;

        let radii: Vec<f64> = graph
            .nodes()
            .iter()
            .map(|node| node.size / 2.0 * self.options.overlap_margin)
            .collect();

        let outcome = force::run(graph, &mut positions, &self.options.force_params());
        report.force_mode = outcome.mode;
        report.numeric_fallbacks += outcome.numeric_fallbacks;

        let overlap_outcome =
            overlap::remove_overlaps(&mut positions, &radii, self.options.overlap_iterations);
        report.overlap_passes = overlap_outcome.passes;

        let (refined, refine_fallbacks) =
            refine::refine_dense_clusters(graph, &mut positions, &radii, &self.options);
        report.refined_clusters = refined;
        report.numeric_fallbacks += refine_fallbacks;

        report.remaining_overlaps = if report.refined_clusters.is_empty() {
            overlap_outcome.remaining
        } else {
            overlap::count_overlaps(&positions, &radii)
        };

        for (node, p) in graph.nodes_mut().zip(positions) {
            node.position = Some(if p.is_finite() {
                p
            } else {
                report.numeric_fallbacks += 1;
                Position::ORIGIN
            });
        }

        if report.seed_fallbacks + report.numeric_fallbacks > 0 {
            tracing::warn!(
                seed = report.seed_fallbacks,
                numeric = report.numeric_fallbacks,
                "Layout substituted non-finite coordinates"
            );
        }
        tracing::debug!(
            force_mode = ?report.force_mode,
            overlap_passes = report.overlap_passes,
            remaining_overlaps = report.remaining_overlaps,
            refined = report.refined_clusters.len(),
            "Layout finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicgraph_core::{Edge, MetricCalculator, Node};

    fn triangle() -> GraphStore {
        let mut graph = GraphStore::new();
        for id in ["a", "b", "c"] {
            graph.add_node(Node::new(id));
        }
        graph.add_edge(Edge::new("a", "b"));
        graph.add_edge(Edge::new("b", "c"));
        graph.add_edge(Edge::new("c", "a"));
        MetricCalculator::new().annotate(&mut graph);
        graph
    }

    #[test]
    fn test_every_node_positioned() {
        let mut graph = triangle();
        let report = LayoutEngine::default().layout(&mut graph).unwrap();
        assert!(graph.nodes().iter().all(|n| n.position.is_some_and(|p| p.is_finite())));
        assert_eq!(report.force_mode, ForceMode::Exact);
        assert_eq!(report.seed_fallbacks, 0);
        assert!(report.refined_clusters.is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let mut graph = GraphStore::new();
        let report = LayoutEngine::default().layout(&mut graph).unwrap();
        assert_eq!(report, LayoutReport::default());
    }

    #[test]
    fn test_layout_is_deterministic() {
        let mut first = triangle();
        let mut second = triangle();
        LayoutEngine::default().layout(&mut first).unwrap();
        LayoutEngine::default().layout(&mut second).unwrap();
        let a: Vec<_> = first.nodes().iter().map(|n| n.position).collect();
        let b: Vec<_> = second.nodes().iter().map(|n| n.position).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let engine = LayoutEngine::new(LayoutOptions {
            scale: f64::NAN,
            ..Default::default()
        });
        assert!(matches!(
            engine.layout(&mut triangle()),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: LayoutOptions = serde_json::from_str(r#"{"force_iterations": 20}"#).unwrap();
        assert_eq!(options.force_iterations, 20);
        assert_eq!(options.dense_cluster_threshold, 100);
    }
}
