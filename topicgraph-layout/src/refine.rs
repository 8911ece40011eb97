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


//! Dense-cluster Refinement
//!
//! A community with more members than `dense_cluster_threshold` tends to
//! collapse into a clump under the global forces. Each such community is
//! laid out again on its own (force pass, then overlap removal) at a
//! fraction of the global scale, and translated back so its centroid
//! lands where it was before.

use crate::engine::LayoutOptions;
use crate::force::{self, ForceParams};
use crate::overlap;
use crate::seed::centroid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use topicgraph_core::{CommunityId, GraphStore, Position};

/// One community that went through local refinement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinedCluster {
    pub community: CommunityId,
    pub members: usize,
    pub centroid_before: Position,
    pub centroid_after: Position,
}

/// Node indices of every community larger than `threshold`, by community id
pub fn dense_clusters(graph: &GraphStore, threshold: usize) -> BTreeMap<CommunityId, Vec<usize>> {
    let mut groups: BTreeMap<CommunityId, Vec<usize>> = BTreeMap::new();
    for (i, node) in graph.nodes().iter().enumerate() {
        if let Some(community) = node.community {
            groups.entry(community).or_default().push(i);
        }
    }
    groups.retain(|_, members| members.len() > threshold);
    groups
}

/// Refine every dense community in place.
///
/// `positions` and `radii` are indexed like `graph`'s nodes. Clusters run one
/// after another and each writes back only its own members.
pub fn refine_dense_clusters(
    graph: &GraphStore,
    positions: &mut [Position],
    radii: &[f64],
    options: &LayoutOptions,
) -> (Vec<RefinedCluster>, usize) {
    let mut refined = Vec::new();
    let mut numeric_fallbacks = 0;

    for (community, members) in dense_clusters(graph, options.dense_cluster_threshold) {
        let _span = tracing::debug_span!("refine_cluster", community, members = members.len()).entered();

        // induced_subgraph keeps ascending index order, which `members` already has
        let sub = graph.induced_subgraph(&members);
        let before: Vec<Position> = members.iter().map(|&i| positions[i]).collect();
        let centroid_before = centroid(&before);

        let mut local: Vec<Position> = before
            .iter()
            .map(|p| {
                Position::new(
                    (p.x - centroid_before.x) * options.refine_scale,
                    (p.y - centroid_before.y) * options.refine_scale,
                )
            })
            .collect();
        let local_radii: Vec<f64> = members.iter().map(|&i| radii[i]).collect();

        let outcome = force::run(
            &sub,
            &mut local,
            &ForceParams {
                scale: options.scale * options.refine_scale,
                iterations: options.force_iterations,
                gravity: options.gravity,
                barnes_hut_threshold: options.barnes_hut_threshold,
                theta: options.barnes_hut_theta,
            },
        );
        numeric_fallbacks += outcome.numeric_fallbacks;
        overlap::remove_overlaps(&mut local, &local_radii, options.overlap_iterations);

        let local_centroid = centroid(&local);
        for (&i, p) in members.iter().zip(&local) {
            let placed = Position::new(
                p.x - local_centroid.x + centroid_before.x,
                p.y - local_centroid.y + centroid_before.y,
            );
            if placed.is_finite() {
                positions[i] = placed;
            } else {
                numeric_fallbacks += 1;
            }
        }

        let after: Vec<Position> = members.iter().map(|&i| positions[i]).collect();
        let centroid_after = centroid(&after);
        tracing::debug!(
            "Refined community {} ({} members), centroid drift {:.3}",
            community,
            members.len(),
            ((centroid_after.x - centroid_before.x).powi(2)
                + (centroid_after.y - centroid_before.y).powi(2))
            .sqrt()
        );

        refined.push(RefinedCluster {
            community,
            members: members.len(),
            centroid_before,
            centroid_after,
        });
    }

    (refined, numeric_fallbacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicgraph_core::{Edge, Node};

    fn star(size: usize, community: CommunityId) -> GraphStore {
        let mut graph = GraphStore::new();
        let mut hub = Node::new("hub");
        hub.community = Some(community);
        graph.add_node(hub);
        for i in 0..size - 1 {
            let mut leaf = Node::new(format!("leaf{i}"));
            leaf.community = Some(community);
            graph.add_node(leaf);
            graph.add_edge(Edge::new("hub", format!("leaf{i}")));
        }
        graph
    }

    #[test]
    fn test_only_clusters_above_threshold() {
        let mut graph = star(5, 0);
        let mut extra = Node::new("other");
        extra.community = Some(1);
        graph.add_node(extra);

        let clusters = dense_clusters(&graph, 4);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[&0].len(), 5);
        assert!(dense_clusters(&graph, 5).is_empty());
    }

    #[test]
    fn test_refinement_keeps_centroid() {
        let graph = star(12, 3);
        let mut positions: Vec<Position> = (0..12)
            .map(|i| Position::new(400.0 + (i % 4) as f64, -200.0 + (i / 4) as f64))
            .collect();
        let radii = vec![20.0; 12];
        let options = LayoutOptions {
            dense_cluster_threshold: 10,
            ..Default::default()
        };

        let (refined, fallbacks) = refine_dense_clusters(&graph, &mut positions, &radii, &options);
        assert_eq!(fallbacks, 0);
        assert_eq!(refined.len(), 1);
        let cluster = &refined[0];
        assert_eq!(cluster.community, 3);
        assert_eq!(cluster.members, 12);
        assert!((cluster.centroid_after.x - cluster.centroid_before.x).abs() < 1e-6);
        assert!((cluster.centroid_after.y - cluster.centroid_before.y).abs() < 1e-6);
        // de-clumped: the initial 4x3 block was only a few units wide
        let spread = positions.iter().map(|p| (p.x - 400.0).abs()).fold(0.0, f64::max);
        assert!(spread > 10.0);
    }
}
