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

//! Hierarchical roll-up of a base partition into one super-community level.
//!
//! Base communities at or above the median size each get their own level-1
//! parent; everything smaller is merged under a single "mixed" parent.

use crate::scoring;
use std::collections::HashSet;
use topicgraph_core::{Community, CommunityId, CommunityMembers, GraphStore};

/// Roll-up only happens above this many base communities
pub const MIN_COMMUNITIES_FOR_ROLLUP: usize = 10;

/// Median of the base community sizes
pub fn median_size(communities: &[Community]) -> f64 {
    let mut sizes: Vec<usize> = communities.iter().map(|c| c.size).collect();
    if sizes.is_empty() {
        return 0.0;
    }
    sizes.sort_unstable();
    let mid = sizes.len() / 2;
    if sizes.len() % 2 == 1 {
        sizes[mid] as f64
    } else {
        (sizes[mid - 1] + sizes[mid]) as f64 / 2.0
    }
}

/// Append level-1 communities and set `parent_id` on every base community.
///
/// `communities` must hold only level-0 communities. Returns `false` (and
/// changes nothing) when there are not enough communities to roll up.
pub fn roll_up(graph: &GraphStore, communities: &mut Vec<Community>) -> bool {
    if communities.len() <= MIN_COMMUNITIES_FOR_ROLLUP {
        return false;
    }

    let median = median_size(communities);
    let mut next_id: CommunityId = communities.iter().map(|c| c.id).max().map_or(0, |m| m + 1);
    let mut supers: Vec<Community> = Vec::new();
    let mut mixed_children: Vec<usize> = Vec::new();

    for (pos, community) in communities.iter_mut().enumerate() {
        if community.size as f64 >= median {
            community.parent_id = Some(next_id);
            supers.push(Community::rollup(next_id, vec![community.id]));
            next_id += 1;
        } else {
            mixed_children.push(pos);
        }
    }

    if !mixed_children.is_empty() {
        let mixed_id = next_id;
        let children = mixed_children
            .iter()
            .map(|&pos| {
                communities[pos].parent_id = Some(mixed_id);
                communities[pos].id
            })
            .collect();
        supers.push(Community::rollup(mixed_id, children));
    }

    for parent in supers.iter_mut() {
        let child_ids: HashSet<CommunityId> = match &parent.members {
            CommunityMembers::Communities(ids) => ids.iter().copied().collect(),
            CommunityMembers::Nodes(_) => HashSet::new(),
        };
        let nodes: HashSet<usize> = communities
            .iter()
            .filter(|c| child_ids.contains(&c.id))
            .flat_map(|c| c.members.node_ids().iter())
            .filter_map(|id| graph.index_of(id))
            .collect();
        parent.cohesion_score = scoring::cohesion(graph, &nodes);
    }

    tracing::debug!(
        base = communities.len(),
        super_communities = supers.len(),
        median,
        "Hierarchical roll-up"
    );
    communities.extend(supers);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicgraph_core::{Edge, Node};

    /// Disjoint paths of the given sizes, one community per path
    fn paths(sizes: &[usize]) -> (GraphStore, Vec<Community>) {
        let mut graph = GraphStore::new();
        let mut communities = Vec::new();
        for (cid, &size) in sizes.iter().enumerate() {
            let ids: Vec<String> = (0..size).map(|i| format!("c{cid}n{i}")).collect();
            for id in &ids {
                graph.add_node(Node::new(id.clone()));
            }
            for pair in ids.windows(2) {
                graph.add_edge(Edge::new(pair[0].clone(), pair[1].clone()));
            }
            communities.push(Community::new(cid as u32, ids));
        }
        (graph, communities)
    }

    #[test]
    fn test_median_size() {
        let (_, odd) = paths(&[1, 5, 3]);
        assert_eq!(median_size(&odd), 3.0);
        let (_, even) = paths(&[2, 4, 6, 8]);
        assert_eq!(median_size(&even), 5.0);
    }

    #[test]
    fn test_no_rollup_for_small_partitions() {
        let (graph, mut communities) = paths(&[2; 10]);
        assert!(!roll_up(&graph, &mut communities));
        assert_eq!(communities.len(), 10);
        assert!(communities.iter().all(|c| c.parent_id.is_none()));
    }

    #[test]
    fn test_rollup_large_and_mixed() {
        // median of [2,2,2,2,2,2,5,5,5,5,5,5] is 3.5
        let sizes = [2, 5, 2, 5, 2, 5, 2, 5, 2, 5, 2, 5];
        let (graph, mut communities) = paths(&sizes);
        assert!(roll_up(&graph, &mut communities));

        let base: Vec<_> = communities.iter().filter(|c| c.level == 0).collect();
        let supers: Vec<_> = communities.iter().filter(|c| c.level == 1).collect();
        assert_eq!(base.len(), 12);
        assert_eq!(supers.len(), 7);
        assert!(base.iter().all(|c| c.parent_id.is_some()));

        let mixed = supers.last().unwrap();
        assert_eq!(mixed.members, CommunityMembers::Communities(vec![0, 2, 4, 6, 8, 10]));
        assert_eq!(mixed.size, 6);
        // disjoint paths: every edge stays inside
        assert_eq!(mixed.cohesion_score, 1.0);

        let big = communities.iter().find(|c| c.id == 1).unwrap();
        let parent = supers.iter().find(|s| Some(s.id) == big.parent_id).unwrap();
        assert_eq!(parent.members, CommunityMembers::Communities(vec![1]));
    }
}
