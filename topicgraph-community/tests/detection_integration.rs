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


//! Integration tests for community detection

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use topicgraph_community::scoring;
use topicgraph_community::{
    Algorithm, CommunityDetector, DetectOptions, LouvainClustering, Partition,
};
use topicgraph_core::{EdgeInput, GraphBuilder, GraphError, GraphStore, NodeInput};

const ALL_ALGORITHMS: [Algorithm; 3] = [
    Algorithm::Louvain,
    Algorithm::Leiden,
    Algorithm::LabelPropagation,
];

fn build(nodes: &[&str], edges: &[(&str, &str)]) -> GraphStore {
    let nodes: Vec<NodeInput> = nodes.iter().map(|id| NodeInput::new(*id)).collect();
    let edges: Vec<EdgeInput> = edges
        .iter()
        .map(|(s, t)| EdgeInput::new(*s, *t).confidence(0.9))
        .collect();
    GraphBuilder::default().build(&nodes, &edges)
}

fn two_triangles() -> GraphStore {
    build(
        &["a", "b", "c", "x", "y", "z"],
        &[("a", "b"), ("b", "c"), ("c", "a"), ("x", "y"), ("y", "z"), ("z", "x")],
    )
}

/// Node id -> number of level-0 communities containing it
fn membership_counts(graph: &GraphStore, options: DetectOptions) -> HashMap<String, usize> {
    let result = CommunityDetector::new(options).detect(graph).unwrap();
    let mut counts: HashMap<String, usize> =
        graph.nodes().iter().map(|n| (n.id.clone(), 0)).collect();
    for community in result.base_communities() {
        for id in community.members.node_ids() {
            *counts.get_mut(id).unwrap() += 1;
        }
    }
    counts
}

#[test]
fn test_path_graph_label_propagation_assigns_every_node() {
    let graph = build(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
    assert_eq!(graph.node_count(), 3);

    for seed in 0..20 {
        let options = DetectOptions {
            algorithm: Algorithm::LabelPropagation,
            seed: Some(seed),
            ..Default::default()
        };
        let result = CommunityDetector::new(options.clone()).detect(&graph).unwrap();
        assert!((1..=3).contains(&result.communities.len()));

        let counts = membership_counts(&graph, options);
        assert!(counts.values().all(|&c| c == 1));
    }
}

#[test]
fn test_disconnected_triangles_every_algorithm() {
    let graph = two_triangles();
    for algorithm in ALL_ALGORITHMS {
        let options = DetectOptions {
            algorithm,
            seed: Some(11),
            ..Default::default()
        };
        let result = CommunityDetector::new(options).detect(&graph).unwrap();
        assert!(
            result.communities.len() >= 2,
            "{algorithm} produced {} communities",
            result.communities.len()
        );

        for community in &result.communities {
            let ids = community.members.node_ids();
            let whole_triangle = ids.len() == 3
                && (ids.iter().all(|id| ["a", "b", "c"].contains(&id.as_str()))
                    || ids.iter().all(|id| ["x", "y", "z"].contains(&id.as_str())));
            if whole_triangle {
                assert_eq!(community.cohesion_score, 1.0);
            }
        }
    }
}

#[test]
fn test_deterministic_algorithms_find_both_triangles() {
    let graph = two_triangles();
    for algorithm in [Algorithm::Louvain, Algorithm::Leiden] {
        let result = CommunityDetector::new(DetectOptions::with_algorithm(algorithm))
            .detect(&graph)
            .unwrap();
        assert_eq!(result.communities.len(), 2);
        assert!(result.communities.iter().all(|c| c.cohesion_score == 1.0));
        assert!(result.communities.iter().all(|c| !c.poorly_connected));
        assert!((result.modularity - 0.5).abs() < 1e-9);
        assert_eq!(result.hierarchy_levels, 1);
    }
}

#[test]
fn test_unknown_algorithm_from_options_json() {
    let parsed: Result<DetectOptions, _> =
        serde_json::from_value(serde_json::json!({ "algorithm": "girvan-newman" }));
    let err = parsed.unwrap_err().to_string();
    assert!(err.contains("louvain, leiden, label-propagation"));

    let err = "girvan-newman".parse::<Algorithm>().unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)));
}

#[test]
fn test_hierarchical_rollup_sets_parents() {
    // twelve disjoint triangles plus two disjoint 5-cliques
    let mut ids: Vec<String> = Vec::new();
    let mut pairs: Vec<(String, String)> = Vec::new();
    for t in 0..12 {
        let tri: Vec<String> = (0..3).map(|i| format!("t{t}_{i}")).collect();
        pairs.push((tri[0].clone(), tri[1].clone()));
        pairs.push((tri[1].clone(), tri[2].clone()));
        pairs.push((tri[2].clone(), tri[0].clone()));
        ids.extend(tri);
    }
    for k in 0..2 {
        let clique: Vec<String> = (0..5).map(|i| format!("k{k}_{i}")).collect();
        for i in 0..5 {
            for j in (i + 1)..5 {
                pairs.push((clique[i].clone(), clique[j].clone()));
            }
        }
        ids.extend(clique);
    }
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let pair_refs: Vec<(&str, &str)> =
        pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let graph = build(&id_refs, &pair_refs);

    let result = CommunityDetector::new(DetectOptions {
        hierarchical: true,
        ..Default::default()
    })
    .detect(&graph)
    .unwrap();

    assert_eq!(result.hierarchy_levels, 2);
    let base: Vec<_> = result.communities.iter().filter(|c| c.level == 0).collect();
    let supers: Vec<_> = result.communities.iter().filter(|c| c.level == 1).collect();
    assert_eq!(base.len(), 14);
    assert!(!supers.is_empty());
    for community in &base {
        let parent = community.parent_id.expect("level-0 community without parent");
        assert!(supers.iter().any(|s| s.id == parent));
    }

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["communities"][0]["memberIds"].is_array());
    assert!(json["communities"][0]["cohesionScore"].is_number());
    assert_eq!(json["hierarchyLevels"], 2);
}

#[test]
fn test_injected_rng_matches_seeded_detect() {
    let graph = build(
        &["a", "b", "c", "d", "e"],
        &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")],
    );
    let options = DetectOptions {
        algorithm: Algorithm::LabelPropagation,
        seed: Some(99),
        ..Default::default()
    };
    let detector = CommunityDetector::new(options);
    let seeded = detector.detect(&graph).unwrap();
    let injected = detector
        .detect_with_rng(&graph, &mut StdRng::seed_from_u64(99))
        .unwrap();
    assert_eq!(seeded.communities, injected.communities);
}

fn arb_connected_graph() -> impl Strategy<Value = GraphStore> {
    (3usize..14).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..25).prop_map(move |extra| {
            let ids: Vec<String> = (0..n).map(|i| format!("n{i}")).collect();
            let nodes: Vec<NodeInput> = ids.iter().map(NodeInput::new).collect();
            // spanning path keeps the graph connected with at least 2 edges
            let mut edges: Vec<EdgeInput> = (1..n)
                .map(|i| EdgeInput::new(ids[i - 1].clone(), ids[i].clone()))
                .collect();
            edges.extend(
                extra
                    .into_iter()
                    .map(|(a, b)| EdgeInput::new(ids[a].clone(), ids[b].clone())),
            );
            GraphBuilder::default().build(&nodes, &edges)
        })
    })
}

proptest! {
    #[test]
    fn louvain_never_below_singleton_modularity(graph in arb_connected_graph()) {
        let singleton = scoring::modularity(&graph, &Partition::singletons(graph.node_count()).labels);
        let partition = LouvainClustering::new().detect(&graph);
        prop_assert!(scoring::modularity(&graph, &partition.labels) >= singleton);
    }

    #[test]
    fn base_partition_is_complete(graph in arb_connected_graph(), seed in any::<u64>()) {
        for algorithm in ALL_ALGORITHMS {
            let counts = membership_counts(&graph, DetectOptions {
                algorithm,
                seed: Some(seed),
                ..Default::default()
            });
            prop_assert!(counts.values().all(|&c| c == 1), "{} left a node unassigned or duplicated", algorithm);
        }
    }
}
