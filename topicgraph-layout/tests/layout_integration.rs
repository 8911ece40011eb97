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


//! Integration tests for layout and export

use proptest::prelude::*;
use topicgraph_core::{EdgeInput, GraphBuilder, GraphStore, MetricCalculator, NodeInput};
use topicgraph_layout::{export, LayoutEngine, LayoutOptions};

fn annotated(nodes: &[NodeInput], edges: &[EdgeInput]) -> GraphStore {
    let mut graph = GraphBuilder::default().build(nodes, edges);
    MetricCalculator::new().annotate(&mut graph);
    graph
}

fn quick_options() -> LayoutOptions {
    LayoutOptions {
        force_iterations: 30,
        overlap_iterations: 50,
        ..Default::default()
    }
}

#[test]
fn test_single_isolated_node_exports_nothing() {
    let mut graph = annotated(&[NodeInput::new("solo")], &[]);
    assert!(graph.is_empty());

    let report = LayoutEngine::default().layout(&mut graph).unwrap();
    assert!(report.refined_clusters.is_empty());

    let out = export(&graph, 500.0).unwrap();
    assert!(out.elements.nodes.is_empty());
    assert!(out.elements.edges.is_empty());
    assert_eq!(
        serde_json::to_value(&out.elements).unwrap(),
        serde_json::json!({ "nodes": [], "edges": [] })
    );
}

#[test]
fn test_zero_confidence_edges_give_empty_layout() {
    let nodes: Vec<NodeInput> = (0..4).map(|i| NodeInput::new(format!("n{i}"))).collect();
    let edges = vec![
        EdgeInput::new("n0", "n1").confidence(0.0),
        EdgeInput::new("n2", "n3").confidence(0.0),
    ];
    let mut graph = annotated(&nodes, &edges);
    LayoutEngine::default().layout(&mut graph).unwrap();
    let out = export(&graph, 100.0).unwrap();
    assert!(out.elements.nodes.is_empty());
}

#[test]
fn test_dense_clique_is_refined_in_place() {
    let n = 150;
    let ids: Vec<String> = (0..n).map(|i| format!("k{i}")).collect();
    let nodes: Vec<NodeInput> = ids.iter().map(NodeInput::new).collect();
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push(EdgeInput::new(ids[i].clone(), ids[j].clone()).confidence(1.0));
        }
    }
    let mut graph = annotated(&nodes, &edges);
    assert_eq!(graph.node_count(), n);
    for node in graph.nodes_mut() {
        node.community = Some(0);
    }

    let engine = LayoutEngine::new(LayoutOptions {
        dense_cluster_threshold: 100,
        ..quick_options()
    });
    let report = engine.layout(&mut graph).unwrap();

    assert_eq!(report.refined_clusters.len(), 1);
    let cluster = &report.refined_clusters[0];
    assert_eq!(cluster.community, 0);
    assert_eq!(cluster.members, n);
    assert!((cluster.centroid_after.x - cluster.centroid_before.x).abs() < 1e-6);
    assert!((cluster.centroid_after.y - cluster.centroid_before.y).abs() < 1e-6);

    // the stored positions agree with the reported centroid
    let (sx, sy) = graph.nodes().iter().fold((0.0, 0.0), |(sx, sy), node| {
        let p = node.position.unwrap();
        (sx + p.x, sy + p.y)
    });
    assert!((sx / n as f64 - cluster.centroid_before.x).abs() < 1e-6);
    assert!((sy / n as f64 - cluster.centroid_before.y).abs() < 1e-6);
}

#[test]
fn test_small_community_not_refined() {
    let nodes: Vec<NodeInput> = ["a", "b", "c"].iter().map(|id| NodeInput::new(*id)).collect();
    let edges = vec![EdgeInput::new("a", "b"), EdgeInput::new("b", "c")];
    let mut graph = annotated(&nodes, &edges);
    for node in graph.nodes_mut() {
        node.community = Some(0);
    }
    let report = LayoutEngine::default().layout(&mut graph).unwrap();
    assert!(report.refined_clusters.is_empty());
}

fn arb_graph() -> impl Strategy<Value = GraphStore> {
    (0usize..25).prop_flat_map(|n| {
        let m = n.max(1);
        prop::collection::vec((0..m, 0..m, 0.0f64..1.0), 0..60).prop_map(move |raw| {
            let nodes: Vec<NodeInput> = (0..n).map(|i| NodeInput::new(format!("n{i}"))).collect();
            let edges: Vec<EdgeInput> = raw
                .into_iter()
                .map(|(a, b, c)| EdgeInput::new(format!("n{a}"), format!("n{b}")).confidence(c))
                .collect();
            annotated(&nodes, &edges)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn exported_positions_stay_in_viewport(mut graph in arb_graph(), viewport in 1.0f64..5000.0) {
        LayoutEngine::new(quick_options()).layout(&mut graph).unwrap();
        let out = export(&graph, viewport).unwrap();
        prop_assert_eq!(out.elements.nodes.len(), graph.node_count());
        for node in &out.elements.nodes {
            prop_assert!(-viewport <= node.x && node.x <= viewport);
            prop_assert!(-viewport <= node.y && node.y <= viewport);
        }
    }

    #[test]
    fn layout_never_emits_nan(mut graph in arb_graph()) {
        let report = LayoutEngine::new(quick_options()).layout(&mut graph).unwrap();
        prop_assert_eq!(report.seed_fallbacks, 0);
        let out = export(&graph, 1000.0).unwrap();
        prop_assert_eq!(out.position_fallbacks, 0);
        for node in &out.elements.nodes {
            prop_assert!(node.x.is_finite() && node.y.is_finite());
        }
    }
}
