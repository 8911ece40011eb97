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


//! Layout pipeline benchmarks
//!
//! Run with: cargo bench -p topicgraph-layout --bench layout_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use topicgraph_core::{EdgeInput, GraphBuilder, GraphStore, MetricCalculator, NodeInput};
use topicgraph_layout::{export, LayoutEngine, LayoutOptions};

/// Ring of `n` nodes with a deterministic chord every fifth node
fn generate_graph(n: usize) -> GraphStore {
    let nodes: Vec<NodeInput> = (0..n).map(|i| NodeInput::new(format!("n{i}"))).collect();
    let mut edges: Vec<EdgeInput> = (0..n)
        .map(|i| EdgeInput::new(format!("n{i}"), format!("n{}", (i + 1) % n)).confidence(0.9))
        .collect();
    edges.extend((0..n).step_by(5).map(|i| {
        EdgeInput::new(format!("n{i}"), format!("n{}", (i * 7 + 3) % n)).confidence(0.8)
    }));
    let mut graph = GraphBuilder::default().build(&nodes, &edges);
    MetricCalculator::new().annotate(&mut graph);
    graph
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.sample_size(10);

    for size in [50, 250, 1000] {
        let graph = generate_graph(size);
        let engine = LayoutEngine::new(LayoutOptions {
            force_iterations: 50,
            ..Default::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| {
                let mut graph = graph.clone();
                let report = engine.layout(&mut graph);
                black_box(report)
            })
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut graph = generate_graph(1000);
    let _ = LayoutEngine::default().layout(&mut graph);
    c.bench_function("export_1000", |b| b.iter(|| black_box(export(&graph, 1000.0))));
}

criterion_group!(benches, bench_layout, bench_export);
criterion_main!(benches);
