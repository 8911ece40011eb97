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


//! End-to-end pipeline
//!
//! ```text
//! GraphInput ──► build ──► annotate ──► detect ──► apply ──► layout ──► export
//! ```
//!
//! Each run owns its graph store; the engine itself holds only configuration.

use crate::config::EngineConfig;
use crate::input::GraphInput;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use topicgraph_community::{CommunityDetector, DetectionResult};
use topicgraph_core::{BuildReport, GraphBuilder, GraphResult, GraphStore, MetricCalculator};
use topicgraph_layout::{export, Elements, LayoutEngine, LayoutReport};

/// Counters from every stage of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub build: BuildReport,
    pub layout: LayoutReport,
    pub position_fallbacks: usize,
    pub elapsed_ms: u64,
}

/// Everything a consumer needs to render the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub elements: Elements,
    pub communities: DetectionResult,
    pub diagnostics: Diagnostics,
}

/// Runs the knowledge-graph pipeline
#[derive(Debug, Clone, Default)]
pub struct TopicGraphEngine {
    config: EngineConfig,
}

impl TopicGraphEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Configuration for one request: engine config with request options applied
    pub fn effective_config(&self, input: &GraphInput) -> GraphResult<EngineConfig> {
        let config = input.options.overlay(&self.config);
        config.validate()?;
        Ok(config)
    }

    /// Build and annotate the graph store for `input`
    pub fn build_graph(&self, input: &GraphInput) -> GraphResult<(GraphStore, BuildReport)> {
        let config = self.effective_config(input)?;
        Ok(Self::build_with(&config, input))
    }

    fn build_with(config: &EngineConfig, input: &GraphInput) -> (GraphStore, BuildReport) {
        let (mut graph, report) =
            GraphBuilder::new(config.graph.clone()).build_with_report(&input.nodes, &input.edges);
        MetricCalculator::new().annotate(&mut graph);
        (graph, report)
    }

    /// Build, annotate and detect communities without laying out
    pub fn detect(&self, input: &GraphInput) -> GraphResult<(GraphStore, DetectionResult)> {
        let config = self.effective_config(input)?;
        let (mut graph, _) = Self::build_with(&config, input);
        let detector = CommunityDetector::new(config.community.clone());
        let result = detector.detect(&graph)?;
        detector.apply(&mut graph, &result);
        Ok((graph, result))
    }

    /// Run every stage
    pub fn run(&self, input: &GraphInput) -> GraphResult<PipelineOutput> {
        let started = Instant::now();
        let config = self.effective_config(input)?;
        let _span = tracing::info_span!(
            "pipeline",
            input_nodes = input.nodes.len(),
            input_edges = input.edges.len()
        )
        .entered();

        let (mut graph, build_report) = Self::build_with(&config, input);

        let detector = CommunityDetector::new(config.community.clone());
        let communities = detector.detect(&graph)?;
        detector.apply(&mut graph, &communities);

        let layout_report = LayoutEngine::new(config.layout.clone()).layout(&mut graph)?;
        let exported = export(&graph, config.export.viewport)?;

        let diagnostics = Diagnostics {
            build: build_report,
            layout: layout_report,
            position_fallbacks: exported.position_fallbacks,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            communities = communities.communities.len(),
            modularity = communities.modularity,
            elapsed_ms = diagnostics.elapsed_ms,
            "Pipeline finished"
        );

        Ok(PipelineOutput {
            elements: exported.elements,
            communities,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicgraph_core::{EdgeInput, GraphError, NodeInput};

    fn triangle_input() -> GraphInput {
        GraphInput::new(
            vec![NodeInput::new("a"), NodeInput::new("b"), NodeInput::new("c")],
            vec![
                EdgeInput::new("a", "b").confidence(0.9),
                EdgeInput::new("b", "c").confidence(0.9),
                EdgeInput::new("c", "a").confidence(0.9),
            ],
        )
    }

    #[test]
    fn test_run_annotates_everything() {
        let output = TopicGraphEngine::default().run(&triangle_input()).unwrap();
        assert_eq!(output.elements.nodes.len(), 3);
        assert_eq!(output.elements.edges.len(), 3);
        assert_eq!(output.communities.communities.len(), 1);
        for node in &output.elements.nodes {
            assert_eq!(node.importance, 2);
            assert_eq!(node.community, Some(0));
            assert!(node.x.abs() <= 1000.0 && node.y.abs() <= 1000.0);
        }
    }

    #[test]
    fn test_invalid_request_option_is_config_error() {
        let mut input = triangle_input();
        input.options.min_edge_confidence = Some(2.0);
        assert!(matches!(
            TopicGraphEngine::default().run(&input),
            Err(GraphError::Config(_))
        ));
    }

    #[test]
    fn test_detect_only() {
        let (graph, result) = TopicGraphEngine::default().detect(&triangle_input()).unwrap();
        assert!(graph.nodes().iter().all(|n| n.community == Some(0)));
        assert!(graph.nodes().iter().all(|n| n.position.is_none()));
        assert_eq!(result.hierarchy_levels, 1);
    }
}
