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


//! Viewport export
//!
//! Rescales final positions into `[-viewport, viewport]` on each axis
//! independently and flattens the store into renderable elements.

use serde::{Deserialize, Serialize};
use topicgraph_core::{CommunityId, GraphError, GraphResult, GraphStore, Position};

/// A positioned node ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub confidence: f64,
    pub importance: u32,
    pub community: Option<CommunityId>,
    pub color: String,
    pub size: f64,
    pub x: f64,
    pub y: f64,
}

/// An edge ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub confidence: f64,
    pub strength: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Elements {
    pub nodes: Vec<ElementNode>,
    pub edges: Vec<ElementEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutput {
    pub elements: Elements,
    /// Nodes emitted at (0, 0) because they had no finite position
    pub position_fallbacks: usize,
}

/// Linear map of one axis from [min, max] onto [-viewport, viewport]
#[derive(Debug, Clone, Copy)]
struct Axis {
    min: f64,
    extent: f64,
}

impl Axis {
    fn map(&self, value: f64, viewport: f64) -> f64 {
        if self.extent <= 0.0 || !self.extent.is_finite() {
            return 0.0;
        }
        let t = (value - self.min) / self.extent;
        (t * 2.0 * viewport - viewport).clamp(-viewport, viewport)
    }
}

fn finite_position(position: Option<Position>) -> Option<Position> {
    position.filter(Position::is_finite)
}

/// Export `graph` with positions normalized into `[-viewport, viewport]`
pub fn export(graph: &GraphStore, viewport: f64) -> GraphResult<ExportOutput> {
    if !viewport.is_finite() || viewport < 0.0 {
        return Err(GraphError::invalid(format!(
            "viewport must be a finite, non-negative number, got {}",
            viewport
        )));
    }

    let mut min = Position::new(f64::INFINITY, f64::INFINITY);
    let mut max = Position::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in graph.nodes().iter().filter_map(|n| finite_position(n.position)) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let x_axis = Axis {
        min: min.x,
        extent: max.x - min.x,
    };
    let y_axis = Axis {
        min: min.y,
        extent: max.y - min.y,
    };

    let mut output = ExportOutput::default();
    for node in graph.nodes() {
        let (x, y) = match finite_position(node.position) {
            Some(p) => (x_axis.map(p.x, viewport), y_axis.map(p.y, viewport)),
            None => {
                output.position_fallbacks += 1;
                (0.0, 0.0)
            }
        };
        output.elements.nodes.push(ElementNode {
            id: node.id.clone(),
            label: node.label.clone(),
            node_type: node.node_type.clone(),
            confidence: node.confidence,
            importance: node.importance,
            community: node.community,
            color: node.color.clone(),
            size: node.size,
            x,
            y,
        });
    }

    output.elements.edges = graph
        .edges()
        .iter()
        .map(|edge| ElementEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
            edge_type: edge.edge_type.clone(),
            confidence: edge.confidence,
            strength: edge.strength,
        })
        .collect();

    if output.position_fallbacks > 0 {
        tracing::warn!(
            "Export placed {} unpositioned nodes at the origin",
            output.position_fallbacks
        );
    }
    Ok(output)
}
