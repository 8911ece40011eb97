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


//! Request input parsing

use crate::config::RequestOptions;
use serde::{Deserialize, Serialize};
use topicgraph_core::{parse_edge_list, parse_node_list, EdgeInput, GraphError, GraphResult, NodeInput};

/// Nodes, edges and per-request options as sent by the extraction pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
    #[serde(default)]
    pub options: RequestOptions,
}

impl GraphInput {
    pub fn new(nodes: Vec<NodeInput>, edges: Vec<EdgeInput>) -> Self {
        Self {
            nodes,
            edges,
            options: RequestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a JSON document; see [`parse_input`]
    pub fn from_json_str(raw: &str) -> GraphResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        parse_input(&value)
    }
}

/// Validate and parse a request document entry by entry.
///
/// The first malformed node, edge or option is reported as
/// `InvalidArgument`; nothing is returned partially.
pub fn parse_input(value: &serde_json::Value) -> GraphResult<GraphInput> {
    let object = value
        .as_object()
        .ok_or_else(|| GraphError::invalid("input must be a JSON object with nodes and edges"))?;

    let null = serde_json::Value::Null;
    let nodes = parse_node_list(object.get("nodes").unwrap_or(&null))?;
    let edges = parse_edge_list(object.get("edges").unwrap_or(&null))?;
    let options = match object.get("options") {
        None | Some(serde_json::Value::Null) => RequestOptions::default(),
        Some(raw) => RequestOptions::deserialize(raw)
            .map_err(|e| GraphError::invalid(format!("options: {}", e)))?,
    };

    Ok(GraphInput {
        nodes,
        edges,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_document() {
        let input = parse_input(&json!({
            "nodes": [{"id": "a", "name": "Alpha"}, {"id": 2, "type": "topic"}],
            "edges": [{"from": "a", "to": 2, "confidence": 0.9}],
            "options": {"nodeLimit": 10}
        }))
        .unwrap();
        assert_eq!(input.nodes.len(), 2);
        assert_eq!(input.nodes[1].id, "2");
        assert_eq!(input.edges[0].to, "2");
        assert_eq!(input.options.node_limit, Some(10));
    }

    #[test]
    fn test_missing_lists_are_empty() {
        let input = parse_input(&json!({})).unwrap();
        assert!(input.nodes.is_empty());
        assert!(input.edges.is_empty());
    }

    #[test]
    fn test_malformed_entries_rejected() {
        let err = parse_input(&json!({"nodes": [{"id": "a"}, 42]})).unwrap_err();
        assert!(err.to_string().contains("nodes[1]"));

        let err = parse_input(&json!({"edges": [{"from": "a"}]})).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));

        assert!(parse_input(&json!([1, 2])).is_err());
        assert!(parse_input(&json!({"options": {"algorithm": "nope"}})).is_err());
    }

    #[test]
    fn test_from_json_str_syntax_error() {
        assert!(matches!(
            GraphInput::from_json_str("{not json"),
            Err(GraphError::Serialization(_))
        ));
    }
}
