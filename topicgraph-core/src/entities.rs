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

//! Node, Edge and Community Types
//!
//! Defines the records flowing through the pipeline: raw inputs produced by
//! the extraction layer, the attributed graph records held by the store, and
//! the community partition produced by clustering.

use crate::error::{GraphError, GraphResult};
use crate::palette;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A unique identifier for nodes in the graph
pub type NodeId = String;

/// Community identifier assigned by the detector
pub type CommunityId = u32;

pub const DEFAULT_NODE_TYPE: &str = "entity";
pub const DEFAULT_EDGE_TYPE: &str = "related";
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// A 2D position in layout space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An entity or topic node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Display name
    pub label: String,
    /// Free-form category tag
    #[serde(rename = "type")]
    pub node_type: String,
    /// Extraction confidence in [0, 1]
    pub confidence: f64,
    /// Occurrence weight
    pub count: u32,
    /// Degree centrality (set by the metric calculator)
    pub importance: u32,
    /// Display size in [25, 60] (set by the metric calculator)
    pub size: f64,
    /// Community assignment (set by the community detector)
    pub community: Option<CommunityId>,
    /// Palette color derived from `community`
    pub color: String,
    /// Layout position (set by the layout engine)
    pub position: Option<Position>,
}

impl Node {
    /// Create a node with default attributes
    pub fn new(id: impl Into<NodeId>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            node_type: DEFAULT_NODE_TYPE.to_string(),
            confidence: DEFAULT_CONFIDENCE,
            count: 1,
            importance: 0,
            size: crate::metrics::size_midpoint(),
            community: None,
            color: palette::UNASSIGNED_COLOR.to_string(),
            position: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Node created from an extraction record, with defaults filled in
    pub fn from_input(input: &NodeInput) -> Self {
        let label = input
            .name
            .clone()
            .or_else(|| input.label.clone())
            .unwrap_or_else(|| input.id.clone());

        Self {
            label,
            node_type: input
                .node_type
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_NODE_TYPE.to_string()),
            confidence: unit_or_default(input.confidence, DEFAULT_CONFIDENCE),
            count: input.count.unwrap_or(1),
            ..Self::new(input.id.clone())
        }
    }
}

/// An undirected relationship between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// First endpoint, as supplied
    pub source: NodeId,
    /// Second endpoint, as supplied
    pub target: NodeId,
    /// Relationship kind
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Extraction confidence in [0, 1]
    pub confidence: f64,
    /// Attraction weight in [0, 1], defaults to `confidence`
    pub strength: f64,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type: DEFAULT_EDGE_TYPE.to_string(),
            confidence: DEFAULT_CONFIDENCE,
            strength: DEFAULT_CONFIDENCE,
        }
    }

    pub fn from_input(input: &EdgeInput) -> Self {
        let confidence = unit_or_default(input.confidence, DEFAULT_CONFIDENCE);
        Self {
            source: input.from.clone(),
            target: input.to.clone(),
            edge_type: input
                .edge_type
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_EDGE_TYPE.to_string()),
            confidence,
            strength: unit_or_default(input.strength, confidence),
        }
    }

    /// Whether this edge touches `id`
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

/// Clamp an optional unit-interval value, falling back when absent or non-finite
fn unit_or_default(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => default,
    }
}

/// Node record as produced by the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub count: Option<u32>,
}

impl NodeInput {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            label: None,
            node_type: None,
            confidence: None,
            count: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }
}

/// Relationship record as produced by the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    #[serde(alias = "source", deserialize_with = "deserialize_id")]
    pub from: NodeId,
    #[serde(alias = "target", deserialize_with = "deserialize_id")]
    pub to: NodeId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl EdgeInput {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            edge_type: None,
            confidence: None,
            strength: None,
        }
    }

    pub fn edge_type(mut self, edge_type: impl Into<String>) -> Self {
        self.edge_type = Some(edge_type.into());
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }
}

/// Ids arrive as strings or integers; integers are kept in decimal form.
fn deserialize_id<'de, D>(deserializer: D) -> Result<NodeId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}

/// Counts arrive as integers or as whole-valued floats from JS producers;
/// fractions are rounded and values past `u32::MAX` saturate.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Whole(u64),
        Float(f64),
    }

    Ok(match Option::<RawCount>::deserialize(deserializer)? {
        None => None,
        Some(RawCount::Whole(n)) => Some(n.min(u64::from(u32::MAX)) as u32),
        Some(RawCount::Float(f)) if f.is_finite() && f >= 0.0 => {
            Some(f.round().min(f64::from(u32::MAX)) as u32)
        }
        Some(RawCount::Float(f)) => return Err(D::Error::custom(format!("invalid count {}", f))),
    })
}

/// Parse a JSON array of node records, rejecting the first malformed entry
pub fn parse_node_list(value: &serde_json::Value) -> GraphResult<Vec<NodeInput>> {
    parse_list(value, "nodes")
}

/// Parse a JSON array of edge records, rejecting the first malformed entry
pub fn parse_edge_list(value: &serde_json::Value) -> GraphResult<Vec<EdgeInput>> {
    parse_list(value, "edges")
}

fn parse_list<T: serde::de::DeserializeOwned>(
    value: &serde_json::Value,
    what: &str,
) -> GraphResult<Vec<T>> {
    let entries = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Array(entries) => entries,
        other => {
            return Err(GraphError::invalid(format!(
                "{} must be an array, got {}",
                what,
                json_kind(other)
            )))
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            if !entry.is_object() {
                return Err(GraphError::invalid(format!(
                    "{}[{}] must be an object, got {}",
                    what,
                    i,
                    json_kind(entry)
                )));
            }
            T::deserialize(entry)
                .map_err(|e| GraphError::invalid(format!("{}[{}]: {}", what, i, e)))
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Members of a community: node ids at level 0, child communities above
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommunityMembers {
    Nodes(Vec<NodeId>),
    Communities(Vec<CommunityId>),
}

impl CommunityMembers {
    pub fn len(&self) -> usize {
        match self {
            CommunityMembers::Nodes(ids) => ids.len(),
            CommunityMembers::Communities(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node members, empty for roll-up communities
    pub fn node_ids(&self) -> &[NodeId] {
        match self {
            CommunityMembers::Nodes(ids) => ids,
            CommunityMembers::Communities(_) => &[],
        }
    }
}

/// A cluster of related nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    /// Community ID
    pub id: CommunityId,
    /// Hierarchy depth (0 = base partition, 1 = super-community)
    pub level: u8,
    /// Member count
    pub size: usize,
    /// internal / (internal + external) edges
    pub cohesion_score: f64,
    /// Node ids, or child community ids for level 1
    #[serde(rename = "memberIds")]
    pub members: CommunityMembers,
    /// Containing super-community, set by hierarchical roll-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommunityId>,
    /// Set by Leiden refinement when cohesion is at or below the threshold
    #[serde(default)]
    pub poorly_connected: bool,
}

impl Community {
    /// Create a base-level community over the given nodes
    pub fn new(id: CommunityId, members: Vec<NodeId>) -> Self {
        Self {
            id,
            level: 0,
            size: members.len(),
            cohesion_score: 0.0,
            members: CommunityMembers::Nodes(members),
            parent_id: None,
            poorly_connected: false,
        }
    }

    /// Create a super-community over child communities
    pub fn rollup(id: CommunityId, children: Vec<CommunityId>) -> Self {
        Self {
            id,
            level: 1,
            size: children.len(),
            cohesion_score: 0.0,
            members: CommunityMembers::Communities(children),
            parent_id: None,
            poorly_connected: false,
        }
    }
}

/// Statistics about the graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    /// Total number of nodes
    pub node_count: usize,
    /// Total number of (deduplicated) edges
    pub edge_count: usize,
    /// Number of distinct communities assigned to nodes
    pub community_count: usize,
    /// Average edges per node
    pub avg_degree: f64,
    /// Graph density (actual edges / possible edges)
    pub density: f64,
    /// Distribution of node types
    pub node_type_distribution: HashMap<String, usize>,
    /// Distribution of edge types
    pub edge_type_distribution: HashMap<String, usize>,
}
