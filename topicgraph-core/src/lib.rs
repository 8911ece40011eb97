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

//! Topicgraph Core
//!
//! The bottom of the knowledge-graph pipeline:
//!
//! ```text
//! extracted entities/relationships ──► GraphBuilder ──► GraphStore ──► MetricCalculator
//!                                       (filter, dedup,   (nodes, edges,   (importance,
//!                                        prune isolated)   adjacency)       size, neighborhoods)
//! ```
//!
//! Community detection and layout live in `topicgraph-community` and
//! `topicgraph-layout`; both consume and annotate the [`GraphStore`] defined here.

pub mod builder;
pub mod entities;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod palette;

pub use builder::{BuildOptions, BuildReport, GraphBuilder};
pub use entities::{
    parse_edge_list, parse_node_list, Community, CommunityId, CommunityMembers, Edge, EdgeInput,
    GraphStats, Node, NodeId, NodeInput, Position,
};
pub use error::{GraphError, GraphResult};
pub use graph::{Adjacent, EdgeInsert, GraphStore};
pub use metrics::{MetricCalculator, Neighborhood};
