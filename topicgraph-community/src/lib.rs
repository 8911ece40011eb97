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


//! Topicgraph Community Detection
//!
//! Partitions a [`GraphStore`](topicgraph_core::GraphStore) into communities:
//!
//! - [`louvain`]: modularity optimization by local moving
//! - [`leiden`]: Louvain plus connectivity checks on the result
//! - [`label_propagation`]: randomized majority-label spreading
//! - [`hierarchy`]: optional one-level roll-up of the base communities
//!
//! [`CommunityDetector`] ties these together and scores the output.

pub mod detector;
pub mod hierarchy;
pub mod label_propagation;
pub mod leiden;
pub mod louvain;
pub mod partition;
pub mod scoring;

pub use detector::{Algorithm, CommunityDetector, DetectOptions, DetectionResult};
pub use label_propagation::LabelPropagation;
pub use leiden::LeidenRefinement;
pub use louvain::{LouvainClustering, LouvainConfig};
pub use partition::Partition;
