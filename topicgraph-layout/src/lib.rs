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


//! Topicgraph Layout
//!
//! Deterministic 2D layout for annotated graph stores.
//!
//! ```text
//! circular seed ──► force pass ──► overlap removal ──► dense-cluster refinement ──► export
//!                   (exact or        (spatial grid)     (per community, centroid      (viewport
//!                    Barnes-Hut)                         preserving)                   rescale)
//! ```

pub mod engine;
pub mod export;
pub mod force;
pub mod overlap;
pub mod quadtree;
pub mod refine;
pub mod seed;

pub use engine::{LayoutEngine, LayoutOptions, LayoutReport};
pub use export::{export, ElementEdge, ElementNode, Elements, ExportOutput};
pub use force::ForceMode;
pub use refine::RefinedCluster;
