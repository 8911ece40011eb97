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


//! Topicgraph Engine
//!
//! Configuration loading and the end-to-end knowledge-graph pipeline:
//! raw extraction output in, positioned and colored elements out.
//!
//! The engine holds no process-wide state. Result caching is opt-in through
//! a [`LayoutCache`] the caller constructs and passes to
//! [`TopicGraphEngine::run_cached`].

pub mod cache;
pub mod config;
pub mod input;
pub mod pipeline;

pub use cache::{CacheStats, LayoutCache, LayoutCacheKey};
pub use config::{CacheConfig, EngineConfig, ExportConfig, RequestOptions};
pub use input::{parse_input, GraphInput};
pub use pipeline::{Diagnostics, PipelineOutput, TopicGraphEngine};
