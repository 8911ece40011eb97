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


//! Force-directed Placement
//!
//! Fruchterman-Reingold style model with a cooling step cap:
//!
//! - **Repulsion** between every pair: k² / d
//! - **Attraction** along each edge: strength · d² / k
//! - **Gravity** toward the origin: gravity · |p|
//!
//! where k = 2 · scale / √n is the ideal edge length. Above
//! `barnes_hut_threshold` nodes repulsion is approximated with a
//! [`QuadTree`](crate::quadtree::QuadTree).

use crate::quadtree::QuadTree;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use topicgraph_core::{GraphStore, Position};

/// Distances below this are treated as coincident
const MIN_DISTANCE: f64 = 0.01;

/// Which repulsion computation a force pass used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForceMode {
    /// Fewer than two nodes or no iterations
    #[default]
    Skipped,
    Exact,
    BarnesHut,
}

/// Parameters of one force pass
#[derive(Debug, Clone)]
pub struct ForceParams {
    pub scale: f64,
    pub iterations: usize,
    pub gravity: f64,
    pub barnes_hut_threshold: usize,
    pub theta: f64,
}

/// What a force pass did
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceOutcome {
    pub mode: ForceMode,
    /// Displacements discarded because they were not finite
    pub numeric_fallbacks: usize,
}

/// Unit vector for separating two coincident nodes, fixed per pair
fn separation_direction(i: usize, j: usize) -> (f64, f64) {
    // golden angle spreads consecutive pairs around the circle
    let angle = ((i * 31 + j) as f64 * 2.399_963_229_728_653) % (2.0 * PI);
    (angle.cos(), angle.sin())
}

/// Repulsive force on `i` at `pi` from `j` at `pj`
pub(crate) fn pair_repulsion(i: usize, j: usize, pi: Position, pj: Position, k2: f64) -> (f64, f64) {
    let mut dx = pi.x - pj.x;
    let mut dy = pi.y - pj.y;
    let mut d2 = dx * dx + dy * dy;
    if d2 < MIN_DISTANCE * MIN_DISTANCE {
        let (ux, uy) = if i < j {
            separation_direction(i, j)
        } else {
            let (ux, uy) = separation_direction(j, i);
            (-ux, -uy)
        };
        dx = ux * MIN_DISTANCE;
        dy = uy * MIN_DISTANCE;
        d2 = MIN_DISTANCE * MIN_DISTANCE;
    }
    let f = k2 / d2;
    (dx * f, dy * f)
}

/// Run the force model over `positions`, which are indexed like `graph`'s nodes
pub fn run(graph: &GraphStore, positions: &mut [Position], params: &ForceParams) -> ForceOutcome {
    let n = positions.len();
    let mut outcome = ForceOutcome::default();
    if n < 2 || params.iterations == 0 {
        return outcome;
    }

    outcome.mode = if n > params.barnes_hut_threshold {
        ForceMode::BarnesHut
    } else {
        ForceMode::Exact
    };

    let k = 2.0 * params.scale / (n as f64).sqrt();
    let k2 = k * k;
    let initial_temperature = params.scale / 10.0;
    let mut displacement = vec![(0.0f64, 0.0f64); n];

    for iteration in 0..params.iterations {
        let temperature =
            initial_temperature * (1.0 - iteration as f64 / params.iterations as f64);
        displacement.iter_mut().for_each(|d| *d = (0.0, 0.0));

        match outcome.mode {
            ForceMode::BarnesHut => {
                let tree = QuadTree::build(positions);
                for (i, d) in displacement.iter_mut().enumerate() {
                    let (fx, fy) = tree.repulsion(i, k2, params.theta);
                    d.0 += fx;
                    d.1 += fy;
                }
            }
            _ => {
                for i in 0..n {
                    for j in (i + 1)..n {
                        let (fx, fy) = pair_repulsion(i, j, positions[i], positions[j], k2);
                        displacement[i].0 += fx;
                        displacement[i].1 += fy;
                        displacement[j].0 -= fx;
                        displacement[j].1 -= fy;
                    }
                }
            }
        }

        for (edge, a, b) in graph.indexed_edges() {
            let dx = positions[a].x - positions[b].x;
            let dy = positions[a].y - positions[b].y;
            let d = (dx * dx + dy * dy).sqrt();
            if d < MIN_DISTANCE {
                continue;
            }
            // (dx / d) * strength * d² / k
            let f = edge.strength * d / k;
            displacement[a].0 -= dx * f;
            displacement[a].1 -= dy * f;
            displacement[b].0 += dx * f;
            displacement[b].1 += dy * f;
        }

        for (p, d) in positions.iter().zip(displacement.iter_mut()) {
            d.0 -= params.gravity * p.x;
            d.1 -= params.gravity * p.y;
        }

        for (p, &(dx, dy)) in positions.iter_mut().zip(displacement.iter()) {
            let len = (dx * dx + dy * dy).sqrt();
            if !len.is_finite() {
                outcome.numeric_fallbacks += 1;
                continue;
            }
            if len == 0.0 {
                continue;
            }
            let step = len.min(temperature);
            let next = Position::new(p.x + dx / len * step, p.y + dy / len * step);
            if next.is_finite() {
                *p = next;
            } else {
                outcome.numeric_fallbacks += 1;
            }
        }
    }

    if outcome.numeric_fallbacks > 0 {
        tracing::warn!(
            "Force pass discarded {} non-finite displacements",
            outcome.numeric_fallbacks
        );
    }
    outcome
}
