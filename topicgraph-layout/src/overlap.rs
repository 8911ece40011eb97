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


//! Overlap removal
//!
//! Nodes are circles of radius `size / 2 · margin`. Each pass buckets the
//! circles into a uniform grid whose cells are one diameter wide, so only
//! neighboring cells are compared, then pushes every intersecting pair
//! apart by half the overlap each.

use std::collections::HashMap;
use topicgraph_core::Position;

/// Intersections at or below this depth count as touching
const OVERLAP_TOLERANCE: f64 = 1e-6;

/// Result of an overlap removal run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapOutcome {
    /// Passes that moved at least one pair
    pub passes: usize,
    /// Intersecting pairs left when the run ended
    pub remaining: usize,
}

struct Grid {
    cell: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl Grid {
    fn build(positions: &[Position], cell: f64) -> Self {
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (i, p) in positions.iter().enumerate() {
            if p.is_finite() {
                buckets.entry(Self::key(*p, cell)).or_default().push(i);
            }
        }
        Self { cell, buckets }
    }

    fn key(p: Position, cell: f64) -> (i64, i64) {
        ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64)
    }

    /// Every candidate pair (i < j) sharing or bordering a cell
    fn candidate_pairs(&self, positions: &[Position]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, p) in positions.iter().enumerate() {
            if !p.is_finite() {
                continue;
            }
            let (cx, cy) = Self::key(*p, self.cell);
            for gx in cx - 1..=cx + 1 {
                for gy in cy - 1..=cy + 1 {
                    if let Some(bucket) = self.buckets.get(&(gx, gy)) {
                        pairs.extend(bucket.iter().filter(|&&j| j > i).map(|&j| (i, j)));
                    }
                }
            }
        }
        pairs
    }
}

fn grid_cell(radii: &[f64]) -> f64 {
    let largest = radii.iter().copied().fold(0.0f64, f64::max);
    (2.0 * largest).max(1.0)
}

fn overlap_of(positions: &[Position], radii: &[f64], i: usize, j: usize) -> Option<(f64, f64, f64)> {
    let dx = positions[j].x - positions[i].x;
    let dy = positions[j].y - positions[i].y;
    let d = (dx * dx + dy * dy).sqrt();
    let overlap = radii[i] + radii[j] - d;
    (overlap > OVERLAP_TOLERANCE).then_some((dx, dy, d))
}

/// Count intersecting pairs without moving anything
pub fn count_overlaps(positions: &[Position], radii: &[f64]) -> usize {
    let grid = Grid::build(positions, grid_cell(radii));
    grid.candidate_pairs(positions)
        .into_iter()
        .filter(|&(i, j)| overlap_of(positions, radii, i, j).is_some())
        .count()
}

/// Push overlapping circles apart for at most `iterations` passes
pub fn remove_overlaps(positions: &mut [Position], radii: &[f64], iterations: usize) -> OverlapOutcome {
    let cell = grid_cell(radii);
    let mut outcome = OverlapOutcome::default();

    for _ in 0..iterations {
        let grid = Grid::build(positions, cell);
        let mut moved = 0;

        for (i, j) in grid.candidate_pairs(positions) {
            let Some((dx, dy, d)) = overlap_of(positions, radii, i, j) else {
                continue;
            };
            let (ux, uy) = if d > 1e-9 {
                (dx / d, dy / d)
            } else {
                // Coincident: fixed direction from the pair's indices
                let angle = (i * 31 + j) as f64 * 2.399_963_229_728_653;
                (angle.cos(), angle.sin())
            };
            // Slack leaves the pair clear of the tolerance after rounding
            let push = (radii[i] + radii[j] - d + OVERLAP_TOLERANCE) / 2.0;
            positions[i].x -= ux * push;
            positions[i].y -= uy * push;
            positions[j].x += ux * push;
            positions[j].y += uy * push;
            moved += 1;
        }

        if moved == 0 {
            break;
        }
        outcome.passes += 1;
    }

    outcome.remaining = count_overlaps(positions, radii);
    if outcome.remaining > 0 {
        tracing::debug!(
            "Overlap removal left {} intersecting pairs after {} passes",
            outcome.remaining,
            outcome.passes
        );
    }
    outcome
}
