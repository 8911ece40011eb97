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


//! Barnes-Hut Quadtree
//!
//! Approximates all-pairs repulsion in O(n log n). Every cell keeps the
//! body count and center of mass of everything below it; a cell whose
//! width-to-distance ratio is under `theta` acts as one body.
//!
//! Reference: Barnes & Hut, "A hierarchical O(N log N) force-calculation algorithm"

use crate::force;
use topicgraph_core::Position;

/// Coincident points stop subdividing here and share a leaf
const MAX_DEPTH: usize = 24;

#[derive(Debug, Clone)]
struct Cell {
    cx: f64,
    cy: f64,
    half: f64,
    mass: f64,
    com: Position,
    bodies: Vec<usize>,
    children: Option<[usize; 4]>,
}

impl Cell {
    fn new(cx: f64, cy: f64, half: f64) -> Self {
        Self {
            cx,
            cy,
            half,
            mass: 0.0,
            com: Position::ORIGIN,
            bodies: Vec::new(),
            children: None,
        }
    }

    fn quadrant(&self, p: Position) -> usize {
        (p.x >= self.cx) as usize + 2 * (p.y >= self.cy) as usize
    }

    fn contains(&self, p: Position) -> bool {
        (p.x - self.cx).abs() <= self.half && (p.y - self.cy).abs() <= self.half
    }
}

/// Quadtree over a borrowed position slice; body ids are slice indices
pub struct QuadTree<'a> {
    cells: Vec<Cell>,
    points: &'a [Position],
}

impl<'a> QuadTree<'a> {
    /// Build over all finite points; non-finite points are left out
    pub fn build(points: &'a [Position]) -> Self {
        let mut min = Position::new(f64::INFINITY, f64::INFINITY);
        let mut max = Position::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points.iter().filter(|p| p.is_finite()) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        let root = if min.x > max.x {
            Cell::new(0.0, 0.0, 1.0)
        } else {
            let half = (max.x - min.x).max(max.y - min.y) / 2.0 + 1.0;
            Cell::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0, half)
        };

        let mut tree = Self {
            cells: vec![root],
            points,
        };
        for (body, p) in points.iter().enumerate() {
            if p.is_finite() {
                tree.insert(0, body, 0);
            }
        }
        tree
    }

    /// Number of bodies in the tree
    pub fn mass(&self) -> f64 {
        self.cells[0].mass
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn insert(&mut self, cell: usize, body: usize, depth: usize) {
        let p = self.points[body];
        {
            let c = &mut self.cells[cell];
            let mass = c.mass + 1.0;
            c.com.x += (p.x - c.com.x) / mass;
            c.com.y += (p.y - c.com.y) / mass;
            c.mass = mass;
        }

        if let Some(children) = self.cells[cell].children {
            let q = self.cells[cell].quadrant(p);
            self.insert(children[q], body, depth + 1);
            return;
        }

        if self.cells[cell].bodies.is_empty() || depth >= MAX_DEPTH {
            self.cells[cell].bodies.push(body);
            return;
        }

        // Occupied leaf: split and push both bodies down
        let existing = std::mem::take(&mut self.cells[cell].bodies);
        let children = self.subdivide(cell);
        for b in existing.into_iter().chain(std::iter::once(body)) {
            let q = self.cells[cell].quadrant(self.points[b]);
            self.insert(children[q], b, depth + 1);
        }
    }

    fn subdivide(&mut self, cell: usize) -> [usize; 4] {
        let (cx, cy, half) = {
            let c = &self.cells[cell];
            (c.cx, c.cy, c.half / 2.0)
        };
        let base = self.cells.len();
        self.cells.push(Cell::new(cx - half, cy - half, half));
        self.cells.push(Cell::new(cx + half, cy - half, half));
        self.cells.push(Cell::new(cx - half, cy + half, half));
        self.cells.push(Cell::new(cx + half, cy + half, half));
        let children = [base, base + 1, base + 2, base + 3];
        self.cells[cell].children = Some(children);
        children
    }

    /// Approximate repulsion on `body` from every other body
    pub fn repulsion(&self, body: usize, k2: f64, theta: f64) -> (f64, f64) {
        let p = self.points[body];
        let (mut fx, mut fy) = (0.0, 0.0);
        let mut stack = vec![0usize];

        while let Some(idx) = stack.pop() {
            let cell = &self.cells[idx];
            if cell.mass == 0.0 {
                continue;
            }
            match cell.children {
                None => {
                    for &other in &cell.bodies {
                        if other == body {
                            continue;
                        }
                        let (x, y) = force::pair_repulsion(body, other, p, self.points[other], k2);
                        fx += x;
                        fy += y;
                    }
                }
                Some(children) => {
                    let dx = p.x - cell.com.x;
                    let dy = p.y - cell.com.y;
                    let d = (dx * dx + dy * dy).sqrt();
                    if !cell.contains(p) && d > 0.0 && (2.0 * cell.half) / d < theta {
                        let f = k2 * cell.mass / (d * d);
                        fx += dx * f;
                        fy += dy * f;
                    } else {
                        stack.extend(children);
                    }
                }
            }
        }

        (fx, fy)
    }
}
