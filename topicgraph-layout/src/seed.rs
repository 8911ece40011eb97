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


//! Circular seed placement

use std::f64::consts::PI;
use topicgraph_core::Position;

/// Place `n` points evenly on a circle of radius `scale`, in index order.
///
/// Returns the positions and the number of points that came out non-finite
/// and were put at the origin instead.
pub fn circular(n: usize, scale: f64) -> (Vec<Position>, usize) {
    let mut fallbacks = 0;
    let positions = (0..n)
        .map(|i| {
            let angle = i as f64 * 2.0 * PI / n as f64;
            let p = Position::new(scale * angle.cos(), scale * angle.sin());
            if p.is_finite() {
                p
            } else {
                fallbacks += 1;
                Position::ORIGIN
            }
        })
        .collect();

    if fallbacks > 0 {
        tracing::warn!("Circular seed placed {} nodes at the origin", fallbacks);
    }
    (positions, fallbacks)
}

/// Mean position, or the origin for an empty slice
pub fn centroid(positions: &[Position]) -> Position {
    if positions.is_empty() {
        return Position::ORIGIN;
    }
    let n = positions.len() as f64;
    let (sx, sy) = positions
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Position::new(sx / n, sy / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_lie_on_circle() {
        let (positions, fallbacks) = circular(8, 100.0);
        assert_eq!(fallbacks, 0);
        for p in &positions {
            assert!(((p.x * p.x + p.y * p.y).sqrt() - 100.0).abs() < 1e-9);
        }
        assert!((positions[0].x - 100.0).abs() < 1e-9);
        assert!(centroid(&positions).x.abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_scale_falls_back_to_origin() {
        let (positions, fallbacks) = circular(3, f64::NAN);
        assert_eq!(fallbacks, 3);
        assert!(positions.iter().all(|p| *p == Position::ORIGIN));
    }

    #[test]
    fn test_empty() {
        assert!(circular(0, 10.0).0.is_empty());
        assert_eq!(centroid(&[]), Position::ORIGIN);
    }
}
