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

//! Node labelling produced by the clustering algorithms.
//!
//! Labels are scratch data indexed by node position in the store; they never
//! live on the persistent node records.

use std::collections::HashMap;

/// One label per node index, plus convergence bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub labels: Vec<usize>,
    /// Full passes executed
    pub iterations: usize,
    /// Whether the run stopped before exhausting its budget
    pub converged: bool,
}

impl Partition {
    /// Every node in its own community
    pub fn singletons(n: usize) -> Self {
        Self {
            labels: (0..n).collect(),
            iterations: 0,
            converged: false,
        }
    }

    /// Renumber labels to be contiguous, in order of first appearance
    pub fn renumber(&mut self) -> usize {
        let mut mapping: HashMap<usize, usize> = HashMap::new();
        for label in self.labels.iter_mut() {
            let next = mapping.len();
            *label = *mapping.entry(*label).or_insert(next);
        }
        mapping.len()
    }

    /// Member node indices per label, labels in ascending order
    pub fn groups(&self) -> Vec<(usize, Vec<usize>)> {
        let mut by_label: HashMap<usize, Vec<usize>> = HashMap::new();
        for (node, &label) in self.labels.iter().enumerate() {
            by_label.entry(label).or_default().push(node);
        }
        let mut groups: Vec<(usize, Vec<usize>)> = by_label.into_iter().collect();
        groups.sort_by_key(|(label, _)| *label);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renumber_by_first_appearance() {
        let mut partition = Partition {
            labels: vec![7, 3, 7, 9, 3],
            iterations: 1,
            converged: true,
        };
        assert_eq!(partition.renumber(), 3);
        assert_eq!(partition.labels, vec![0, 1, 0, 2, 1]);
        assert_eq!(
            partition.groups(),
            vec![(0, vec![0, 2]), (1, vec![1, 4]), (2, vec![3])]
        );
    }
}
