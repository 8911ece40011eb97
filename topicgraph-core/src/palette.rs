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

//! Community color palette

use crate::entities::CommunityId;

/// Color for nodes outside every community
pub const UNASSIGNED_COLOR: &str = "#9e9e9e";

/// Qualitative palette, indexed by community id modulo its length
pub const COMMUNITY_PALETTE: [&str; 12] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac", "#17becf", "#bcbd22",
];

/// Palette color for a community assignment
pub fn color_for(community: Option<CommunityId>) -> &'static str {
    match community {
        Some(id) => COMMUNITY_PALETTE[id as usize % COMMUNITY_PALETTE.len()],
        None => UNASSIGNED_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(color_for(Some(0)), color_for(Some(12)));
        assert_ne!(color_for(Some(0)), color_for(Some(1)));
        assert_eq!(color_for(None), UNASSIGNED_COLOR);
    }
}
