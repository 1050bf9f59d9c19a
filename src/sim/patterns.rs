//! Hand-authored obstacle sequences

use super::state::ObstacleKind::{self, Air, Ground};

/// One obstacle within a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternPiece {
    pub kind: ObstacleKind,
    /// Fixed lane, or `None` to roll one at stamp time
    pub lane: Option<u8>,
    /// Distance behind the pattern start (further from the player)
    pub dz: u8,
}

const fn piece(kind: ObstacleKind, lane: u8, dz: u8) -> PatternPiece {
    PatternPiece {
        kind,
        lane: Some(lane),
        dz,
    }
}

const fn free(kind: ObstacleKind, dz: u8) -> PatternPiece {
    PatternPiece { kind, lane: None, dz }
}

/// The pattern library
pub const PATTERNS: [&[PatternPiece]; 7] = [
    // Diagonal staircase
    &[piece(Ground, 0, 0), piece(Air, 1, 6), piece(Ground, 2, 12)],
    // Air sweep
    &[piece(Air, 0, 0), piece(Air, 1, 5), piece(Air, 2, 10)],
    // Double hop then duck right
    &[piece(Ground, 1, 0), piece(Ground, 1, 6), piece(Air, 2, 12)],
    // Alternating, random lanes
    &[free(Air, 0), free(Ground, 4), free(Air, 8), free(Ground, 12)],
    // Slalom
    &[
        piece(Ground, 0, 0),
        piece(Ground, 2, 5),
        piece(Ground, 1, 10),
        piece(Air, 1, 16),
    ],
    // Mid block, duck right, duck left
    &[piece(Ground, 1, 0), piece(Air, 2, 6), piece(Air, 0, 12)],
    // Tight zig with an air pinch
    &[
        piece(Ground, 2, 0),
        piece(Air, 1, 5),
        piece(Ground, 0, 10),
        piece(Air, 1, 15),
    ],
];

/// Depth of a pattern from its first to last piece
pub fn span(pattern: &[PatternPiece]) -> f32 {
    pattern.last().map_or(12.0, |p| f32::from(p.dz))
}
