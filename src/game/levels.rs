//! Built-in level catalog.
//!
//! Levels are hand-authored content. The coordinates and hazard placements
//! are canonical: changing them changes which levels are solvable.

use crate::game::types::ObstacleKind::{self, Lava, River, Wind};
use crate::game::types::Position;

/// Immutable level definition.
#[derive(Debug, Clone, Copy)]
pub struct Level {
    pub number: u32,
    pub grid_size: usize,
    pub player_start_positions: &'static [Position],
    pub rocks: &'static [Position],
    pub obstacles: &'static [(Position, ObstacleKind)],
    pub exit: Position,
}

const fn at(x: usize, y: usize) -> Position {
    Position { x, y }
}

pub const LEVELS: &[Level] = &[
    // Level 1: simple tutorial level.
    Level {
        number: 1,
        grid_size: 15,
        player_start_positions: &[at(0, 0), at(1, 0), at(2, 0)],
        rocks: &[at(5, 5), at(5, 6), at(5, 7)],
        obstacles: &[(at(10, 5), Lava), (at(10, 6), Lava), (at(10, 7), Lava)],
        exit: at(14, 14),
    },
    // Level 2: more rocks and obstacles.
    Level {
        number: 2,
        grid_size: 15,
        player_start_positions: &[at(1, 1), at(2, 1)],
        rocks: &[at(4, 3), at(4, 4), at(5, 4), at(7, 7), at(7, 8), at(8, 7)],
        obstacles: &[
            (at(6, 5), River),
            (at(6, 6), River),
            (at(10, 10), Lava),
            (at(11, 10), Lava),
        ],
        exit: at(13, 13),
    },
    // Level 3: wind corridors around a central rock wall.
    Level {
        number: 3,
        grid_size: 15,
        player_start_positions: &[at(0, 7), at(1, 7), at(2, 7)],
        rocks: &[
            at(4, 5),
            at(4, 6),
            at(4, 7),
            at(4, 8),
            at(4, 9),
            at(8, 7),
            at(9, 7),
            at(10, 7),
        ],
        obstacles: &[
            (at(7, 3), Wind),
            (at(7, 4), Wind),
            (at(7, 11), Wind),
            (at(7, 12), Wind),
            (at(12, 5), Lava),
            (at(12, 6), Lava),
        ],
        exit: at(14, 7),
    },
    // Level 4: maze-like rock placements.
    Level {
        number: 4,
        grid_size: 15,
        player_start_positions: &[at(1, 1), at(2, 1), at(3, 1)],
        rocks: &[
            at(3, 3),
            at(3, 4),
            at(3, 5),
            at(5, 3),
            at(7, 5),
            at(7, 6),
            at(7, 7),
            at(9, 3),
            at(9, 4),
            at(11, 7),
            at(11, 8),
            at(11, 9),
        ],
        obstacles: &[
            (at(5, 7), River),
            (at(6, 7), River),
            (at(10, 10), Lava),
            (at(10, 11), Lava),
            (at(2, 10), Wind),
            (at(3, 10), Wind),
        ],
        exit: at(13, 13),
    },
    // Level 5: full hazard row guarding the exit.
    Level {
        number: 5,
        grid_size: 15,
        player_start_positions: &[at(0, 0), at(1, 0)],
        rocks: &[
            at(3, 2),
            at(3, 3),
            at(3, 4),
            at(3, 5),
            at(6, 2),
            at(6, 5),
            at(9, 3),
            at(9, 4),
            at(9, 5),
            at(12, 2),
            at(12, 3),
            at(12, 4),
            at(12, 5),
            at(5, 8),
            at(5, 9),
            at(5, 10),
            at(10, 9),
            at(10, 10),
        ],
        obstacles: &[
            (at(2, 8), Lava),
            (at(3, 8), Lava),
            (at(4, 8), Lava),
            (at(7, 8), River),
            (at(8, 8), River),
            (at(11, 8), Wind),
            (at(12, 8), Wind),
            (at(13, 8), Wind),
        ],
        exit: at(14, 14),
    },
];

/// Look up a level by number. Numbers are dense and start at 1.
pub fn level(number: u32) -> Option<&'static Level> {
    LEVELS.iter().find(|level| level.number == number)
}

pub fn total_levels() -> u32 {
    LEVELS.len() as u32
}
