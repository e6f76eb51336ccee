/// Game configuration constants.
///
/// This module defines the main gameplay parameters such as player capacity,
/// join code derivation, and the level-advance delay.

/// Maximum number of players allowed in a game.
pub const MAX_PLAYERS: usize = 6;

/// Number of leading characters of the game id used as the public join code.
pub const GAME_CODE_LEN: usize = 8;

/// Length of a full game identifier (hyphenated UUID). Anything shorter is
/// treated as a join code and resolved by scanning existing games.
pub const FULL_GAME_ID_LEN: usize = 36;

/// Delay (in seconds) between level completion and the automatic advance to
/// the next level, so clients can display the completion message.
pub const LEVEL_ADVANCE_DELAY: u64 = 2;

/// Player colors, assigned cycling by join order.
pub const PLAYER_COLORS: [&str; 6] = [
    "#FF6B6B",
    "#4ECDC4",
    "#45B7D1",
    "#FFA07A",
    "#98D8C8",
    "#F7DC6F",
];
