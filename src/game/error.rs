//! Error taxonomy for game operations.

use std::fmt;

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// Requested level number is outside the catalog.
    LevelNotFound(u32),
    /// Bad code or id, or the game was deleted concurrently.
    GameNotFound,
    GameAlreadyStarted,
    GameFull,
    /// Move intent from a player that is not part of the game.
    PlayerNotInGame,
    /// Transient store failure; the operation was aborted, not retried.
    Store(StoreError),
}

impl GameError {
    /// Stable machine-readable code, used in wire error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::LevelNotFound(_) => "LEVEL_NOT_FOUND",
            GameError::GameNotFound => "GAME_NOT_FOUND",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::GameFull => "GAME_FULL",
            GameError::PlayerNotInGame => "PLAYER_NOT_IN_GAME",
            GameError::Store(_) => "STORE_ERROR",
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::LevelNotFound(number) => write!(f, "level {number} not found"),
            GameError::GameNotFound => write!(f, "game not found"),
            GameError::GameAlreadyStarted => write!(f, "game has already started"),
            GameError::GameFull => write!(f, "game is full"),
            GameError::PlayerNotInGame => write!(f, "player is not part of this game"),
            GameError::Store(err) => write!(f, "store operation failed: {err}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        GameError::Store(err)
    }
}
