use actix::prelude::*;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use uuid::Uuid;

use crate::game::types::{Direction, MoveOutcome};

/// Client -> server actions over the game socket.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "action", content = "data")]
pub enum ClientAction {
    Move { direction: Direction },
    Start,
    Restart,
    Leave,
    Ping,
}

/// Server -> client messages over the game socket.
#[derive(Message, Serialize, Deserialize, Clone, Debug)]
#[rtype(result = "()")]
#[serde(tag = "action", content = "data")]
pub enum ServerWsMessage {
    /// Current game document, pushed on every store notification.
    State { game: Value },
    /// Outcome of this session's last move intent.
    Moved { outcome: MoveOutcome },
    /// The game was replaced (level advance or restart); reconnect to the
    /// new id, or rejoin by code for non-creators.
    GameAdvanced {
        #[serde(rename = "gameId")]
        game_id: Uuid,
    },
    /// The subscribed game document no longer exists.
    GameDeleted,
    Error { code: String, message: String },
}
