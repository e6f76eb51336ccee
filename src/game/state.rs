//! Shared game state.
//!
//! `GameState` is the aggregate root persisted at `games/{id}` and is the
//! sole source of truth: every component reads a view of it and writes
//! deltas back through the store.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::config::game::{GAME_CODE_LEN, PLAYER_COLORS};
use crate::game::levels::Level;
use crate::game::types::{GameObject, GameStatus, ObjectKind, Player, Position};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: Uuid,
    /// Short public code for joining, derived from the id.
    pub game_code: String,
    pub creator_uid: Uuid,
    pub level_number: u32,
    pub grid_size: usize,
    pub players: HashMap<Uuid, Player>,
    pub game_objects: HashMap<Uuid, GameObject>,
    pub status: GameStatus,
    /// Unix millis at creation.
    pub created_at: u64,
}

/// First `GAME_CODE_LEN` characters of the id, uppercased.
pub fn derive_game_code(id: &Uuid) -> String {
    id.to_string()[..GAME_CODE_LEN].to_uppercase()
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl GameState {
    /// Build a fresh game from a level definition, with the creator placed
    /// on the level's first spawn point.
    pub fn new(level: &Level, creator_uid: Uuid, email: &str) -> Self {
        let id = Uuid::new_v4();

        let spawn = level
            .player_start_positions
            .first()
            .copied()
            .unwrap_or(Position { x: 0, y: 0 });
        let mut players = HashMap::new();
        players.insert(
            creator_uid,
            Player::new(creator_uid, email.to_string(), spawn, PLAYER_COLORS[0]),
        );

        let mut game_objects = HashMap::new();
        for &pos in level.rocks {
            let rock = GameObject::new(ObjectKind::Rock, pos);
            game_objects.insert(rock.id, rock);
        }
        for &(pos, kind) in level.obstacles {
            let obstacle = GameObject::new(
                ObjectKind::Obstacle {
                    kind,
                    original_kind: kind,
                    covered: false,
                },
                pos,
            );
            game_objects.insert(obstacle.id, obstacle);
        }
        let exit = GameObject::new(ObjectKind::Exit, level.exit);
        game_objects.insert(exit.id, exit);

        GameState {
            id,
            game_code: derive_game_code(&id),
            creator_uid,
            level_number: level.number,
            grid_size: level.grid_size,
            players,
            game_objects,
            status: GameStatus::Waiting,
            created_at: now_millis(),
        }
    }

    /// True if any player other than `exclude` stands on `pos`.
    pub fn cell_occupied_by_other(&self, pos: Position, exclude: Uuid) -> bool {
        self.players
            .values()
            .any(|p| p.id != exclude && p.pos() == pos)
    }

    /// The object that affects movement at `pos`, if any. Rocks shadow the
    /// covered obstacle beneath them; covered obstacles are inert and never
    /// returned.
    pub fn object_at(&self, pos: Position) -> Option<&GameObject> {
        let mut found: Option<&GameObject> = None;
        for obj in self.game_objects.values() {
            if obj.pos() != pos {
                continue;
            }
            if obj.is_rock() {
                return Some(obj);
            }
            if obj.is_active_obstacle() || (obj.is_exit() && found.is_none()) {
                found = Some(obj);
            }
        }
        found
    }

    /// Any object occupying `pos` that blocks a pushed rock (rock or exit).
    pub fn blocking_object_at(&self, pos: Position) -> Option<&GameObject> {
        self.game_objects
            .values()
            .find(|obj| obj.pos() == pos && (obj.is_rock() || obj.is_exit()))
    }

    /// The uncovered obstacle at `pos`, if any.
    pub fn active_obstacle_at(&self, pos: Position) -> Option<&GameObject> {
        self.game_objects
            .values()
            .find(|obj| obj.pos() == pos && obj.is_active_obstacle())
    }

    pub fn exit(&self) -> Option<&GameObject> {
        self.game_objects.values().find(|obj| obj.is_exit())
    }
}
