//! Game lifecycle and move application.
//!
//! `GameService` owns every read-modify-write against the store: creating
//! and joining games, status transitions, and applying the write batches
//! produced by move resolution. All methods take a fresh snapshot from the
//! store; nothing here caches state between calls.

use std::sync::Arc;

use log::{error, info};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::auth::ProfileService;
use crate::config::game::{FULL_GAME_ID_LEN, MAX_PLAYERS, PLAYER_COLORS};
use crate::game::error::GameError;
use crate::game::levels;
use crate::game::state::GameState;
use crate::game::systems::movement::{self, StateWrite};
use crate::game::types::{Direction, GameStatus, MoveOutcome, Player, Position};
use crate::store::{DocumentStore, StoreError};

#[derive(Clone)]
pub struct GameService {
    store: Arc<dyn DocumentStore>,
    profiles: ProfileService,
}

fn game_path(game_id: Uuid) -> String {
    format!("games/{game_id}")
}

impl GameService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let profiles = ProfileService::new(store.clone());
        Self { store, profiles }
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    /// Read and decode the game document.
    pub fn game_state(&self, game_id: Uuid) -> Result<GameState, GameError> {
        let doc = self
            .store
            .get(&game_path(game_id))?
            .ok_or(GameError::GameNotFound)?;
        serde_json::from_value(doc)
            .map_err(|e| GameError::Store(StoreError(format!("corrupt game document: {e}"))))
    }

    /// Instantiate a fresh game from a level and persist the full document.
    pub fn create_game(
        &self,
        creator_uid: Uuid,
        email: &str,
        level_number: u32,
    ) -> Result<Uuid, GameError> {
        let level =
            levels::level(level_number).ok_or(GameError::LevelNotFound(level_number))?;
        let state = GameState::new(level, creator_uid, email);
        let game_id = state.id;
        let doc = serde_json::to_value(&state)
            .map_err(|e| GameError::Store(StoreError(format!("serialize game: {e}"))))?;
        self.store.set(&game_path(game_id), doc)?;
        info!(
            "[GameService] Game {} created by {} at level {} (code {})",
            game_id, creator_uid, level_number, state.game_code
        );
        Ok(game_id)
    }

    /// Resolve a join input to a full game id. Anything shorter than a full
    /// id is treated as a join code and matched case-insensitively against
    /// the derived codes of existing games.
    pub fn resolve_game_id(&self, code_or_id: &str) -> Result<Uuid, GameError> {
        let trimmed = code_or_id.trim();
        if trimmed.len() >= FULL_GAME_ID_LEN {
            return Uuid::parse_str(trimmed).map_err(|_| GameError::GameNotFound);
        }
        let code = trimmed.to_uppercase();
        let games = self.store.get("games")?.unwrap_or_else(|| json!({}));
        let games = games.as_object().ok_or(GameError::GameNotFound)?;
        for (id, doc) in games {
            if doc.get("gameCode").and_then(Value::as_str) == Some(code.as_str()) {
                return Uuid::parse_str(id).map_err(|_| GameError::GameNotFound);
            }
        }
        Err(GameError::GameNotFound)
    }

    /// Admit a player into a waiting game, assigning the next unused spawn
    /// point and the next palette color by join order.
    pub fn join_game(
        &self,
        code_or_id: &str,
        player_uid: Uuid,
        email: &str,
    ) -> Result<Uuid, GameError> {
        let game_id = self.resolve_game_id(code_or_id)?;
        let state = self.game_state(game_id)?;

        if state.status != GameStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if state.players.len() >= MAX_PLAYERS {
            return Err(GameError::GameFull);
        }

        let level = levels::level(state.level_number)
            .ok_or(GameError::LevelNotFound(state.level_number))?;
        let count = state.players.len();
        let spawn = level
            .player_start_positions
            .get(count)
            .copied()
            .unwrap_or(Position { x: count, y: 0 });
        let color = PLAYER_COLORS[count % PLAYER_COLORS.len()];
        let player = Player::new(player_uid, email.to_string(), spawn, color);

        let doc = serde_json::to_value(&player)
            .map_err(|e| GameError::Store(StoreError(format!("serialize player: {e}"))))?;
        self.store
            .set(&format!("games/{game_id}/players/{player_uid}"), doc)?;
        info!("[GameService] Player {} joined game {}", player_uid, game_id);
        Ok(game_id)
    }

    /// Transition `waiting -> active`. That only the creator may trigger
    /// this is the serving layer's check, not the store's.
    pub fn start_game(&self, game_id: Uuid) -> Result<(), GameError> {
        let state = self.game_state(game_id)?;
        if state.status != GameStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        self.update_status(game_id, GameStatus::Active)?;
        info!("[GameService] Game {} started", game_id);
        Ok(())
    }

    fn update_status(&self, game_id: Uuid, status: GameStatus) -> Result<(), GameError> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), json!(status));
        self.store.update(&game_path(game_id), fields)?;
        Ok(())
    }

    pub fn leave_game(&self, game_id: Uuid, player_id: Uuid) -> Result<(), GameError> {
        self.store
            .remove(&format!("games/{game_id}/players/{player_id}"))?;
        info!("[GameService] Player {} left game {}", player_id, game_id);
        Ok(())
    }

    pub fn delete_game(&self, game_id: Uuid) -> Result<(), GameError> {
        self.store.remove(&game_path(game_id))?;
        info!("[GameService] Game {} deleted", game_id);
        Ok(())
    }

    /// Level-advance and restart both replace the whole game document: the
    /// old game is deleted and a fresh one created at `target_level`. Only
    /// the creator carries over; everyone else rejoins by code.
    pub fn advance_or_restart(
        &self,
        game_id: Uuid,
        creator_uid: Uuid,
        email: &str,
        target_level: u32,
    ) -> Result<Uuid, GameError> {
        if levels::level(target_level).is_none() {
            return Err(GameError::LevelNotFound(target_level));
        }
        self.delete_game(game_id)?;
        let new_id = self.create_game(creator_uid, email, target_level)?;
        if let Err(err) = self.profiles.update_last_level(creator_uid, target_level) {
            // Profile bookkeeping must not fail the advance.
            error!(
                "[GameService] Failed to record level {} for {}: {}",
                target_level, creator_uid, err
            );
        }
        Ok(new_id)
    }

    /// Resolve and apply one move intent. All writes of the resolution are
    /// committed as a single atomic update.
    pub fn handle_move(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        direction: Direction,
    ) -> Result<MoveOutcome, GameError> {
        let state = self.game_state(game_id)?;
        let resolution = movement::resolve_move(&state, player_id, direction)
            .ok_or(GameError::PlayerNotInGame)?;

        if !resolution.writes.is_empty() {
            let fields = write_fields(&resolution.writes);
            if let Err(err) = self.store.update(&game_path(game_id), fields) {
                error!(
                    "[GameService] Move write failed for {} in game {}: {}",
                    player_id, game_id, err
                );
                return Err(err.into());
            }
        }
        Ok(resolution.outcome)
    }
}

/// Flatten a write batch into the field paths of one atomic update.
fn write_fields(writes: &[StateWrite]) -> Map<String, Value> {
    let mut fields = Map::new();
    for write in writes {
        match write {
            StateWrite::PlayerPosition { player_id, pos } => {
                fields.insert(format!("players/{player_id}/x"), json!(pos.x));
                fields.insert(format!("players/{player_id}/y"), json!(pos.y));
            }
            StateWrite::ObjectPosition { object_id, pos } => {
                fields.insert(format!("gameObjects/{object_id}/x"), json!(pos.x));
                fields.insert(format!("gameObjects/{object_id}/y"), json!(pos.y));
            }
            StateWrite::CoverObstacle { object_id } => {
                fields.insert(format!("gameObjects/{object_id}/covered"), json!(true));
            }
            StateWrite::Status(status) => {
                fields.insert("status".to_string(), json!(status));
            }
        }
    }
    fields
}
