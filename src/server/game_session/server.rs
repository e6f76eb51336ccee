/// Game manager actor.
///
/// One actor serializes every lifecycle operation and move intent across
/// all games: a move's writes are applied and acknowledged before the next
/// message is processed, so two fast key presses can never race against a
/// stale snapshot. It also tracks connected sessions per game for the
/// events the store cannot carry (a deleted-and-recreated game has a new
/// id the old document can't point to).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use actix::prelude::*;
use actix::MessageResult;
use log::{info, warn};
use uuid::Uuid;

use crate::config::game::LEVEL_ADVANCE_DELAY;
use crate::game::error::GameError;
use crate::game::service::GameService;
use crate::game::types::{Direction, MoveOutcome};
use crate::server::game_session::messages::ServerWsMessage;
use crate::server::game_session::session::GameSocketSession;

pub struct GameManager {
    service: GameService,
    /// Connected sessions per game, for lifecycle event fan-out.
    sessions: HashMap<Uuid, HashMap<Uuid, Addr<GameSocketSession>>>,
    /// Games with a level-advance timer already running.
    pending_advances: HashSet<Uuid>,
}

impl GameManager {
    pub fn new(service: GameService) -> Self {
        Self {
            service,
            sessions: HashMap::new(),
            pending_advances: HashSet::new(),
        }
    }

    fn broadcast(&self, game_id: Uuid, msg: ServerWsMessage) {
        if let Some(sessions) = self.sessions.get(&game_id) {
            for addr in sessions.values() {
                addr.do_send(msg.clone());
            }
        }
    }

    /// Creator identity for advance/restart. Prefers the live player entry,
    /// falls back to the stored profile if the creator already left.
    fn creator_email(&self, game: &crate::game::state::GameState) -> Option<String> {
        game.players
            .get(&game.creator_uid)
            .map(|p| p.email.clone())
            .or_else(|| {
                self.service
                    .profiles()
                    .profile(game.creator_uid)
                    .ok()
                    .flatten()
                    .map(|p| p.email)
            })
    }

    /// Start the delayed advance to the next level, once per completion.
    fn schedule_advance(&mut self, game_id: Uuid, ctx: &mut Context<Self>) {
        if !self.pending_advances.insert(game_id) {
            return;
        }
        info!(
            "[GameManager] Level complete in game {}, advancing in {}s",
            game_id, LEVEL_ADVANCE_DELAY
        );
        ctx.run_later(Duration::from_secs(LEVEL_ADVANCE_DELAY), move |act, _ctx| {
            act.pending_advances.remove(&game_id);
            act.replace_game(game_id, None);
        });
    }

    /// Delete the game and recreate it for the creator, at `target_level`
    /// or, when `None`, at the next level up. Notifies the old game's
    /// sessions with the replacement id.
    fn replace_game(&mut self, game_id: Uuid, target_level: Option<u32>) {
        let state = match self.service.game_state(game_id) {
            Ok(state) => state,
            Err(err) => {
                warn!("[GameManager] Not replacing game {}: {}", game_id, err);
                return;
            }
        };
        let Some(email) = self.creator_email(&state) else {
            warn!(
                "[GameManager] Creator of game {} is unknown, not replacing",
                game_id
            );
            return;
        };
        let target = target_level.unwrap_or(state.level_number + 1);
        match self
            .service
            .advance_or_restart(game_id, state.creator_uid, &email, target)
        {
            Ok(new_id) => {
                info!(
                    "[GameManager] Game {} replaced by {} at level {}",
                    game_id, new_id, target
                );
                self.broadcast(game_id, ServerWsMessage::GameAdvanced { game_id: new_id });
            }
            Err(err) => {
                warn!("[GameManager] Failed to replace game {}: {}", game_id, err);
            }
        }
    }
}

impl Actor for GameManager {
    type Context = Context<Self>;
}

#[derive(Message)]
#[rtype(result = "Result<Uuid, GameError>")]
pub struct CreateGame {
    pub creator_uid: Uuid,
    pub email: String,
    pub level_number: u32,
}

impl Handler<CreateGame> for GameManager {
    type Result = MessageResult<CreateGame>;

    fn handle(&mut self, msg: CreateGame, _: &mut Context<Self>) -> Self::Result {
        MessageResult(
            self.service
                .create_game(msg.creator_uid, &msg.email, msg.level_number),
        )
    }
}

#[derive(Message)]
#[rtype(result = "Result<Uuid, GameError>")]
pub struct JoinGame {
    pub code_or_id: String,
    pub player_uid: Uuid,
    pub email: String,
}

impl Handler<JoinGame> for GameManager {
    type Result = MessageResult<JoinGame>;

    fn handle(&mut self, msg: JoinGame, _: &mut Context<Self>) -> Self::Result {
        MessageResult(
            self.service
                .join_game(&msg.code_or_id, msg.player_uid, &msg.email),
        )
    }
}

#[derive(Message)]
#[rtype(result = "Result<(), GameError>")]
pub struct StartGame {
    pub game_id: Uuid,
}

impl Handler<StartGame> for GameManager {
    type Result = Result<(), GameError>;

    fn handle(&mut self, msg: StartGame, _: &mut Context<Self>) -> Self::Result {
        self.service.start_game(msg.game_id)
    }
}

#[derive(Message)]
#[rtype(result = "Result<(), GameError>")]
pub struct LeaveGame {
    pub game_id: Uuid,
    pub player_id: Uuid,
}

impl Handler<LeaveGame> for GameManager {
    type Result = Result<(), GameError>;

    fn handle(&mut self, msg: LeaveGame, _: &mut Context<Self>) -> Self::Result {
        self.service.leave_game(msg.game_id, msg.player_id)
    }
}

/// One move intent from a connected player.
#[derive(Message)]
#[rtype(result = "Result<MoveOutcome, GameError>")]
pub struct PlayerMove {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub direction: Direction,
}

impl Handler<PlayerMove> for GameManager {
    type Result = MessageResult<PlayerMove>;

    fn handle(&mut self, msg: PlayerMove, ctx: &mut Context<Self>) -> Self::Result {
        let result = self
            .service
            .handle_move(msg.game_id, msg.player_id, msg.direction);
        if let Ok(MoveOutcome::LevelComplete) = result {
            self.schedule_advance(msg.game_id, ctx);
        }
        MessageResult(result)
    }
}

/// Creator-triggered reset of the current level (e.g. after a hazard hit).
#[derive(Message)]
#[rtype(result = "Result<(), GameError>")]
pub struct RestartLevel {
    pub game_id: Uuid,
}

impl Handler<RestartLevel> for GameManager {
    type Result = Result<(), GameError>;

    fn handle(&mut self, msg: RestartLevel, _: &mut Context<Self>) -> Self::Result {
        let state = self.service.game_state(msg.game_id)?;
        self.replace_game(msg.game_id, Some(state.level_number));
        Ok(())
    }
}

#[derive(Message)]
#[rtype(result = "Result<bool, GameError>")]
pub struct IsPlayerInGame {
    pub game_id: Uuid,
    pub player_id: Uuid,
}

impl Handler<IsPlayerInGame> for GameManager {
    type Result = Result<bool, GameError>;

    fn handle(&mut self, msg: IsPlayerInGame, _: &mut Context<Self>) -> Self::Result {
        let state = self.service.game_state(msg.game_id)?;
        Ok(state.players.contains_key(&msg.player_id))
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct RegisterSession {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub addr: Addr<GameSocketSession>,
}

impl Handler<RegisterSession> for GameManager {
    type Result = ();

    fn handle(&mut self, msg: RegisterSession, _: &mut Context<Self>) -> Self::Result {
        self.sessions
            .entry(msg.game_id)
            .or_default()
            .insert(msg.player_id, msg.addr);
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct UnregisterSession {
    pub game_id: Uuid,
    pub player_id: Uuid,
}

impl Handler<UnregisterSession> for GameManager {
    type Result = ();

    fn handle(&mut self, msg: UnregisterSession, _: &mut Context<Self>) -> Self::Result {
        if let Some(sessions) = self.sessions.get_mut(&msg.game_id) {
            sessions.remove(&msg.player_id);
            if sessions.is_empty() {
                self.sessions.remove(&msg.game_id);
            }
        }
    }
}
